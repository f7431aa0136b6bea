// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use serde::{Deserialize, Serialize};

pub const MISSING_AMOUNT: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Whole-unit USD formatting with locale grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub group_separator: String,
    pub group_size: usize,
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::en_us()
    }
}

impl CurrencyFormat {
    pub fn en_us() -> Self {
        Self {
            symbol: "$".to_string(),
            group_separator: ",".to_string(),
            group_size: 3,
            symbol_position: SymbolPosition::Prefix,
        }
    }

    pub fn de_de() -> Self {
        Self {
            symbol: "$".to_string(),
            group_separator: ".".to_string(),
            group_size: 3,
            symbol_position: SymbolPosition::Suffix,
        }
    }

    pub fn fr_fr() -> Self {
        Self {
            symbol: "$US".to_string(),
            group_separator: "\u{202f}".to_string(),
            group_size: 3,
            symbol_position: SymbolPosition::Suffix,
        }
    }

    /// Unknown tags fall back to en-US.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        match language.as_str() {
            "de" => Self::de_de(),
            "fr" => Self::fr_fr(),
            _ => Self::en_us(),
        }
    }

    pub fn format(&self, amount: Option<f64>) -> String {
        match amount {
            Some(value) if value.is_finite() => self.format_finite(value),
            _ => MISSING_AMOUNT.to_string(),
        }
    }

    fn format_finite(&self, value: f64) -> String {
        let rounded = value.round();
        let negative = rounded < 0.0;
        let digits = format!("{:.0}", rounded.abs());
        let grouped = group_digits(&digits, &self.group_separator, self.group_size);
        let body = match self.symbol_position {
            SymbolPosition::Prefix => format!("{}{grouped}", self.symbol),
            SymbolPosition::Suffix => format!("{grouped}\u{a0}{}", self.symbol),
        };
        if negative {
            format!("-{body}")
        } else {
            body
        }
    }
}

fn group_digits(digits: &str, separator: &str, group_size: usize) -> String {
    if group_size == 0 || digits.len() <= group_size {
        return digits.to_string();
    }
    let mut out = String::with_capacity(digits.len() + digits.len() / group_size);
    let lead = digits.len() % group_size;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + group_size - lead) % group_size == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

pub fn format_currency(amount: Option<f64>) -> String {
    CurrencyFormat::default().format(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_dollars() {
        assert_eq!(format_currency(Some(0.0)), "$0");
        assert_eq!(format_currency(Some(400.0)), "$400");
        assert_eq!(format_currency(Some(1234.0)), "$1,234");
        assert_eq!(format_currency(Some(1234567.89)), "$1,234,568");
        assert_eq!(format_currency(Some(999.5)), "$1,000");
        assert_eq!(format_currency(Some(-2500.4)), "-$2,500");
        assert_eq!(format_currency(Some(-0.2)), "$0");
    }

    #[test]
    fn test_missing_amounts() {
        assert_eq!(format_currency(None), "-");
        assert_eq!(format_currency(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_locale_grouping() {
        assert_eq!(
            CurrencyFormat::for_locale("de-DE").format(Some(1234567.0)),
            "1.234.567\u{a0}$"
        );
        assert_eq!(
            CurrencyFormat::for_locale("fr_FR").format(Some(12345.0)),
            "12\u{202f}345\u{a0}$US"
        );
        assert_eq!(CurrencyFormat::for_locale("xx").format(Some(12.0)), "$12");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("1", ",", 3), "1");
        assert_eq!(group_digits("123", ",", 3), "123");
        assert_eq!(group_digits("1234", ",", 3), "1,234");
        assert_eq!(group_digits("123456", ",", 3), "123,456");
        assert_eq!(group_digits("1234567", ",", 3), "1,234,567");
    }
}
