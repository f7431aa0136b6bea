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

use crate::currency::CurrencyFormat;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    pub currency: CurrencyFormat,
    pub x_label_angle: f64,
    pub x_axis_height: u32,
    pub pie_outer_radius: u32,
    pub show_value_labels: bool,
    pub show_legend: bool,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyFormat::default(),
            x_label_angle: -20.0,
            x_axis_height: 60,
            pie_outer_radius: 100,
            show_value_labels: true,
            show_legend: true,
        }
    }
}

impl PresentationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(-90.0..=90.0).contains(&self.x_label_angle) {
            return Err(ConfigError::InvalidPresentationConfig {
                field: "x_label_angle".to_string(),
                value: self.x_label_angle.to_string(),
            });
        }
        if self.pie_outer_radius == 0 {
            return Err(ConfigError::InvalidPresentationConfig {
                field: "pie_outer_radius".to_string(),
                value: "0".to_string(),
            });
        }
        if self.currency.symbol.is_empty() {
            return Err(ConfigError::MissingRequiredConfig {
                field: "currency.symbol".to_string(),
            });
        }
        Ok(())
    }

    pub fn for_locale(tag: &str) -> Self {
        Self {
            currency: CurrencyFormat::for_locale(tag),
            ..Default::default()
        }
    }

    pub fn compact() -> Self {
        Self {
            x_label_angle: 0.0,
            x_axis_height: 30,
            show_value_labels: false,
            show_legend: false,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PresentationConfig::default().validate().is_ok());
        assert!(PresentationConfig::compact().validate().is_ok());
        assert!(PresentationConfig::for_locale("de-DE").validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let config = PresentationConfig {
            x_label_angle: 120.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPresentationConfig { ref field, .. }) if field == "x_label_angle"
        ));

        let config = PresentationConfig {
            pie_outer_radius: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
