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
use tracing::debug;

use crate::flatten::FlatRecord;
use crate::value::FieldValue;

pub const MAGNITUDE_PATTERNS: [&str; 7] = [
    "revenue", "amount", "total", "value", "sales", "price", "profit",
];
pub const LABEL_PATTERNS: [&str; 8] = [
    "name", "product", "category", "title", "label", "year", "month", "date",
];
pub const FALLBACK_MAGNITUDE_KEY: &str = "value";
pub const FALLBACK_LABEL_KEY: &str = "name";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOverrides {
    pub label: Option<String>,
    pub magnitude: Option<String>,
}

impl KeyOverrides {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, key: impl Into<String>) -> Self {
        self.label = Some(key.into());
        self
    }

    pub fn with_magnitude(mut self, key: impl Into<String>) -> Self {
        self.magnitude = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRoles {
    pub magnitude_key: String,
    pub label_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Magnitude,
    Label,
}

impl Role {
    fn patterns(self) -> &'static [&'static str] {
        match self {
            Role::Magnitude => &MAGNITUDE_PATTERNS,
            Role::Label => &LABEL_PATTERNS,
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            Role::Magnitude => FALLBACK_MAGNITUDE_KEY,
            Role::Label => FALLBACK_LABEL_KEY,
        }
    }

    fn accepts_sample(self, value: &FieldValue) -> bool {
        match self {
            Role::Magnitude => value.is_number(),
            Role::Label => value.is_text(),
        }
    }
}

/// Picks the magnitude and label fields from the first record only. Rows are assumed to
/// share the sample's shape.
pub fn infer_field_roles(records: &[FlatRecord], overrides: &KeyOverrides) -> FieldRoles {
    let sample = records.first();
    let roles = FieldRoles {
        magnitude_key: overrides
            .magnitude
            .clone()
            .unwrap_or_else(|| infer_key(sample, Role::Magnitude)),
        label_key: overrides
            .label
            .clone()
            .unwrap_or_else(|| infer_key(sample, Role::Label)),
    };
    debug!(
        magnitude_key = %roles.magnitude_key,
        label_key = %roles.label_key,
        rows = records.len(),
        "resolved chart field roles"
    );
    roles
}

fn infer_key(sample: Option<&FlatRecord>, role: Role) -> String {
    let Some(sample) = sample else {
        return role.fallback().to_string();
    };
    let by_name = sample.keys().find(|key| matches_any(key, role.patterns()));
    let by_type = || {
        sample
            .iter()
            .find(|(_, value)| role.accepts_sample(value))
            .map(|(key, _)| key)
    };
    by_name
        .or_else(by_type)
        .or_else(|| sample.keys().next())
        .cloned()
        .unwrap_or_else(|| role.fallback().to_string())
}

fn matches_any(key: &str, patterns: &[&str]) -> bool {
    let lowered = key.to_lowercase();
    patterns.iter().any(|pattern| lowered.contains(pattern))
}
