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

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::aggregate::{summarise, SummaryStats};
use crate::flatten::{flatten_json, flatten_records, FlatRecord};
use crate::inference::{infer_field_roles, FieldRoles, KeyOverrides};
use crate::value::{FieldMap, FieldValue};

pub const PALETTE: [&str; 6] = [
    "#60a5fa", "#34d399", "#f59e0b", "#f97316", "#ef4444", "#7c3aed",
];
pub const LABEL_PLACEHOLDER: &str = "-";

pub const MAGNITUDE_FIELD: &str = "magnitude";
pub const LABEL_FIELD: &str = "label";
pub const COLOR_FIELD: &str = "color";

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecoratedRow {
    pub record: FlatRecord,
    pub magnitude: f64,
    pub label: String,
    pub color: &'static str,
}

impl DecoratedRow {
    /// The flattened record followed by the derived fields, in export order.
    pub fn fields(&self) -> FieldMap {
        let mut fields = self.record.clone();
        fields.insert(MAGNITUDE_FIELD.to_string(), FieldValue::Number(self.magnitude));
        fields.insert(LABEL_FIELD.to_string(), FieldValue::text(self.label.clone()));
        fields.insert(COLOR_FIELD.to_string(), FieldValue::text(self.color));
        fields
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            MAGNITUDE_FIELD => Some(FieldValue::Number(self.magnitude)),
            LABEL_FIELD => Some(FieldValue::text(self.label.clone())),
            COLOR_FIELD => Some(FieldValue::text(self.color)),
            _ => self.record.get(name).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub roles: FieldRoles,
    pub rows: Vec<DecoratedRow>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.label.as_str())
    }

    pub fn stats(&self) -> SummaryStats {
        summarise(&self.rows)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChartDataBuilder;

impl ChartDataBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, records: &[FieldValue], overrides: &KeyOverrides) -> ChartData {
        self.decorate(flatten_records(records), overrides)
    }

    pub fn build_json(&self, data: &Value, overrides: &KeyOverrides) -> ChartData {
        self.decorate(flatten_json(data), overrides)
    }

    pub fn decorate(&self, flat: Vec<FlatRecord>, overrides: &KeyOverrides) -> ChartData {
        let roles = infer_field_roles(&flat, overrides);
        let rows: Vec<DecoratedRow> = flat
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let magnitude = record
                    .get(&roles.magnitude_key)
                    .map_or(0.0, FieldValue::coerce_number);
                let label = display_label(record.get(&roles.label_key));
                DecoratedRow {
                    record,
                    magnitude,
                    label,
                    color: palette_color(index),
                }
            })
            .collect();
        debug!(rows = rows.len(), "decorated chart rows");
        ChartData { roles, rows }
    }
}

fn display_label(value: Option<&FieldValue>) -> String {
    match value {
        None | Some(FieldValue::Null) => LABEL_PLACEHOLDER.to_string(),
        Some(value) => {
            let text = value.display_string();
            if text.is_empty() {
                LABEL_PLACEHOLDER.to_string()
            } else {
                text
            }
        }
    }
}
