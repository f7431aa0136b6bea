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

use crate::builder::{DecoratedRow, LABEL_PLACEHOLDER};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total: f64,
    pub average: f64,
    pub top_label: String,
    pub count: usize,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            total: 0.0,
            average: 0.0,
            top_label: LABEL_PLACEHOLDER.to_string(),
            count: 0,
        }
    }
}

pub fn summarise(rows: &[DecoratedRow]) -> SummaryStats {
    let mut total = 0.0_f64;
    let mut top: Option<&DecoratedRow> = None;
    for row in rows {
        total += row.magnitude;
        // strict comparison keeps the first row on ties
        if top.map_or(true, |best| row.magnitude > best.magnitude) {
            top = Some(row);
        }
    }
    let count = rows.len();
    SummaryStats {
        total,
        average: if count > 0 { total / count as f64 } else { 0.0 },
        top_label: top.map_or_else(|| LABEL_PLACEHOLDER.to_string(), |row| row.label.clone()),
        count,
    }
}
