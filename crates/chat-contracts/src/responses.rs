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
use serde_json::Value;

use crate::types::ChartKind;

/// Body returned by the analytics endpoint. Every field is optional; `data` is kept as
/// untyped JSON so a malformed payload degrades to "no rows" instead of failing the turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub chart: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_key: Option<String>,
}

impl AnalyticsResponse {
    pub fn chart_kind(&self) -> ChartKind {
        self.chart
            .as_deref()
            .map(ChartKind::from)
            .unwrap_or_default()
    }

    pub fn records(&self) -> &[Value] {
        match &self.data {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let resp: AnalyticsResponse = serde_json::from_value(json!({
            "summary": "Gadget leads revenue",
            "chart": "pie",
            "data": [{ "productName": "Gadget", "revenue": 300 }],
            "image": "",
            "xKey": "productName"
        }))
        .unwrap();
        assert_eq!(resp.chart_kind(), ChartKind::Pie);
        assert_eq!(resp.records().len(), 1);
        assert_eq!(resp.x_key.as_deref(), Some("productName"));
        assert_eq!(resp.image.as_deref(), Some(""));
    }

    #[test]
    fn test_sparse_payload() {
        let resp: AnalyticsResponse =
            serde_json::from_value(json!({ "summary": "Ask analytics questions only" })).unwrap();
        assert_eq!(resp.chart_kind(), ChartKind::Bar);
        assert!(resp.records().is_empty());
    }

    #[test]
    fn test_non_array_data_yields_no_records() {
        let resp: AnalyticsResponse =
            serde_json::from_value(json!({ "data": { "oops": 1 } })).unwrap();
        assert!(resp.records().is_empty());
    }
}
