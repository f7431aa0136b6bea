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

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chat_contracts::{AnalyticsResponse, ChartKind, ChatRole};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::inference::KeyOverrides;
use crate::value::FieldValue;

pub const APOLOGY_TEXT: &str = "Sorry, something went wrong.";
const DEFAULT_EXPORT_PREFIX: &str = "chart";
const PIE_TITLE: &str = "Distribution";
const BAR_TITLE: &str = "Revenue by Product";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDirective {
    pub kind: ChartKind,
    pub selector: Option<String>,
    pub title: Option<String>,
    pub x_key: Option<String>,
    pub name_key: Option<String>,
    pub value_key: Option<String>,
}

impl ChartDirective {
    pub fn of_kind(kind: ChartKind) -> Self {
        Self {
            kind,
            selector: Some(kind.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn from_response(response: &AnalyticsResponse) -> Option<Self> {
        let any_hint = response.chart.is_some()
            || response.title.is_some()
            || response.x_key.is_some()
            || response.name_key.is_some()
            || response.value_key.is_some();
        any_hint.then(|| Self {
            kind: response.chart_kind(),
            selector: response.chart.clone().filter(|s| !s.trim().is_empty()),
            title: response.title.clone().filter(|s| !s.trim().is_empty()),
            x_key: non_blank(&response.x_key),
            name_key: non_blank(&response.name_key),
            value_key: non_blank(&response.value_key),
        })
    }

    pub fn with_x_key(mut self, key: impl Into<String>) -> Self {
        self.x_key = Some(key.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `xKey` is consulted before `nameKey`; `valueKey` pins the magnitude field.
    pub fn overrides(&self) -> KeyOverrides {
        KeyOverrides {
            label: non_blank(&self.x_key).or_else(|| non_blank(&self.name_key)),
            magnitude: non_blank(&self.value_key),
        }
    }

    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None if self.kind == ChartKind::Pie => PIE_TITLE.to_string(),
            None => BAR_TITLE.to_string(),
        }
    }

    /// Prefix of the download name: the selector as sent by the backend, or `chart`.
    pub fn export_prefix(&self) -> String {
        let cleaned: String = self
            .selector
            .as_deref()
            .unwrap_or_default()
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if cleaned.is_empty() {
            DEFAULT_EXPORT_PREFIX.to_string()
        } else {
            cleaned
        }
    }
}

fn non_blank(key: &Option<String>) -> Option<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn new(base64: impl Into<String>) -> Option<Self> {
        let base64 = base64.into();
        if base64.trim().is_empty() {
            None
        } else {
            Some(Self(base64))
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.0)
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.0.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: Option<String>,
    pub directive: Option<ChartDirective>,
    pub data: Option<Vec<FieldValue>>,
    pub image: Option<ImagePayload>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: None,
            directive: None,
            data: None,
            image: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(ChatRole::User)
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(ChatRole::Assistant)
        }
    }

    pub fn apology() -> Self {
        Self::assistant_text(APOLOGY_TEXT)
    }

    pub fn from_response(response: AnalyticsResponse) -> Self {
        let directive = ChartDirective::from_response(&response);
        let data = match response.data {
            Some(Value::Array(items)) => Some(items.into_iter().map(FieldValue::from).collect()),
            Some(Value::Null) | None => None,
            Some(other) => {
                debug!(payload = %other, "ignoring non-array data payload");
                None
            }
        };
        Self {
            text: response.summary.filter(|s| !s.is_empty()),
            directive,
            data,
            image: response.image.and_then(ImagePayload::new),
            ..Self::new(ChatRole::Assistant)
        }
    }

    pub fn records(&self) -> &[FieldValue] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn has_data(&self) -> bool {
        !self.records().is_empty()
    }

    pub fn chart_directive(&self) -> ChartDirective {
        self.directive.clone().unwrap_or_default()
    }

    pub fn formatted_time(&self) -> String {
        self.timestamp.with_timezone(&Local).format("%H:%M").to_string()
    }
}
