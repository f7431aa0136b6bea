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

//! Turns loosely shaped analytics records into chart-ready rows, summary
//! statistics, chart descriptions and CSV exports.

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod currency;
pub mod error;
pub mod export;
pub mod flatten;
pub mod history;
pub mod inference;
pub mod message;
pub mod presentation;
pub mod value;

pub use aggregate::{summarise, SummaryStats};
pub use builder::{palette_color, ChartData, ChartDataBuilder, DecoratedRow, LABEL_PLACEHOLDER, PALETTE};
pub use config::PresentationConfig;
pub use currency::{format_currency, CurrencyFormat};
pub use error::{ConfigError, ExportError, Result, TallyError};
pub use export::{export_csv, export_raw_csv, parse_csv_export, CsvExport};
pub use flatten::{flatten_json, flatten_records, FlatRecord};
pub use history::{Conversation, ConversationEntry};
pub use inference::{infer_field_roles, FieldRoles, KeyOverrides};
pub use message::{ChartDirective, ChatMessage, ImagePayload, APOLOGY_TEXT};
pub use presentation::{present, ChartBody, ChartPresentation, ChartRendering, PresentationAdapter};
pub use value::{FieldMap, FieldValue};
