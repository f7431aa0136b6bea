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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the chart has no rows")]
    NoRows,
    #[error("Export document is empty")]
    EmptyDocument,
    #[error("Line {line}: unterminated quoted value")]
    UnterminatedQuote { line: usize },
    #[error("Line {line}: expected {expected} values, found {found}")]
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}, column '{column}': {source}")]
    InvalidCell {
        line: usize,
        column: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid presentation configuration: {field} = {value}")]
    InvalidPresentationConfig { field: String, value: String },
    #[error("Missing required configuration: {field}")]
    MissingRequiredConfig { field: String },
}

pub type Result<T> = std::result::Result<T, TallyError>;
pub type ExportResult<T> = std::result::Result<T, ExportError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl TallyError {
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TallyError::Export(ExportError::NoRows) | TallyError::Io(_)
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            TallyError::Export(_) => "Export",
            TallyError::Config(_) => "Configuration",
            TallyError::Io(_) => "I/O",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            TallyError::Export(ExportError::NoRows) => {
                "There is no chart data to download for this message.".to_string()
            }
            TallyError::Io(_) => {
                "The file could not be saved. Check the download directory.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
