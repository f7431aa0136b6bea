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

use std::fs;
use std::path::{Path, PathBuf};

use tally::{export_csv, export_raw_csv, ConversationEntry, CsvExport, ExportError};
use tracing::info;

/// CSV for a conversation entry: the decorated rows, or the records as received.
pub fn export_entry(entry: &ConversationEntry, raw: bool) -> tally::Result<CsvExport> {
    let prefix = entry.message.chart_directive().export_prefix();
    let export = if raw {
        export_raw_csv(entry.message.records(), Some(&prefix))
    } else {
        entry
            .chart()
            .and_then(|chart| export_csv(&chart.rows, Some(&prefix)))
    };
    export.ok_or_else(|| ExportError::NoRows.into())
}

pub fn write_export(dir: &Path, export: &CsvExport) -> tally::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&export.file_name);
    fs::write(&path, &export.content)?;
    info!(path = %path.display(), bytes = export.content.len(), "wrote chart data");
    Ok(path)
}
