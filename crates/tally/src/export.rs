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
use tracing::debug;

use crate::builder::DecoratedRow;
use crate::error::{ExportError, ExportResult};
use crate::value::{format_number, quote_json, FieldMap, FieldValue};

const DEFAULT_PREFIX: &str = "chart";
const EMPTY_CELL: &str = "\"\"";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

pub fn export_file_name(prefix: &str) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        format!("{DEFAULT_PREFIX}-data.csv")
    } else {
        format!("{prefix}-data.csv")
    }
}

/// Serialises the decorated rows; the header comes from the first row's field view.
pub fn export_csv(rows: &[DecoratedRow], kind_label: Option<&str>) -> Option<CsvExport> {
    let first = rows.first()?;
    let header: Vec<String> = first.fields().keys().cloned().collect();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header.join(","));
    for row in rows {
        let cells: Vec<String> = header
            .iter()
            .map(|name| render_cell(row.field(name).as_ref()))
            .collect();
        lines.push(cells.join(","));
    }
    debug!(rows = rows.len(), columns = header.len(), "exported decorated rows");
    Some(CsvExport {
        file_name: export_file_name(kind_label.unwrap_or(DEFAULT_PREFIX)),
        content: lines.join("\n"),
    })
}

/// Same format over the records exactly as the backend sent them.
pub fn export_raw_csv(records: &[FieldValue], kind_label: Option<&str>) -> Option<CsvExport> {
    let header: Vec<String> = match records.first()? {
        FieldValue::Map(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header.join(","));
    for record in records {
        let cells: Vec<String> = header
            .iter()
            .map(|name| render_cell(record.as_map().and_then(|map| map.get(name))))
            .collect();
        lines.push(cells.join(","));
    }
    Some(CsvExport {
        file_name: export_file_name(kind_label.unwrap_or(DEFAULT_PREFIX)),
        content: lines.join("\n"),
    })
}

pub fn render_cell(value: Option<&FieldValue>) -> String {
    match value {
        None | Some(FieldValue::Null) => EMPTY_CELL.to_string(),
        Some(FieldValue::Bool(b)) => b.to_string(),
        Some(FieldValue::Number(n)) => format_number(*n),
        Some(FieldValue::Text(s)) => quote_json(s),
        Some(other) => other.to_json_text(),
    }
}

pub fn parse_csv_export(document: &str) -> ExportResult<Vec<FieldMap>> {
    let mut lines = document.lines();
    let header: Vec<&str> = match lines.next() {
        Some(line) if !line.trim().is_empty() => line.split(',').collect(),
        _ => return Err(ExportError::EmptyDocument),
    };
    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let line_no = index + 2;
        let cells = split_line(line, line_no)?;
        if cells.len() != header.len() {
            return Err(ExportError::ColumnCountMismatch {
                line: line_no,
                expected: header.len(),
                found: cells.len(),
            });
        }
        let mut row = FieldMap::with_capacity(header.len());
        for (name, cell) in header.iter().zip(cells) {
            let value = if cell.trim().is_empty() {
                FieldValue::Null
            } else {
                serde_json::from_str::<FieldValue>(cell).map_err(|source| {
                    ExportError::InvalidCell {
                        line: line_no,
                        column: name.to_string(),
                        source,
                    }
                })?
            };
            row.insert(name.to_string(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

// Commas inside JSON strings, arrays or objects do not split cells.
fn split_line(line: &str, line_no: usize) -> ExportResult<Vec<&str>> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                cells.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_string {
        return Err(ExportError::UnterminatedQuote { line: line_no });
    }
    cells.push(&line[start..]);
    Ok(cells)
}
