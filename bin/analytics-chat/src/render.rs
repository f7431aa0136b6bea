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

use std::fmt::Write as _;

use chat_contracts::ChatRole;
use tally::presentation::{BarChart, PieChart};
use tally::{ChartBody, ChartPresentation, ChartRendering, ConversationEntry, PresentationAdapter};

const BAR_WIDTH: usize = 40;
const BAR_GLYPH: char = '█';

pub fn render_entry(entry: &ConversationEntry, adapter: &PresentationAdapter) -> String {
    let message = &entry.message;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} · {}",
        message.role.display_name(),
        message.formatted_time()
    );
    if let Some(text) = &message.text {
        for line in text.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    if let Some(image) = &message.image {
        match image.decode() {
            Ok(bytes) => {
                let _ = writeln!(out, "  [image: {} bytes]", bytes.len());
            }
            Err(_) => {
                let _ = writeln!(out, "  [image: unreadable]");
            }
        }
    }
    if message.role == ChatRole::Assistant {
        if let Some(chart) = entry.chart() {
            let view = adapter.present(&chart, &message.chart_directive());
            out.push_str(&render_presentation(&view));
        }
    }
    out
}

pub fn render_presentation(view: &ChartPresentation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  ── {} ──", view.title);
    let _ = writeln!(out, "  {}", view.stat_chips.join("  |  "));
    match &view.body {
        ChartBody::NoData { message } => {
            let _ = writeln!(out, "  {message}");
        }
        ChartBody::Charts { charts } => {
            for chart in charts {
                match chart {
                    ChartRendering::Bar(bar) => render_bar(&mut out, bar),
                    ChartRendering::Pie(pie) => render_pie(&mut out, pie),
                }
            }
        }
    }
    if view.export.enabled {
        let _ = writeln!(out, "  Download Data: {} (/export)", view.export.file_name);
    }
    out
}

fn render_bar(out: &mut String, chart: &BarChart) {
    let peak = chart
        .bars
        .iter()
        .map(|bar| bar.magnitude.abs())
        .fold(0.0_f64, f64::max);
    let label_width = chart
        .bars
        .iter()
        .map(|bar| bar.label.chars().count())
        .max()
        .unwrap_or(0);
    for bar in &chart.bars {
        let width = if peak > 0.0 {
            ((bar.magnitude.abs() / peak) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:<label_width$} {} {}",
            bar.label,
            BAR_GLYPH.to_string().repeat(width),
            bar.value_label.as_deref().unwrap_or_default(),
        );
    }
    if let (Some(low), Some(high)) = (chart.y_axis.ticks.first(), chart.y_axis.ticks.last()) {
        let _ = writeln!(out, "  axis {} … {}", low.text, high.text);
    }
}

fn render_pie(out: &mut String, chart: &PieChart) {
    for (wedge, line) in chart.wedges.iter().zip(&chart.legend) {
        let _ = writeln!(out, "  ● {} ({:.1}%)", line.text, wedge.share * 100.0);
    }
    if chart.legend.is_empty() {
        for wedge in &chart.wedges {
            let _ = writeln!(out, "  ● {} ({:.1}%)", wedge.label, wedge.share * 100.0);
        }
    }
}
