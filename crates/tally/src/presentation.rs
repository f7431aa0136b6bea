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

use crate::aggregate::SummaryStats;
use crate::builder::{ChartData, LABEL_PLACEHOLDER};
use crate::config::PresentationConfig;
use crate::error::ConfigResult;
use crate::export::export_file_name;
use crate::message::ChartDirective;

pub const NO_DATA_TEXT: &str = "No data available";
const Y_TICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub magnitude: f64,
    pub color: &'static str,
    pub value_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    pub data_key: String,
    pub label_angle: f64,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub data_key: String,
    pub ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub bars: Vec<Bar>,
    pub x_axis: XAxis,
    pub y_axis: YAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wedge {
    pub label: String,
    pub magnitude: f64,
    pub color: &'static str,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendLine {
    pub color: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub wedges: Vec<Wedge>,
    pub name_key: String,
    pub outer_radius: u32,
    pub legend: Vec<LegendLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartRendering {
    Bar(BarChart),
    Pie(PieChart),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartBody {
    NoData { message: String },
    Charts { charts: Vec<ChartRendering> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportAffordance {
    pub enabled: bool,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPresentation {
    pub title: String,
    pub stats: SummaryStats,
    pub stat_chips: Vec<String>,
    pub body: ChartBody,
    pub export: ExportAffordance,
}

impl ChartPresentation {
    pub fn charts(&self) -> &[ChartRendering] {
        match &self.body {
            ChartBody::Charts { charts } => charts,
            ChartBody::NoData { .. } => &[],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.body, ChartBody::NoData { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PresentationAdapter {
    config: PresentationConfig,
}

impl PresentationAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PresentationConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    pub fn format_amount(&self, amount: Option<f64>) -> String {
        self.config.currency.format(amount)
    }

    pub fn present(&self, chart: &ChartData, directive: &ChartDirective) -> ChartPresentation {
        let stats = chart.stats();
        let stat_chips = vec![
            format!("Total: {}", self.format_amount(Some(stats.total))),
            format!("Avg: {}", self.format_amount(Some(stats.average))),
            format!("Top: {}", stats.top_label),
        ];
        let body = if chart.is_empty() {
            ChartBody::NoData {
                message: NO_DATA_TEXT.to_string(),
            }
        } else {
            let mut charts = Vec::with_capacity(2);
            if directive.kind.includes_bar() {
                charts.push(ChartRendering::Bar(self.bar_chart(chart)));
            }
            if directive.kind.includes_pie() {
                charts.push(ChartRendering::Pie(self.pie_chart(chart, stats.total)));
            }
            ChartBody::Charts { charts }
        };
        debug!(
            kind = directive.kind.as_str(),
            rows = chart.len(),
            "prepared chart presentation"
        );
        ChartPresentation {
            title: directive.display_title(),
            stat_chips,
            export: ExportAffordance {
                enabled: !chart.is_empty(),
                file_name: export_file_name(&directive.export_prefix()),
            },
            stats,
            body,
        }
    }

    fn bar_chart(&self, chart: &ChartData) -> BarChart {
        let bars = chart
            .rows
            .iter()
            .map(|row| Bar {
                label: row.label.clone(),
                magnitude: row.magnitude,
                color: row.color,
                value_label: self
                    .config
                    .show_value_labels
                    .then(|| self.format_amount(Some(row.magnitude))),
            })
            .collect::<Vec<_>>();
        let ticks = axis_ticks(bars.iter().map(|bar| bar.magnitude), Y_TICK_COUNT)
            .into_iter()
            .map(|value| AxisTick {
                value,
                text: self.format_amount(Some(value)),
            })
            .collect();
        BarChart {
            bars,
            x_axis: XAxis {
                data_key: chart.roles.label_key.clone(),
                label_angle: self.config.x_label_angle,
                height: self.config.x_axis_height,
            },
            y_axis: YAxis {
                data_key: chart.roles.magnitude_key.clone(),
                ticks,
            },
        }
    }

    fn pie_chart(&self, chart: &ChartData, total: f64) -> PieChart {
        let wedges: Vec<Wedge> = chart
            .rows
            .iter()
            .map(|row| Wedge {
                label: row.label.clone(),
                magnitude: row.magnitude,
                color: row.color,
                share: if total > 0.0 && row.magnitude > 0.0 {
                    row.magnitude / total
                } else {
                    0.0
                },
            })
            .collect();
        let legend = if self.config.show_legend {
            wedges
                .iter()
                .enumerate()
                .map(|(index, wedge)| LegendLine {
                    color: wedge.color,
                    text: format!(
                        "{} — {}",
                        legend_label(&wedge.label, index),
                        self.format_amount(Some(wedge.magnitude))
                    ),
                })
                .collect()
        } else {
            Vec::new()
        };
        PieChart {
            wedges,
            name_key: chart.roles.label_key.clone(),
            outer_radius: self.config.pie_outer_radius,
            legend,
        }
    }
}

// Unlabelled wedges are numbered from 1 in the legend.
fn legend_label(label: &str, index: usize) -> String {
    if label == LABEL_PLACEHOLDER {
        format!("Item {}", index + 1)
    } else {
        label.to_string()
    }
}

pub fn present(chart: &ChartData, directive: &ChartDirective) -> ChartPresentation {
    PresentationAdapter::new().present(chart, directive)
}

/// Evenly spaced ticks on a 1/2/5 step covering zero and every magnitude.
pub fn axis_ticks(values: impl Iterator<Item = f64>, count: usize) -> Vec<f64> {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if count < 2 || hi - lo <= 0.0 {
        return vec![0.0];
    }
    let step = nice_step((hi - lo) / (count - 1) as f64);
    let start = (lo / step).floor() * step;
    let mut ticks = Vec::with_capacity(count + 1);
    let mut tick = start;
    while tick < hi + step * 0.5 {
        ticks.push(if tick.abs() < step * 1e-9 { 0.0 } else { tick });
        tick += step;
    }
    ticks
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
