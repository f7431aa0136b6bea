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

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use crate::builder::{ChartData, ChartDataBuilder};
use crate::message::ChatMessage;

#[derive(Debug)]
pub struct ConversationEntry {
    pub message: ChatMessage,
    chart: OnceCell<Option<Arc<ChartData>>>,
}

impl ConversationEntry {
    fn new(message: ChatMessage) -> Self {
        Self {
            message,
            chart: OnceCell::new(),
        }
    }

    /// Built on first access and reused for every later render of this message.
    pub fn chart(&self) -> Option<Arc<ChartData>> {
        self.chart
            .get_or_init(|| {
                if self.message.data.is_none() {
                    return None;
                }
                let directive = self.message.chart_directive();
                let chart = ChartDataBuilder::new()
                    .build(self.message.records(), &directive.overrides());
                debug!(message = %self.message.id, rows = chart.len(), "built chart data");
                Some(Arc::new(chart))
            })
            .clone()
    }

    pub fn is_chart_built(&self) -> bool {
        self.chart.get().is_some()
    }
}

/// Append-only message log; entries are never edited once pushed.
#[derive(Debug, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) -> Uuid {
        let id = message.id;
        self.entries.push(ConversationEntry::new(message));
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&ConversationEntry> {
        self.entries.iter().find(|entry| entry.message.id == id)
    }

    pub fn chart_for(&self, id: Uuid) -> Option<Arc<ChartData>> {
        self.get(id)?.chart()
    }

    pub fn last_chart(&self) -> Option<(&ConversationEntry, Arc<ChartData>)> {
        self.entries
            .iter()
            .rev()
            .find_map(|entry| entry.chart().map(|chart| (entry, chart)))
    }
}
