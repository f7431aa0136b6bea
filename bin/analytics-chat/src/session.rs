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

use chat_contracts::QueryRequest;
use tally::{ChatMessage, Conversation};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::transport::AnalyticsTransport;

#[derive(Clone)]
pub struct ChatSession {
    transport: Arc<dyn AnalyticsTransport>,
    conversation: Arc<RwLock<Conversation>>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn AnalyticsTransport>) -> Self {
        Self {
            transport,
            conversation: Arc::new(RwLock::new(Conversation::new())),
        }
    }

    pub fn conversation(&self) -> Arc<RwLock<Conversation>> {
        Arc::clone(&self.conversation)
    }

    /// Appends the user's message, then the reply (or an apology) once the
    /// backend answers. Returns the reply's id; blank input sends nothing.
    pub async fn ask(&self, text: &str) -> Option<Uuid> {
        let request = QueryRequest::new(text);
        if request.is_blank() {
            return None;
        }
        self.conversation.write().await.push(ChatMessage::user(text));

        let reply = match self.transport.query(request).await {
            Ok(response) => {
                info!(records = response.records().len(), "analytics reply received");
                ChatMessage::from_response(response)
            }
            Err(e) => {
                warn!(endpoint = self.transport.endpoint(), error = %e, "analytics request failed");
                ChatMessage::apology()
            }
        };
        Some(self.conversation.write().await.push(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_contracts::{AnalyticsResponse, ChatRole, TransportError, TransportResult};
    use serde_json::json;
    use std::time::Duration;
    use tally::APOLOGY_TEXT;

    struct FakeTransport;

    #[async_trait]
    impl AnalyticsTransport for FakeTransport {
        async fn query(&self, request: QueryRequest) -> TransportResult<AnalyticsResponse> {
            match request.query.as_str() {
                "fail" => Err(TransportError::Network("connection refused".into())),
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(AnalyticsResponse {
                        summary: Some("slow".into()),
                        ..Default::default()
                    })
                }
                _ => Ok(serde_json::from_value(json!({
                    "summary": "fast",
                    "chart": "bar",
                    "data": [{ "name": "A", "revenue": 2 }]
                }))
                .unwrap()),
            }
        }

        fn endpoint(&self) -> &str {
            "fake://analytics"
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(Arc::new(FakeTransport))
    }

    #[tokio::test]
    async fn test_ask_appends_user_then_reply() {
        let session = session();
        let id = session.ask("revenue by product").await.unwrap();
        let conversation = session.conversation();
        let conversation = conversation.read().await;
        let roles: Vec<ChatRole> = conversation.iter().map(|e| e.message.role).collect();
        assert_eq!(roles, [ChatRole::User, ChatRole::Assistant]);
        assert_eq!(conversation.chart_for(id).unwrap().stats().total, 2.0);
    }

    #[tokio::test]
    async fn test_failure_appends_apology() {
        let session = session();
        let id = session.ask("fail").await.unwrap();
        let conversation = session.conversation();
        let conversation = conversation.read().await;
        let reply = &conversation.get(id).unwrap().message;
        assert_eq!(reply.text.as_deref(), Some(APOLOGY_TEXT));
        assert!(reply.data.is_none());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let session = session();
        assert!(session.ask("   ").await.is_none());
        assert!(session.conversation().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_asks_append_in_completion_order() {
        let session = session();
        let (slow, fast) = tokio::join!(session.ask("slow"), session.ask("quick"));
        let conversation = session.conversation();
        let conversation = conversation.read().await;
        assert_eq!(conversation.len(), 4);
        let last_two: Vec<Uuid> = conversation.iter().skip(2).map(|e| e.message.id).collect();
        assert_eq!(last_two, [fast.unwrap(), slow.unwrap()]);
    }
}
