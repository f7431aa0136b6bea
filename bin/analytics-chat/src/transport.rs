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

use std::time::Duration;

use async_trait::async_trait;
use chat_contracts::{AnalyticsResponse, QueryRequest, TransportError, TransportResult};
use reqwest::Client;
use tracing::{debug, info, warn};

#[async_trait]
pub trait AnalyticsTransport: Send + Sync {
    async fn query(&self, request: QueryRequest) -> TransportResult<AnalyticsResponse>;

    fn endpoint(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }
}

#[async_trait]
impl AnalyticsTransport for HttpTransport {
    async fn query(&self, request: QueryRequest) -> TransportResult<AnalyticsResponse> {
        debug!(endpoint = %self.endpoint, "Sending analytics query");
        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(&self.endpoint)
                .header("content-type", "application/json")
                .json(&request)
                .send(),
        )
        .await;

        let resp = match response {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) if e.is_timeout() => return Err(TransportError::Timeout),
            Ok(Err(e)) => return Err(TransportError::Network(format!("Request failed: {e}"))),
            Err(_) => {
                warn!("Analytics request timed out after {:?}", self.timeout);
                return Err(TransportError::Timeout);
            }
        };

        let status = resp.status();
        info!("Received response from analytics endpoint: {}", status);
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {e}")))?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("Failed to parse JSON response: {e}")))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn transport(server: &MockServer) -> HttpTransport {
        HttpTransport::new(format!("{}/rag", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_posts_query_and_decodes_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rag"))
            .and(body_json(json!({ "query": "top products" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": "Gadget leads",
                "chart": "pie",
                "data": [{ "name": "Gadget", "revenue": 3 }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport(&server)
            .await
            .query(QueryRequest::new("top products"))
            .await
            .unwrap();
        assert_eq!(response.summary.as_deref(), Some("Gadget leads"));
        assert_eq!(response.records().len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .query(QueryRequest::new("x"))
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .query(QueryRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport =
            HttpTransport::new(format!("{}/rag", server.uri()), Duration::from_millis(50)).unwrap();
        let err = transport.query(QueryRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let transport =
            HttpTransport::new("http://127.0.0.1:9/rag", Duration::from_secs(2)).unwrap();
        let err = transport.query(QueryRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_) | TransportError::Timeout));
    }
}
