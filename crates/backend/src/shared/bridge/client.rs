use std::time::Duration;

use contracts::system::bridge::BridgeOperationResult;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, EXPIRES, PRAGMA};
use reqwest::{Client, Method};
use serde_json::{json, Value};

use super::error::BridgeError;
use super::operations::{BridgeOperation, ResponseShape};

/// HTTP client for the bridge service control plane.
///
/// One request per call, no retries.
#[derive(Clone)]
pub struct BridgeClient {
    http: Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Request(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate, send and decode one operation.
    pub async fn execute(&self, op: &BridgeOperation) -> Result<Value, BridgeError> {
        op.validate()?;

        let headers = if matches!(op, BridgeOperation::ReloadEnv) {
            no_cache_headers()
        } else {
            HeaderMap::new()
        };

        tracing::info!(
            operation = op.name(),
            "Forwarding to bridge: {} {}{}",
            op.method(),
            self.base_url,
            op.path()
        );

        let result = self
            .send(op.method(), &op.path(), &op.query(), op.body(), headers)
            .await;
        if let Err(e) = &result {
            tracing::error!(operation = op.name(), "Bridge call failed: {}", e);
        }
        result
    }

    /// Run an operation and wrap the outcome according to its response shape.
    pub async fn run(&self, op: &BridgeOperation) -> Result<Value, BridgeError> {
        let payload = self.execute(op).await?;
        Ok(match op.shape() {
            ResponseShape::Passthrough => payload,
            ResponseShape::Acknowledge => {
                let data = (!payload.is_null()).then_some(payload);
                serde_json::to_value(BridgeOperationResult::ok(op.success_message(), data))
                    .map_err(|e| BridgeError::Request(e.to_string()))?
            }
        })
    }

    /// Items of one list. A list that was never synced (404) or an unreachable
    /// bridge reads as an empty list.
    pub async fn list_items(&self, list_id: &str) -> Result<Value, BridgeError> {
        let op = BridgeOperation::TraktListItems {
            list_id: list_id.to_string(),
        };
        match self.execute(&op).await {
            Ok(payload) => Ok(payload),
            Err(BridgeError::Upstream { status: 404, .. }) => Ok(empty_list_items(None)),
            Err(BridgeError::Transport { .. }) => {
                Ok(empty_list_items(Some("Backend connection failed")))
            }
            Err(e) => Err(e),
        }
    }

    /// GET an arbitrary path, used by the status composer.
    pub async fn get_json(&self, path: &str) -> Result<Value, BridgeError> {
        self.send(Method::GET, path, &[], None, HeaderMap::new()).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<Value>,
        headers: HeaderMap,
    ) -> Result<Value, BridgeError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            // Тело читаем по возможности, ошибка чтения не должна скрыть статус
            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => format!("<failed to read response body: {e}>"),
            };
            return Err(BridgeError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| BridgeError::from_transport(&e))?;
        Ok(decode_body(&text))
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    headers
}

/// Empty body is `null`; a body that is not JSON is kept as a string.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn empty_list_items(error: Option<&str>) -> Value {
    let mut value = json!({
        "success": true,
        "items": [],
        "count": 0,
        "source": "database",
    });
    if let (Some(error), Some(map)) = (error, value.as_object_mut()) {
        map.insert("error".to_string(), Value::String(error.to_string()));
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;

    fn client_for(server: &MockServer) -> BridgeClient {
        BridgeClient::new(server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_empty_bulk_retrigger_sends_nothing() {
        let server = MockServer::start_async().await;
        let bulk = server.mock(|when, then| {
            when.method(POST).path("/retrigger-media-bulk");
            then.status(200);
        });

        let err = client_for(&server)
            .execute(&BridgeOperation::RetriggerMediaBulk { media_ids: vec![] })
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::InvalidRequest(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        bulk.assert_hits(0);
    }

    #[tokio::test]
    async fn test_bulk_retrigger_forwards_ids_and_payload() {
        let server = MockServer::start_async().await;
        let upstream = json!({ "success": true, "retriggered": 1, "failed": [] });
        let bulk = server.mock(|when, then| {
            when.method(POST)
                .path("/retrigger-media-bulk")
                .json_body(json!({ "media_ids": ["42"] }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(upstream.clone());
        });

        let op = BridgeOperation::RetriggerMediaBulk {
            media_ids: vec![json!("42")],
        };
        let payload = client_for(&server).run(&op).await.unwrap();
        assert_eq!(payload, upstream);
        bulk.assert_hits(1);
    }

    #[tokio::test]
    async fn test_upstream_503_keeps_status_and_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/restart");
            then.status(503).body("overloaded");
        });

        let err = client_for(&server)
            .execute(&BridgeOperation::Restart)
            .await
            .unwrap_err();

        assert_eq!(err.upstream_status(), Some(503));
        let result = err.into_result(BridgeOperation::Restart.action());
        assert_eq!(result.status_code, Some(503));
        assert_eq!(result.details.as_deref(), Some("overloaded"));
    }

    #[tokio::test]
    async fn test_timeout_has_no_status_but_a_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/re-queue-stuck-movies");
            then.status(200).delay(Duration::from_secs(2));
        });

        let client = BridgeClient::new(server.base_url(), Duration::from_millis(200)).unwrap();
        let err = client
            .execute(&BridgeOperation::RequeueStuckMovies)
            .await
            .unwrap_err();

        assert_eq!(err.upstream_status(), None);
        assert!(matches!(err, BridgeError::Transport { timed_out: true, .. }));
        assert!(err.to_string().contains("timed out"));
        assert_eq!(err.status_code(), axum::http::StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_reload_sends_no_cache_headers() {
        let server = MockServer::start_async().await;
        let reload = server.mock(|when, then| {
            when.method(POST)
                .path("/reload-env")
                .header("cache-control", "no-cache, no-store, must-revalidate")
                .header("pragma", "no-cache");
            then.status(200).json_body(json!({ "status": "success" }));
        });

        let result = client_for(&server).run(&BridgeOperation::ReloadEnv).await.unwrap();
        assert_eq!(result["message"], "Environment variables reloaded successfully");
        reload.assert();
    }

    #[tokio::test]
    async fn test_list_query_is_forwarded() {
        let server = MockServer::start_async().await;
        let lists = server.mock(|when, then| {
            when.method(GET)
                .path("/api/trakt-lists")
                .query_param("active_only", "true");
            then.status(200).json_body(json!({ "lists": [] }));
        });

        let payload = client_for(&server)
            .run(&BridgeOperation::ListTraktLists { active_only: true })
            .await
            .unwrap();
        assert_eq!(payload, json!({ "lists": [] }));
        lists.assert();
    }

    #[tokio::test]
    async fn test_list_items_not_synced_reads_as_empty() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/trakt-lists/7/items");
            then.status(404).body("not found");
        });

        let payload = client_for(&server).list_items("7").await.unwrap();
        assert_eq!(payload["count"], 0);
        assert_eq!(payload["source"], "database");
        assert!(payload.get("error").is_none());
    }

    #[tokio::test]
    async fn test_list_items_unreachable_bridge_reads_as_empty() {
        // Ничего не слушает на этом порту
        let client = BridgeClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let payload = client.list_items("7").await.unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["error"], "Backend connection failed");
    }

    #[tokio::test]
    async fn test_list_items_server_error_is_surfaced() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/trakt-lists/7/items");
            then.status(500).body("boom");
        });

        let err = client_for(&server).list_items("7").await.unwrap_err();
        assert_eq!(err.upstream_status(), Some(500));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(""), Value::Null);
        assert_eq!(decode_body("{\"a\":1}"), json!({ "a": 1 }));
        assert_eq!(decode_body("ok"), Value::String("ok".into()));
    }
}
