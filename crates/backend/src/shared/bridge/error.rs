use axum::http::StatusCode;
use contracts::system::bridge::BridgeOperationResult;
use thiserror::Error;

/// Failure of one proxied bridge call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Rejected before anything was sent to the bridge.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The bridge answered with a non-success status.
    #[error("bridge returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    /// The bridge could not be reached at all.
    #[error("bridge unreachable: {message}")]
    Transport { message: String, timed_out: bool },
    #[error("failed to build bridge request: {0}")]
    Request(String),
}

impl BridgeError {
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let timed_out = err.is_timeout();
        let message = if timed_out {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        BridgeError::Transport { message, timed_out }
    }

    /// HTTP status reported by the bridge itself, `None` when it never answered.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            BridgeError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Status the dashboard answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BridgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            BridgeError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            BridgeError::Transport { timed_out: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            BridgeError::Transport { .. } | BridgeError::Request(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn into_result(self, operation: &str) -> BridgeOperationResult {
        let status_code = self.upstream_status();
        match self {
            BridgeError::InvalidRequest(reason) => BridgeOperationResult::failed(reason, None, None),
            BridgeError::Upstream { status, body } => BridgeOperationResult::failed(
                format!("Failed to {operation}: HTTP {status}"),
                Some(body),
                status_code,
            ),
            BridgeError::Transport { message, .. } | BridgeError::Request(message) => {
                BridgeOperationResult::failed(format!("Failed to {operation}"), Some(message), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BridgeError::InvalidRequest("media id is required".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BridgeError::Upstream { status: 503, body: "overloaded".into() }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            BridgeError::Transport { message: "timed out".into(), timed_out: true }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            BridgeError::Transport { message: "refused".into(), timed_out: false }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upstream_failure_keeps_status_and_body() {
        let result = BridgeError::Upstream { status: 503, body: "overloaded".into() }
            .into_result("restart service");
        assert!(!result.success);
        assert_eq!(result.status_code, Some(503));
        assert_eq!(result.details.as_deref(), Some("overloaded"));
        assert!(result.error.unwrap().contains("restart service"));
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let result = BridgeError::Transport { message: "connection refused".into(), timed_out: false }
            .into_result("reload environment");
        assert_eq!(result.status_code, None);
        assert_eq!(result.details.as_deref(), Some("connection refused"));
    }
}
