use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message shown when the backend cannot be contacted at all
pub const UNREACHABLE_MESSAGE: &str =
    "Could not contact Elasticsearch. Please ensure that Elasticsearch is reachable from your browser.";

/// Datasource error types
#[derive(Debug, Error)]
pub enum DatasourceError {
    /// No HTTP response was received from the backend
    #[error("{}", UNREACHABLE_MESSAGE)]
    Unreachable,
    /// Dashboard lookup exhausted every fallback
    #[error("Dashboard not found")]
    NotFound,
    /// Permanent save rejected by the backend
    #[error("Failed to save to elasticsearch {payload}")]
    SaveFailed { payload: String },
    /// Temporary save rejected by the backend
    #[error("Failed to save to temp dashboard to elasticsearch {payload}")]
    TempSaveFailed { payload: String },
    /// Any other backend error response, carrying the raw payload
    #[error("{payload}")]
    Backend { payload: String },
    /// Stored `dashboard` field is not a valid JSON document
    #[error("Malformed stored dashboard: {0}")]
    MalformedDocument(#[source] serde_json::Error),
    /// Backend response did not have the expected shape
    #[error("Unexpected backend response: {0}")]
    Decode(String),
    /// Dashboard document cannot be saved as given
    #[error("Invalid dashboard: {0}")]
    InvalidDashboard(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure of a single backend request
#[derive(Debug, Error)]
pub enum TransportError {
    /// No HTTP status was received (connect, DNS, timeout)
    #[error("connection failure: {0}")]
    Connection(#[source] reqwest::Error),
    /// Status arrived but the body could not be read
    #[error("backend returned {status} with unreadable body: {source}")]
    Body {
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },
    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: Value },
}

impl TransportError {
    /// Backend error body rendered as text, or the connection error message
    pub fn payload(&self) -> String {
        match self {
            Self::Connection(err) => err.to_string(),
            Self::Body { source, .. } => source.to_string(),
            Self::Status { body, .. } => match body {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Connection(_) => None,
            Self::Body { status, .. } | Self::Status { status, .. } => Some(*status),
        }
    }
}

impl From<TransportError> for DatasourceError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connection(_) => Self::Unreachable,
            other => Self::Backend {
                payload: other.payload(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let error = DatasourceError::SaveFailed {
            payload: "{\"error\":\"boom\"}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to save to elasticsearch {\"error\":\"boom\"}"
        );
        assert_eq!(DatasourceError::NotFound.to_string(), "Dashboard not found");
        assert!(DatasourceError::Unreachable
            .to_string()
            .starts_with("Could not contact Elasticsearch"));
    }

    #[test]
    fn test_status_payload_renders_body() {
        let error = TransportError::Status {
            status: StatusCode::CONFLICT,
            body: json!({"error": "VersionConflictEngineException"}),
        };
        assert_eq!(error.payload(), r#"{"error":"VersionConflictEngineException"}"#);
        assert_eq!(error.status(), Some(StatusCode::CONFLICT));
        assert!(!error.is_connection());

        let plain = TransportError::Status {
            status: StatusCode::BAD_REQUEST,
            body: Value::String("bad request".to_string()),
        };
        assert_eq!(plain.payload(), "bad request");
    }

    #[test]
    fn test_unreadable_body_is_not_connection_failure() {
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();
        let error = TransportError::Body {
            status: StatusCode::OK,
            source,
        };
        assert!(!error.is_connection());
        assert_eq!(error.status(), Some(StatusCode::OK));
        assert!(matches!(
            DatasourceError::from(error),
            DatasourceError::Backend { .. }
        ));
    }

    #[test]
    fn test_status_error_converts_to_backend() {
        let error = TransportError::Status {
            status: StatusCode::NOT_FOUND,
            body: json!({"found": false}),
        };
        match DatasourceError::from(error) {
            DatasourceError::Backend { payload } => assert_eq!(payload, r#"{"found":false}"#),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
