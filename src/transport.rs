use crate::{config::DatasourceConfig, error::TransportError, metrics};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Decoded response of a successful backend request
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// HTTP access to the Elasticsearch backend
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    config: Arc<DatasourceConfig>,
}

impl Transport {
    pub fn new(config: Arc<DatasourceConfig>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Issue a request against `<url>/<index><path>`
    ///
    /// Resolves with the decoded body on any 2xx status. Non-JSON bodies decode
    /// to `Value::String`, empty bodies to `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        index: &str,
        body: Option<&Value>,
    ) -> Result<RawResponse, TransportError> {
        let url = format!("{}/{}{}", self.config.url, index, path);

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(credential) = &self.config.basic_auth {
            builder = builder.header("Authorization", format!("Basic {}", credential));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %method, url = %url, "Sending backend request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_backend_request(method.as_str(), "connection_error");
                tracing::debug!(method = %method, url = %url, error = %e, "Backend unreachable");
                return Err(TransportError::Connection(e));
            }
        };

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| TransportError::Body { status, source })?;
        let body = decode_body(text);

        if !status.is_success() {
            metrics::record_backend_request(method.as_str(), "error");
            tracing::debug!(method = %method, url = %url, status = %status, "Backend returned error");
            return Err(TransportError::Status { status, body });
        }

        metrics::record_backend_request(method.as_str(), "success");
        Ok(RawResponse { status, body })
    }

    /// GET against the configured index, returning the body only
    pub async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.request(Method::GET, path, &self.config.index, None)
            .await
            .map(|response| response.body)
    }

    /// POST against the configured index, returning the body only
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.request(Method::POST, path, &self.config.index, Some(body))
            .await
            .map(|response| response.body)
    }
}

fn decode_body(text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(String::new()), Value::Null);
        assert_eq!(decode_body(r#"{"_id":"a"}"#.to_string()), json!({"_id": "a"}));
        assert_eq!(
            decode_body("Bad Gateway".to_string()),
            Value::String("Bad Gateway".to_string())
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connection_error() {
        // Reserve a port then release it so nothing is listening there
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}", port);
        let config = Arc::new(DatasourceConfig::new(url, "grafana-dash"));
        let transport = Transport::new(config).unwrap();

        let result = transport.get("/dashboard/home").await;
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }
}
