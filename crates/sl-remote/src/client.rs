//! Remote source trait and its HTTP implementation

use crate::error::{RemoteError, RemoteResult};
use crate::query::EntityQuery;
use crate::retry::{AttemptError, RetryPolicy};
use async_trait::async_trait;
use log::debug;
use reqwest::header::ACCEPT;
use sl_core::{Credentials, Frame, RemoteConfig};

/// Source of entity records and the metadata document describing them
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Raw XML metadata document
    async fn fetch_metadata(&self) -> RemoteResult<String>;

    /// Records matching a query, with raw machine-named columns
    async fn fetch_rows(&self, query: &EntityQuery) -> RemoteResult<Frame>;
}

/// Live service client: basic auth, uniform timeout, fixed-delay retries
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
}

impl HttpSource {
    pub fn new(config: &RemoteConfig, credentials: Credentials) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials,
            retry: RetryPolicy::new(config.retries, config.retry_delay()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, url: &str, accept: &'static str) -> RemoteResult<String> {
        self.retry
            .run(url, move || async move {
                debug!("GET {}", url);
                let response = self
                    .client
                    .get(url)
                    .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                    .header(ACCEPT, accept)
                    .send()
                    .await
                    .map_err(classify_transport)?;

                let status = response.status();
                if !status.is_success() {
                    debug!("HTTP {} from {}", status, url);
                    return Err(AttemptError::Status(status.as_u16()));
                }
                response.text().await.map_err(classify_transport)
            })
            .await
    }
}

fn classify_transport(err: reqwest::Error) -> AttemptError {
    if err.is_timeout() || err.is_connect() {
        AttemptError::Unreachable(err.to_string())
    } else {
        AttemptError::Fatal(err.to_string())
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_metadata(&self) -> RemoteResult<String> {
        let url = format!("{}/$metadata", self.base_url);
        self.get_text(&url, "application/xml").await
    }

    async fn fetch_rows(&self, query: &EntityQuery) -> RemoteResult<Frame> {
        let url = query.to_url(&self.base_url);
        let body = self.get_text(&url, "application/json").await?;
        decode_records(&url, &body)
    }
}

/// Decode a `{"value": [...]}` record document into a frame
pub fn decode_records(url: &str, body: &str) -> RemoteResult<Frame> {
    let decode_err = |message: String| RemoteError::Decode {
        url: url.to_string(),
        message,
    };
    let doc: serde_json::Value =
        serde_json::from_str(body).map_err(|e| decode_err(e.to_string()))?;
    Frame::from_value_document(doc).map_err(|e| decode_err(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_records_keeps_key_order() {
        let frame = decode_records(
            "u",
            r#"{"@odata.context":"x","value":[{"IVNUM":"IV1","IVDATE":"2023-01-05T00:00:00+02:00","QUANT":3},{"IVNUM":"IV2","QUANT":4.5}]}"#,
        )
        .unwrap();
        assert_eq!(frame.columns(), ["IVNUM", "IVDATE", "QUANT"]);
        assert_eq!(frame.len(), 2);
        assert!(frame.rows()[1][1].is_null());
    }

    #[test]
    fn test_decode_records_without_value_is_empty() {
        let frame = decode_records("u", r#"{"@odata.context":"x"}"#).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_decode_records_rejects_non_json() {
        let err = decode_records("u", "<html>login</html>").unwrap_err();
        assert!(matches!(err, RemoteError::Decode { .. }));
    }

    #[test]
    fn test_http_source_trims_base_url() {
        let config = remote_config("https://erp.example.com/odata/demo/");
        let source = HttpSource::new(
            &config,
            Credentials {
                username: "u".into(),
                password: "p".into(),
            },
        )
        .unwrap();
        assert_eq!(source.base_url(), "https://erp.example.com/odata/demo");
    }

    fn remote_config(url: &str) -> RemoteConfig {
        let json = serde_json::json!({ "url": url });
        serde_json::from_value(json).unwrap()
    }
}
