use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::debug;

use crate::encoding::decode_document;
use crate::error::{Error, Result};

/// Backend method returning a record's PDF attachment as base64.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// `None` when the record has no attachment
    async fn fetch_attachment(&self, record_id: &str) -> Result<Option<String>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRequest<'a> {
    quote_id: &'a str,
}

/// Calls the attachment method over HTTP: a JSON POST carrying the record ID,
/// answered with a JSON string (or `null`).
pub struct HttpRecordService {
    client: Client,
    endpoint: Url,
}

impl HttpRecordService {
    pub fn new(client: Client, endpoint: Url) -> Self {
        HttpRecordService { client, endpoint }
    }
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn fetch_attachment(&self, record_id: &str) -> Result<Option<String>> {
        debug!(endpoint = %self.endpoint, record_id, "requesting attachment");
        let body: Option<String> = self
            .client
            .post(self.endpoint.clone())
            .json(&AttachmentRequest {
                quote_id: record_id,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }
}

/// Fetch and decode a record's attachment.
pub async fn fetch_record_pdf(service: &dyn RecordService, record_id: &str) -> Result<Vec<u8>> {
    match service.fetch_attachment(record_id).await? {
        Some(encoded) if !encoded.trim().is_empty() => {
            let bytes = decode_document(&encoded)?;
            debug!(record_id, bytes = bytes.len(), "decoded attachment");
            Ok(bytes)
        }
        _ => Err(Error::RecordNotFound(record_id.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::Value;
    use std::collections::HashMap;

    /// In-memory record service keyed by record ID
    pub struct FixedRecords(pub HashMap<String, String>);

    #[async_trait]
    impl RecordService for FixedRecords {
        async fn fetch_attachment(&self, record_id: &str) -> Result<Option<String>> {
            Ok(self.0.get(record_id).cloned())
        }
    }

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        Url::parse(&format!("http://{}/attachment", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_http_service_posts_record_id() {
        let router = Router::new().route(
            "/attachment",
            post(|Json(body): Json<Value>| async move {
                match body["quoteId"].as_str() {
                    Some("Q-1") => Json(Value::String(STANDARD.encode(b"%PDF-1.4"))),
                    _ => Json(Value::Null),
                }
            }),
        );
        let service = HttpRecordService::new(Client::new(), serve(router).await);

        let bytes = fetch_record_pdf(&service, "Q-1").await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4");

        let err = fetch_record_pdf(&service, "Q-2").await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(id) if id == "Q-2"));
    }

    #[tokio::test]
    async fn test_http_error_status_is_an_error() {
        let router = Router::new().route(
            "/attachment",
            post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let service = HttpRecordService::new(Client::new(), serve(router).await);

        let err = fetch_record_pdf(&service, "Q-1").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_empty_attachment_is_not_found() {
        let service = FixedRecords(HashMap::from([("Q-1".to_string(), String::new())]));

        let err = fetch_record_pdf(&service, "Q-1").await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_bad_base64_is_a_decode_error() {
        let service = FixedRecords(HashMap::from([("Q-1".to_string(), "%%%".to_string())]));

        let err = fetch_record_pdf(&service, "Q-1").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
