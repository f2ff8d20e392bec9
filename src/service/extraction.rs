//! 识别服务客户端: 上传单据, 返回原始明细记录

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::RawRecord;

/// 待识别的单据
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// 识别服务接口
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn extract(&self, document: &Document) -> Result<Vec<RawRecord>, ExtractionError>;
}

/// HTTP 识别服务客户端 (multipart 上传, 单次请求, 无重试)
#[derive(Debug, Clone)]
pub struct HttpExtractionClient {
    http: reqwest::Client,
    url: String,
}

impl HttpExtractionClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn extract(&self, document: &Document) -> Result<Vec<RawRecord>, ExtractionError> {
        debug!(
            url = %self.url,
            filename = %document.filename,
            bytes = document.content.len(),
            "submitting document for extraction"
        );

        let part = Part::bytes(document.content.clone()).file_name(document.filename.clone());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        parse_records(&body)
    }
}

/// 解析识别结果: 顶层必须是数组; 非对象元素按空记录处理, 保持条数不变
fn parse_records(body: &str) -> Result<Vec<RawRecord>, ExtractionError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ExtractionError::Decode(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(ExtractionError::Decode(format!("expected array, got: {}", truncate(body))));
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => map,
            other => {
                warn!("extraction record {} is not an object: {}", idx, other);
                RawRecord::new()
            }
        })
        .collect())
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(200) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_stub;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    #[test]
    fn test_parse_records_array_of_objects() {
        let records = parse_records(r#"[{"Item": "Bolt M6", "Qty": 10}, {"Amount": 5}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Item"], json!("Bolt M6"));
    }

    #[test]
    fn test_parse_records_empty_array() {
        assert!(parse_records("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_records_keeps_count_for_non_objects() {
        let records = parse_records(r#"[{"Item": "A"}, "garbage", 3]"#).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_parse_records_rejects_non_array() {
        assert!(matches!(parse_records(r#"{"error": "x"}"#), Err(ExtractionError::Decode(_))));
        assert!(matches!(parse_records("not json"), Err(ExtractionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_extract_uploads_file_part() {
        async fn handler(mut multipart: Multipart) -> Json<Value> {
            let mut seen = Vec::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.unwrap();
                seen.push(json!({"Item": format!("{}:{}:{}", name, filename, bytes.len())}));
            }
            Json(Value::Array(seen))
        }

        let base = spawn_stub(Router::new().route("/extract", post(handler))).await;
        let client = HttpExtractionClient::new(format!("{}/extract", base));
        let records = client
            .extract(&Document::new("po.pdf", b"%PDF-1.4".to_vec()))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["Item"], json!("file:po.pdf:8"));
    }

    #[tokio::test]
    async fn test_extract_server_error_is_failure() {
        let app = Router::new().route(
            "/extract",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_stub(app).await;
        let client = HttpExtractionClient::new(format!("{}/extract", base));

        let err = client.extract(&Document::new("po.pdf", vec![1, 2, 3])).await.unwrap_err();
        match err {
            ExtractionError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_extract_unreachable_service_is_failure() {
        let client = HttpExtractionClient::new("http://127.0.0.1:1/extract");
        let err = client.extract(&Document::new("po.pdf", vec![])).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Transport(_)));
    }
}
