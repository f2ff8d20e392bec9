//! 商品匹配服务客户端: 一次请求批量匹配全部明细名称

use async_trait::async_trait;
use indexmap::IndexSet;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::error::MatchError;
use crate::models::{MatchBatchRequest, MatchBatchResponse};

/// 匹配服务接口
///
/// 返回值与 `queries` 按下标对齐: 第 i 个列表是第 i 个查询的候选商品, 按置信度降序。
#[async_trait]
pub trait MatchClient: Send + Sync {
    async fn match_batch(&self, queries: &[String], limit: usize) -> Result<Vec<Vec<String>>, MatchError>;
}

/// HTTP 匹配服务客户端
#[derive(Debug, Clone)]
pub struct HttpMatchClient {
    http: reqwest::Client,
    url: String,
}

impl HttpMatchClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl MatchClient for HttpMatchClient {
    async fn match_batch(&self, queries: &[String], limit: usize) -> Result<Vec<Vec<String>>, MatchError> {
        debug!(url = %self.url, queries = queries.len(), limit, "requesting batch matches");

        let response = self
            .http
            .post(&self.url)
            .query(&[("limit", limit)])
            .header(ACCEPT, "application/json")
            .json(&MatchBatchRequest { queries })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MatchError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let parsed: MatchBatchResponse =
            serde_json::from_str(&body).map_err(|e| MatchError::Decode(e.to_string()))?;
        Ok(align_results(queries, &parsed))
    }
}

/// 按查询文本对齐候选结果。
///
/// 优先按 key 查找; key 缺失时, 只有结果条数与去重后的查询数一致、且该位置的 key
/// 不属于任何查询时才按位置回退, 否则该行没有候选。重复的查询共享同一个候选列表。
pub fn align_results(queries: &[String], response: &MatchBatchResponse) -> Vec<Vec<String>> {
    let distinct: IndexSet<&str> = queries.iter().map(String::as_str).collect();
    let positional = response.results.len() == distinct.len();

    queries
        .iter()
        .map(|query| {
            let candidates = response.results.get(query.as_str()).or_else(|| {
                if !positional {
                    return None;
                }
                let pos = distinct.get_index_of(query.as_str())?;
                let (key, list) = response.results.get_index(pos)?;
                // 该位置已属于另一个查询
                if distinct.contains(key.as_str()) {
                    return None;
                }
                warn!("match result for {:?} missing by key, using position {}", query, pos);
                Some(list)
            });

            candidates
                .map(|list| list.iter().map(|c| c.product.clone()).collect())
                .unwrap_or_default()
        })
        .collect()
}
