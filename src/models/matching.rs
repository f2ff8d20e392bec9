use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::LineItem;

/// 匹配服务请求体
#[derive(Debug, Serialize)]
pub struct MatchBatchRequest<'a> {
    pub queries: &'a [String],
}

/// 单个候选商品; 服务返回的其他字段 (score 等) 忽略
#[derive(Debug, Clone, Deserialize)]
pub struct MatchCandidate {
    #[serde(rename = "match")]
    pub product: String,
}

/// 匹配服务响应体, 按 query 分组, 保留服务返回的顺序
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchBatchResponse {
    #[serde(default)]
    pub results: IndexMap<String, Vec<MatchCandidate>>,
}

/// 审核行: 明细与其候选列表放在一起, 保证对齐
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub line_item: LineItem,
    pub candidates: Vec<String>,
}
