//! 对账流水线: 识别 -> 标准化 -> 批量匹配 -> 合并
//!
//! 各步骤严格顺序执行。识别失败终止流水线; 匹配失败不致命, 所有明细保持未匹配。

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::models::{LineItem, ReviewRow};
use crate::service::extraction::{Document, ExtractionClient};
use crate::service::matcher::MatchClient;
use crate::service::normalizer;

/// 默认每个查询的候选数量
pub const DEFAULT_CANDIDATE_LIMIT: usize = 5;

/// 匹配阶段结果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// 与明细按下标对齐的候选列表
    Matched(Vec<Vec<String>>),
    Unavailable,
}

/// 流水线输出: 待审核的行
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub rows: Vec<ReviewRow>,
    pub matches_available: bool,
}

pub struct ReconciliationPipeline {
    extractor: Arc<dyn ExtractionClient>,
    matcher: Arc<dyn MatchClient>,
    candidate_limit: usize,
}

impl ReconciliationPipeline {
    pub fn new(extractor: Arc<dyn ExtractionClient>, matcher: Arc<dyn MatchClient>) -> Self {
        Self {
            extractor,
            matcher,
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }

    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }

    /// 处理一份单据
    pub async fn process(&self, document: &Document) -> Result<Reconciliation, PipelineError> {
        // 1. 识别
        let records = self.extractor.extract(document).await.map_err(|e| {
            warn!("extraction failed for {}: {}", document.filename, e);
            PipelineError::from(e)
        })?;
        info!("{}: extracted {} records", document.filename, records.len());

        // 2. 标准化
        let items = normalizer::normalize_records(&records);
        if items.is_empty() {
            return Ok(Reconciliation {
                rows: Vec::new(),
                matches_available: true,
            });
        }

        // 3-4. 批量匹配
        let queries: Vec<String> = items.iter().map(|i| i.item_name.clone()).collect();
        let outcome = self.fetch_matches(&queries).await;

        // 5. 合并
        Ok(merge(items, outcome))
    }

    async fn fetch_matches(&self, queries: &[String]) -> MatchOutcome {
        match self.matcher.match_batch(queries, self.candidate_limit).await {
            Ok(aligned) if aligned.len() == queries.len() => MatchOutcome::Matched(aligned),
            Ok(aligned) => {
                warn!(
                    "match client returned {} lists for {} queries, treating matches as unavailable",
                    aligned.len(),
                    queries.len()
                );
                MatchOutcome::Unavailable
            }
            Err(e) => {
                warn!("matches unavailable: {}", e);
                MatchOutcome::Unavailable
            }
        }
    }
}

/// 合并明细与候选: 首个候选作为初始匹配商品; 无候选则留空
pub fn merge(items: Vec<LineItem>, outcome: MatchOutcome) -> Reconciliation {
    match outcome {
        MatchOutcome::Matched(candidates) => {
            let rows = items
                .into_iter()
                .zip(candidates)
                .map(|(mut line_item, candidates)| {
                    line_item.matched_product = candidates.first().cloned().unwrap_or_default();
                    ReviewRow { line_item, candidates }
                })
                .collect();
            Reconciliation {
                rows,
                matches_available: true,
            }
        }
        MatchOutcome::Unavailable => Reconciliation {
            rows: items
                .into_iter()
                .map(|line_item| ReviewRow {
                    line_item,
                    candidates: Vec::new(),
                })
                .collect(),
            matches_available: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, MatchError};
    use crate::models::{FieldValue, RawRecord};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct FakeExtractor(Option<Vec<Value>>);

    #[async_trait]
    impl ExtractionClient for FakeExtractor {
        async fn extract(&self, _document: &Document) -> Result<Vec<RawRecord>, ExtractionError> {
            match &self.0 {
                Some(records) => Ok(records
                    .iter()
                    .map(|r| r.as_object().cloned().unwrap_or_default())
                    .collect()),
                None => Err(ExtractionError::Status {
                    status: 500,
                    body: "internal error".to_string(),
                }),
            }
        }
    }

    /// 记录每次调用的查询
    #[derive(Default)]
    struct FakeMatcher {
        results: Option<Value>,
        calls: Mutex<Vec<(Vec<String>, usize)>>,
    }

    #[async_trait]
    impl MatchClient for FakeMatcher {
        async fn match_batch(&self, queries: &[String], limit: usize) -> Result<Vec<Vec<String>>, MatchError> {
            self.calls.lock().unwrap().push((queries.to_vec(), limit));
            match &self.results {
                Some(v) => {
                    let resp = serde_json::from_value(v.clone()).unwrap();
                    Ok(crate::service::matcher::align_results(queries, &resp))
                }
                None => Err(MatchError::Decode("service down".to_string())),
            }
        }
    }

    fn pipeline(extractor: FakeExtractor, matcher: Arc<FakeMatcher>) -> ReconciliationPipeline {
        ReconciliationPipeline::new(Arc::new(extractor), matcher)
    }

    fn doc() -> Document {
        Document::new("po.pdf", b"%PDF".to_vec())
    }

    #[tokio::test]
    async fn test_first_candidate_becomes_matched_product() {
        let matcher = Arc::new(FakeMatcher {
            results: Some(json!({"results": {
                "Bolt M6": [{"match": "Bolt M6x20"}, {"match": "Bolt M6x25"}]
            }})),
            ..Default::default()
        });
        let p = pipeline(
            FakeExtractor(Some(vec![json!({"Item": "Bolt M6", "Qty": 10, "Price": 0.5})])),
            matcher.clone(),
        );

        let out = p.process(&doc()).await.unwrap();
        assert!(out.matches_available);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].line_item.matched_product, "Bolt M6x20");
        assert_eq!(out.rows[0].line_item.qty, FieldValue::from(10i64));
        assert_eq!(out.rows[0].candidates, vec!["Bolt M6x20", "Bolt M6x25"]);
    }

    #[tokio::test]
    async fn test_one_batched_match_call_with_default_limit() {
        let matcher = Arc::new(FakeMatcher {
            results: Some(json!({"results": {}})),
            ..Default::default()
        });
        let p = pipeline(
            FakeExtractor(Some(vec![
                json!({"Item": "A"}),
                json!({"Request Item": "B"}),
                json!({"Item Name": "C"}),
            ])),
            matcher.clone(),
        );

        let out = p.process(&doc()).await.unwrap();
        assert_eq!(out.rows.len(), 3);

        let calls = matcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["A", "B", "C"]);
        assert_eq!(calls[0].1, DEFAULT_CANDIDATE_LIMIT);
    }

    #[tokio::test]
    async fn test_n_records_yield_n_aligned_rows() {
        let matcher = Arc::new(FakeMatcher {
            results: Some(json!({"results": {
                "Washer": [{"match": "Flat Washer"}],
                "Nut": [{"match": "Hex Nut"}, {"match": "Lock Nut"}],
                "Gasket": []
            }})),
            ..Default::default()
        });
        let p = pipeline(
            FakeExtractor(Some(vec![
                json!({"Item": "Nut"}),
                json!({"Item": "Gasket"}),
                json!({"Item": "Washer"}),
            ])),
            matcher,
        );

        let out = p.process(&doc()).await.unwrap();
        let summary: Vec<_> = out
            .rows
            .iter()
            .map(|r| (r.line_item.item_name.as_str(), r.line_item.matched_product.as_str(), r.candidates.len()))
            .collect();
        assert_eq!(
            summary,
            vec![("Nut", "Hex Nut", 2), ("Gasket", "", 0), ("Washer", "Flat Washer", 1)]
        );
    }

    #[tokio::test]
    async fn test_match_failure_leaves_products_empty() {
        let matcher = Arc::new(FakeMatcher::default());
        let p = pipeline(
            FakeExtractor(Some(vec![json!({"Item": "A"}), json!({"Item": "B"})])),
            matcher,
        );

        let out = p.process(&doc()).await.unwrap();
        assert!(!out.matches_available);
        assert_eq!(out.rows.len(), 2);
        assert!(out.rows.iter().all(|r| r.line_item.matched_product.is_empty() && r.candidates.is_empty()));
    }

    #[tokio::test]
    async fn test_extraction_failure_aborts_before_matching() {
        let matcher = Arc::new(FakeMatcher::default());
        let p = pipeline(FakeExtractor(None), matcher.clone());

        let err = p.process(&doc()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(ExtractionError::Status { status: 500, .. })));
        assert!(matcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_extraction_is_not_an_error() {
        let matcher = Arc::new(FakeMatcher::default());
        let p = pipeline(FakeExtractor(Some(vec![])), matcher.clone());

        let out = p.process(&doc()).await.unwrap();
        assert!(out.rows.is_empty());
        assert!(matcher.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_merge_unavailable_keeps_every_row() {
        let items = vec![LineItem::default(), LineItem::default()];
        let out = merge(items, MatchOutcome::Unavailable);
        assert_eq!(out.rows.len(), 2);
        assert!(!out.matches_available);
    }
}
