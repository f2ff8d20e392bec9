use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::db::OrderStore;
use crate::error::{StoreError, SubmissionError};
use crate::models::{LineItem, NewOrder, Order};
use crate::service::review::EditableOrder;

/// 订单服务: 生成订单号并写入存储
pub struct OrderService {
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// 创建订单。订单号随机生成, 不检查是否与已有订单重复。
    pub async fn create_order(&self, line_items: Vec<LineItem>) -> Result<Order, SubmissionError> {
        let order = NewOrder {
            order_number: generate_order_number(),
            line_items,
            created_at: Utc::now(),
        };
        tracing::debug!("creating order {} with {} line items", order.order_number, order.line_items.len());

        let id = self.store.insert(&order).await.map_err(|e| {
            tracing::error!("failed to store order {}: {}", order.order_number, e);
            e
        })?;
        tracing::info!("order {} created (id={})", order.order_number, id);
        Ok(order.with_id(id))
    }

    /// 提交审核中的订单快照; 失败时审核状态保持不变, 可重试
    pub async fn submit(&self, review: &EditableOrder) -> Result<Order, SubmissionError> {
        self.create_order(review.line_items()).await
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.store.find_all().await
    }
}

/// "ORD-" + [0, 10000) 的随机整数
pub fn generate_order_number() -> String {
    format!("ORD-{}", rand::thread_rng().gen_range(0..10_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryOrderStore;
    use crate::models::{FieldValue, ReviewRow};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn insert(&self, _order: &NewOrder) -> Result<i64, StoreError> {
            Err(StoreError::Timeout)
        }

        async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
            Err(StoreError::Timeout)
        }
    }

    #[test]
    fn test_order_number_format() {
        for _ in 0..200 {
            let n = generate_order_number();
            let digits = n.strip_prefix("ORD-").unwrap();
            let value: u32 = digits.parse().unwrap();
            assert!(value < 10_000);
            assert_eq!(digits, value.to_string());
        }
    }

    #[tokio::test]
    async fn test_create_empty_order() {
        let service = OrderService::new(Arc::new(MemoryOrderStore::new()));
        let order = service.create_order(vec![]).await.unwrap();
        assert!(order.line_items.is_empty());
        assert_eq!(order.id, 1);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(service.list_orders().await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn test_submit_uses_operator_edits() {
        let service = OrderService::new(Arc::new(MemoryOrderStore::new()));
        let mut review = EditableOrder::new(vec![ReviewRow {
            line_item: LineItem {
                item_name: "Bolt M6".to_string(),
                qty: 10i64.into(),
                matched_product: "Bolt M6x20".to_string(),
                ..Default::default()
            },
            candidates: vec!["Bolt M6x20".to_string()],
        }]);
        review.update_match(0, "Custom Part").unwrap();

        let order = service.submit(&review).await.unwrap();
        assert_eq!(order.line_items[0].matched_product, "Custom Part");
        assert_eq!(order.line_items[0].qty, FieldValue::from(10i64));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let service = OrderService::new(Arc::new(FailingStore));
        let review = EditableOrder::new(vec![ReviewRow::default()]);

        let err = service.submit(&review).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Store(StoreError::Timeout)));
        assert_eq!(review.len(), 1);
    }
}
