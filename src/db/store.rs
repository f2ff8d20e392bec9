//! 订单存储: 只支持插入与全量查询

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::db::queries;
use crate::error::StoreError;
use crate::models::{NewOrder, Order};

/// 订单存储接口
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 写入订单, 返回存储分配的ID
    async fn insert(&self, order: &NewOrder) -> Result<i64, StoreError>;

    /// 全部订单, 按插入顺序
    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;
}

/// Postgres 存储
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &NewOrder) -> Result<i64, StoreError> {
        queries::insert_order(&self.pool, order).await
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = queries::list_orders(&self.pool).await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }
}

/// 内存存储 (未配置数据库时使用), ID 从 1 开始递增
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &NewOrder) -> Result<i64, StoreError> {
        let mut orders = self.orders.write().await;
        let id = orders.len() as i64 + 1;
        orders.push(order.clone().with_id(id));
        Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().await.clone())
    }
}
