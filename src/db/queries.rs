use crate::error::StoreError;
use crate::models::{NewOrder, OrderRow};
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::{Duration, Instant};

/// 写入超时
const INSERT_TIMEOUT: Duration = Duration::from_secs(30);

/// 插入订单, 返回数据库分配的ID
pub async fn insert_order(pool: &PgPool, order: &NewOrder) -> Result<i64, StoreError> {
    tracing::debug!(order_number = %order.order_number, items = order.line_items.len(), "开始插入订单");
    let start_time = Instant::now();

    let query = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO orders (order_number, line_items, created_at)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(&order.order_number)
    .bind(Json(&order.line_items))
    .bind(order.created_at);

    match tokio::time::timeout(INSERT_TIMEOUT, query.fetch_one(pool)).await {
        Ok(Ok(id)) => {
            tracing::info!("✓ 订单 {} 插入成功, id={}, 耗时: {:?}", order.order_number, id, start_time.elapsed());
            Ok(id)
        }
        Ok(Err(e)) => {
            tracing::error!("✗ 订单插入失败, 耗时: {:?}, 错误: {:?}", start_time.elapsed(), e);
            Err(e.into())
        }
        Err(_) => {
            tracing::error!("✗ 订单插入超时 (>{}秒)!", INSERT_TIMEOUT.as_secs());
            Err(StoreError::Timeout)
        }
    }
}

/// 查询全部订单 (按插入顺序)
pub async fn list_orders(pool: &PgPool) -> Result<Vec<OrderRow>, StoreError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, order_number, line_items, created_at
        FROM orders
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
