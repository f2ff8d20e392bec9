use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use super::LineItem;

/// 订单创建请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// 待写入的订单 (尚未分配存储ID)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub order_number: String,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn with_id(self, id: i64) -> Order {
        Order {
            id,
            order_number: self.order_number,
            line_items: self.line_items,
            created_at: self.created_at,
        }
    }
}

/// 已持久化的订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: i64,
    pub order_number: String,
    pub line_items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

/// 订单表 (orders)
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub line_items: Json<Vec<LineItem>>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            line_items: row.line_items.0,
            created_at: row.created_at,
        }
    }
}
