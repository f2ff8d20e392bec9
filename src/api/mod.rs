pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower::ServiceBuilder;

use crate::service::{OrderService, ReconciliationPipeline, ReviewSessions};

pub use handlers::*;

/// 上传单据大小上限 (10MB)
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReconciliationPipeline>,
    pub orders: Arc<OrderService>,
    pub sessions: Arc<ReviewSessions>,
}

impl AppState {
    pub fn new(pipeline: ReconciliationPipeline, orders: OrderService) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            orders: Arc::new(orders),
            sessions: Arc::new(ReviewSessions::new()),
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/orders/create", post(handlers::create_order))
        .route("/api/orders/list", get(handlers::list_orders))
        .route("/api/documents/process", post(handlers::process_document))
        .route("/api/reviews/:id", get(handlers::get_review))
        .route("/api/reviews/:id/items/:index", patch(handlers::update_field))
        .route("/api/reviews/:id/items/:index/match", put(handlers::update_match))
        .route("/api/reviews/:id/csv", get(handlers::export_csv))
        .route("/api/reviews/:id/submit", post(handlers::submit_review))
        .layer(ServiceBuilder::new().layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)))
        .with_state(state)
}
