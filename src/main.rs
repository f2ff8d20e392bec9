use autopo::db::{ensure_schema, MemoryOrderStore, OrderStore, PgOrderStore};
use autopo::service::{HttpExtractionClient, HttpMatchClient};
use autopo::{create_pool, router, AppConfig, AppState, OrderService, ReconciliationPipeline};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 订单存储
    let store: Arc<dyn OrderStore> = match &config.database.url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            info!("Database pool created");
            Arc::new(PgOrderStore::new(pool))
        }
        None => {
            warn!("database.url not set, orders are kept in memory only");
            Arc::new(MemoryOrderStore::new())
        }
    };

    // 对账流水线
    let pipeline = ReconciliationPipeline::new(
        Arc::new(HttpExtractionClient::new(&config.extraction.url)),
        Arc::new(HttpMatchClient::new(&config.matching.url)),
    )
    .with_candidate_limit(config.matching.limit);

    let app = router(AppState::new(pipeline, OrderService::new(store)));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/documents/process          - extract + match a purchase order");
    info!("  GET  /api/reviews/:id                - review rows");
    info!("  PATCH /api/reviews/:id/items/:index  - edit a field");
    info!("  PUT  /api/reviews/:id/items/:index/match - choose matched product");
    info!("  GET  /api/reviews/:id/csv            - export CSV");
    info!("  POST /api/reviews/:id/submit         - submit as order");
    info!("  POST /api/orders/create              - create order");
    info!("  GET  /api/orders/list                - list orders");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
