pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;

#[cfg(test)]
mod test_support;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use db::create_pool;
pub use service::{OrderService, ReconciliationPipeline};
