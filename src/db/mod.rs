pub mod pool;
pub mod queries;
pub mod store;

pub use pool::{create_pool, ensure_schema};
pub use store::{MemoryOrderStore, OrderStore, PgOrderStore};
