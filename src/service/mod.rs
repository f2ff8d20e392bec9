pub mod export;
pub mod extraction;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod review;
pub mod sessions;
pub mod submission;

pub use extraction::{Document, ExtractionClient, HttpExtractionClient};
pub use matcher::{HttpMatchClient, MatchClient};
pub use pipeline::{MatchOutcome, Reconciliation, ReconciliationPipeline};
pub use review::EditableOrder;
pub use sessions::ReviewSessions;
pub use submission::OrderService;
