pub mod line_item;
pub mod matching;
pub mod order;

pub use line_item::{CanonicalField, FieldValue, LineItem, RawRecord};
pub use matching::{MatchBatchRequest, MatchBatchResponse, MatchCandidate, ReviewRow};
pub use order::{CreateOrderRequest, NewOrder, Order, OrderRow};
