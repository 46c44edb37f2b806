pub mod evaluation_service;
pub mod file_store;
pub mod scoring;
pub mod session_store;

pub use evaluation_service::{EvaluationService, RetryPolicy};
pub use file_store::FileSlotStore;
pub use scoring::{CompositeScore, Feedback, Metric, MetricLevel, WordCountRatio};
pub use session_store::{FileStorage, KeyValueStorage, MemoryStorage, SessionStore, SessionToken};
