pub mod grader_client;

pub use grader_client::{GraderApi, GraderClient, EVALUATION_ENDPOINT, EXTRACT_ENDPOINT};
