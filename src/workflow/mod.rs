pub mod evaluation_flow;
pub mod extraction_flow;

pub use evaluation_flow::{EvaluationFlow, EvaluationReport};
pub use extraction_flow::{ExtractionFlow, ExtractionReport, ExtractionStep};
