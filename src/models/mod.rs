pub mod evaluation;
pub mod extracted;
pub mod session;
pub mod upload;

pub use evaluation::{EvaluationRequest, EvaluationResult};
pub use extracted::{ExtractedText, ExtractionStatus};
pub use session::{SessionSnapshot, StoredTexts};
pub use upload::{format_file_size, Role, UploadFile, MAX_FILE_SIZE};
