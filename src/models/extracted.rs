//! 抽取文本模型
//!
//! 抽取服务即使内部部分失败也会返回 200 + 文本，
//! 是否降级只能通过文本里的标记词判断

use serde::{Deserialize, Serialize};

use crate::models::Role;

/// 文本本身就是错误信息时出现的标记
const FAILURE_MARKERS: [&str; 2] = ["OCR processing failed", "Error"];
/// 降级处理时出现的标记
const WARNING_MARKERS: [&str; 2] = ["failed", "Poppler"];
/// PDF 只做了基础文本抽取（缺少 Poppler）
const POPPLER_MARKER: &str = "Poppler";

const POPPLER_NOTE: &str = "Note: PDF processing is limited. Some advanced PDF features may not be available. The basic text extraction will still work.";
const RETRY_SUGGESTION: &str =
    "Suggestion: Try uploading a clearer image or a PDF/DOCX file for better results.";

/// 抽取结果健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStatus {
    Ok,
    Warning,
    Failed,
}

impl ExtractionStatus {
    /// 根据文本内容推断状态
    pub fn from_text(text: &str) -> Self {
        if FAILURE_MARKERS.iter().any(|m| text.contains(m)) {
            ExtractionStatus::Failed
        } else if WARNING_MARKERS.iter().any(|m| text.contains(m)) {
            ExtractionStatus::Warning
        } else {
            ExtractionStatus::Ok
        }
    }
}

/// 单个角色的抽取文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub role: Role,
    pub text: String,
    pub status: ExtractionStatus,
}

impl ExtractedText {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        let text = text.into();
        let status = ExtractionStatus::from_text(&text);
        Self { role, text, status }
    }

    /// 是否需要向用户展示提示条
    pub fn is_degraded(&self) -> bool {
        self.status != ExtractionStatus::Ok
    }

    /// 提示条文案，正常文本返回 None
    pub fn warning_message(&self) -> Option<String> {
        if !self.is_degraded() {
            return None;
        }

        if self.text.contains(POPPLER_MARKER) {
            Some(POPPLER_NOTE.to_string())
        } else {
            Some(format!("{}\n{}", self.text.trim(), RETRY_SUGGESTION))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_markers() {
        assert_eq!(
            ExtractionStatus::from_text("Question 1: photosynthesis"),
            ExtractionStatus::Ok
        );
        assert_eq!(
            ExtractionStatus::from_text("[Page appears to be scanned. Poppler required for OCR.]"),
            ExtractionStatus::Warning
        );
        assert_eq!(
            ExtractionStatus::from_text("Transcription failed. API Response may indicate safety"),
            ExtractionStatus::Warning
        );
        assert_eq!(
            ExtractionStatus::from_text("Image processing Error: bad header"),
            ExtractionStatus::Failed
        );
        assert_eq!(
            ExtractionStatus::from_text("OCR processing failed"),
            ExtractionStatus::Failed
        );
    }

    #[test]
    fn test_warning_message() {
        let ok = ExtractedText::new(Role::Model, "clean text");
        assert_eq!(ok.warning_message(), None);

        let poppler = ExtractedText::new(Role::Student, "--- Page 1 ---\n[Poppler required]");
        assert_eq!(poppler.warning_message().as_deref(), Some(POPPLER_NOTE));

        let failed = ExtractedText::new(Role::Student, "OCR processing failed");
        let msg = failed.warning_message().unwrap();
        assert!(msg.starts_with("OCR processing failed"));
        assert!(msg.contains(RETRY_SUGGESTION));
    }
}
