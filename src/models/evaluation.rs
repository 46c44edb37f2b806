//! 评测结果模型

use serde::{Deserialize, Serialize};

/// 评测服务返回的四个原始分数
///
/// 数值名义上在 [0,1]，但服务端不保证上限，原样保留
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 关键词匹配度
    pub keyword: f64,
    /// 语义相似度
    pub semantics: f64,
    /// 语气标签，例如 "Neutral"
    pub tone: String,
    /// 语气得分
    #[serde(rename = "toneScore")]
    pub tone_score: f64,
}

/// 评测请求体
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest<'a> {
    pub model: &'a str,
    pub student: &'a str,
}
