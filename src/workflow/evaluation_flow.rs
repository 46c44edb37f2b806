//! 评测流程 - 流程层
//!
//! 从会话快照取出两段文本 → 调用评测 → 计算总分与分项指标。
//! 结果不落盘，每次展示都重新计算。

use tracing::info;

use crate::error::{AppResult, ValidationError};
use crate::models::{EvaluationResult, Role, SessionSnapshot};
use crate::services::{CompositeScore, EvaluationService, Metric, WordCountRatio};

/// 评测报告（总结页的数据模型）
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub result: EvaluationResult,
    pub score: CompositeScore,
    pub word_ratio: WordCountRatio,
    /// Keywords / Semantics / Tone / Word Count
    pub metrics: Vec<Metric>,
}

impl EvaluationReport {
    pub fn build(result: EvaluationResult, model_text: &str, student_text: &str) -> Self {
        let score = CompositeScore::from_result(&result);
        let word_ratio = WordCountRatio::compute(model_text, student_text);

        let metrics = vec![
            Metric::from_ratio("Keywords", result.keyword),
            Metric::from_ratio("Semantics", result.semantics),
            Metric::from_ratio(format!("Tone: {}", result.tone), result.tone_score),
            Metric::from_percent(
                format!(
                    "Word Count: {}/{}",
                    word_ratio.student_words, word_ratio.model_words
                ),
                word_ratio.percent,
            ),
        ];

        Self {
            result,
            score,
            word_ratio,
            metrics,
        }
    }
}

/// 评测流程
pub struct EvaluationFlow {
    service: EvaluationService,
}

impl EvaluationFlow {
    pub fn new(service: EvaluationService) -> Self {
        Self { service }
    }

    /// 对快照中的两段文本进行评测
    pub async fn run(&self, snapshot: &SessionSnapshot) -> AppResult<EvaluationReport> {
        let model = snapshot.text(Role::Model).ok_or(ValidationError::MissingFile { role: Role::Model })?;
        let student = snapshot.text(Role::Student).ok_or(ValidationError::MissingFile { role: Role::Student })?;

        self.evaluate_texts(model, student).await
    }

    pub async fn evaluate_texts(&self, model: &str, student: &str) -> AppResult<EvaluationReport> {
        info!("📊 正在评测答卷...");
        let result = self.service.evaluate(model, student).await?;
        let report = EvaluationReport::build(result, model, student);

        info!(
            "✓ 评测完成: {}% ({})",
            report.score.display_percentage, report.score.feedback
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_metrics() {
        let result = EvaluationResult {
            keyword: 0.8,
            semantics: 0.75,
            tone: "Neutral".to_string(),
            tone_score: 0.6,
        };
        let model = vec!["w"; 50].join(" ");
        let student = vec!["w"; 60].join(" ");

        let report = EvaluationReport::build(result, &model, &student);

        assert_eq!(report.score.display_percentage, 73);
        let labels: Vec<&str> = report.metrics.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Keywords", "Semantics", "Tone: Neutral", "Word Count: 60/50"]
        );
        assert_eq!(report.metrics[0].percent, Some(80));
        assert_eq!(report.metrics[3].percent, Some(100));
    }
}
