//! 评分计算
//!
//! 纯函数：加权总分、反馈分档、字数比、分项指标

use std::fmt::Display;

use crate::models::EvaluationResult;

/// 关键词权重
pub const KEYWORD_WEIGHT: f64 = 0.1;
/// 语义权重
pub const SEMANTIC_WEIGHT: f64 = 0.7;
/// 语气权重
pub const TONE_WEIGHT: f64 = 0.2;

/// 反馈分档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// [0, 30]
    MoreAreasToCover,
    /// (30, 50)，负数也落在这里
    BuildingTheBasics,
    /// [50, 70)
    OnTheRightTrack,
    /// [70, 85)
    StrongEffort,
    /// [85, ∞)
    Mastery,
}

impl Feedback {
    /// 按展示百分比分档，先命中先返回
    pub fn for_percentage(percent: i64) -> Self {
        if (0..=30).contains(&percent) {
            Feedback::MoreAreasToCover
        } else if percent < 50 {
            Feedback::BuildingTheBasics
        } else if percent < 70 {
            Feedback::OnTheRightTrack
        } else if percent < 85 {
            Feedback::StrongEffort
        } else {
            Feedback::Mastery
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Feedback::MoreAreasToCover => "You have a lot more areas to cover.",
            Feedback::BuildingTheBasics => "Building the Basics",
            Feedback::OnTheRightTrack => "On the Right Track",
            Feedback::StrongEffort => "Strong Effort, High Potential",
            Feedback::Mastery => "Mastery and Excellence",
        }
    }
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 加权总分
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScore {
    /// 未取整的总分（0-100 量级，可能越界）
    pub final_score: f64,
    /// 取整后的展示值，不做截断
    pub display_percentage: i64,
    /// 进度条宽度，截断到 [0, 100]
    pub bar_width: u8,
    pub feedback: Feedback,
}

impl CompositeScore {
    pub fn from_result(result: &EvaluationResult) -> Self {
        let final_score = KEYWORD_WEIGHT * result.keyword * 100.0
            + SEMANTIC_WEIGHT * result.semantics * 100.0
            + TONE_WEIGHT * result.tone_score * 100.0;
        let display_percentage = round_half_up(final_score);

        Self {
            final_score,
            display_percentage,
            bar_width: bar_width(display_percentage),
            feedback: Feedback::for_percentage(display_percentage),
        }
    }
}

/// 指标颜色档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricLevel {
    /// > 66
    High,
    /// > 33
    Medium,
    Low,
    /// 不适用，不着色
    NotApplicable,
}

impl MetricLevel {
    pub fn for_percent(percent: i64) -> Self {
        if percent > 66 {
            MetricLevel::High
        } else if percent > 33 {
            MetricLevel::Medium
        } else {
            MetricLevel::Low
        }
    }
}

/// 单个分项指标
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    /// None 表示不适用（例如参考答案为空时的字数比）
    pub percent: Option<i64>,
    pub bar_width: u8,
    pub level: MetricLevel,
}

impl Metric {
    /// 由 [0,1] 量级的原始分数构建
    pub fn from_ratio(label: impl Into<String>, ratio: f64) -> Self {
        Self::from_percent(label, Some(round_half_up(ratio * 100.0)))
    }

    pub fn from_percent(label: impl Into<String>, percent: Option<i64>) -> Self {
        let value = percent.unwrap_or(0);
        Self {
            label: label.into(),
            percent,
            bar_width: bar_width(value),
            level: percent.map_or(MetricLevel::NotApplicable, MetricLevel::for_percent),
        }
    }
}

/// 字数比
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordCountRatio {
    pub model_words: usize,
    pub student_words: usize,
    /// 参考答案为空时为 None
    pub percent: Option<i64>,
}

impl WordCountRatio {
    pub fn compute(model_text: &str, student_text: &str) -> Self {
        let model_words = word_count(model_text);
        let student_words = word_count(student_text);

        let percent = if model_words == 0 {
            None
        } else {
            let ratio = student_words as f64 / model_words as f64 * 100.0;
            Some(round_half_up(ratio).min(100))
        };

        Self {
            model_words,
            student_words,
            percent,
        }
    }
}

/// 按连续空白切分后的词数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 四舍五入（.5 向上取整）
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn bar_width(percent: i64) -> u8 {
    percent.clamp(0, 100) as u8
}
