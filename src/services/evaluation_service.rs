//! 评测服务 - 业务能力层
//!
//! 只负责"拿两段文本换一组分数"能力，失败时有限次重试

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::clients::GraderApi;
use crate::config::Config;
use crate::error::{ApiError, AppResult};
use crate::models::EvaluationResult;

/// 重试策略：固定次数，线性退避
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.evaluation_max_attempts.max(1),
            base_delay: Duration::from_millis(config.evaluation_retry_delay_ms),
        }
    }

    /// 第 n 次失败后的等待时间（n 从 1 开始）
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// 评测服务
pub struct EvaluationService {
    api: Arc<dyn GraderApi>,
    retry: RetryPolicy,
}

impl EvaluationService {
    pub fn new(api: Arc<dyn GraderApi>, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// 调用评测接口；全部重试失败后把最后一次错误返回给调用方
    pub async fn evaluate(&self, model: &str, student: &str) -> AppResult<EvaluationResult> {
        let mut last_error: Option<ApiError> = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.api.evaluate(model, student).await {
                Ok(result) => {
                    debug!(
                        "评测成功 (第 {} 次): keyword={:.3}, semantics={:.3}, tone={} ({:.3})",
                        attempt, result.keyword, result.semantics, result.tone, result.tone_score
                    );
                    return Ok(result);
                }
                Err(e) => {
                    warn!(
                        "⚠️ 评测调用失败 (第 {}/{} 次): {}",
                        attempt, self.retry.max_attempts, e
                    );
                    last_error = Some(e);

                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay_after(attempt)).await;
                    }
                }
            }
        }

        error!("❌ 评测调用彻底失败 (已重试 {} 次)", self.retry.max_attempts);
        Err(last_error
            .map(Into::into)
            .unwrap_or_else(|| crate::error::AppError::Other("评测未执行".to_string())))
    }
}
