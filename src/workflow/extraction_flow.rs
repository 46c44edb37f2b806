//! 文本抽取流程 - 流程层
//!
//! 核心职责：把两份答卷依次送去抽取，并把结果写入会话
//!
//! 流程顺序：
//! 1. 抽取参考答案（失败则整体终止，不再请求学生答卷）
//! 2. 保存参考答案文本（即使后面失败也保留）
//! 3. 抽取学生答卷
//! 4. 两段文本一起提交，置位完成标记

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::{GraderApi, EXTRACT_ENDPOINT};
use crate::error::{ApiError, AppResult, ValidationError};
use crate::models::{ExtractedText, Role, UploadFile};
use crate::services::{FileSlotStore, SessionStore};
use crate::utils::logging::truncate_text;

/// 单个文件的抽取结果
#[derive(Debug)]
pub enum ExtractionStep {
    /// 抽取成功（可能带降级标记）
    Success(ExtractedText),
    /// 网络失败 / 非成功状态码 / 空文本
    TransportFailure(ApiError),
    /// 前一步失败，没有发起请求
    NotAttempted,
    /// 请求期间会话被重置，结果未写入
    Superseded,
}

impl ExtractionStep {
    pub fn text(&self) -> Option<&ExtractedText> {
        match self {
            ExtractionStep::Success(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExtractionStep::TransportFailure(_))
    }
}

/// 一次抽取的完整结果
#[derive(Debug)]
pub struct ExtractionReport {
    pub model: ExtractionStep,
    pub student: ExtractionStep,
    /// 两段文本已提交且完成标记已置位
    pub committed: bool,
}

impl ExtractionReport {
    pub fn step(&self, role: Role) -> &ExtractionStep {
        match role {
            Role::Model => &self.model,
            Role::Student => &self.student,
        }
    }

    /// 第一个失败的角色
    pub fn failed_role(&self) -> Option<Role> {
        Role::ALL.into_iter().find(|r| self.step(*r).is_failure())
    }

    /// 需要以提示条形式展示的降级信息
    pub fn warnings(&self) -> Vec<(Role, String)> {
        Role::ALL
            .into_iter()
            .filter_map(|r| {
                self.step(r)
                    .text()
                    .and_then(|t| t.warning_message())
                    .map(|msg| (r, msg))
            })
            .collect()
    }
}

/// 文本抽取流程
///
/// - 严格顺序：学生答卷的请求一定在参考答案完成之后才发出
/// - 不持有文件，只借用文件槽
/// - 会话写入全部通过 SessionStore
pub struct ExtractionFlow {
    api: Arc<dyn GraderApi>,
    session: SessionStore,
}

impl ExtractionFlow {
    pub fn new(api: Arc<dyn GraderApi>, session: SessionStore) -> Self {
        Self { api, session }
    }

    pub async fn run(&self, files: &FileSlotStore) -> AppResult<ExtractionReport> {
        let (model_file, student_file) = files.both().ok_or_else(|| ValidationError::MissingFile {
            role: files.missing().unwrap_or(Role::Model),
        })?;

        let token = self.session.token().await;

        // ========== 1. 参考答案 ==========
        let model = match self.extract_one(Role::Model, model_file).await {
            Ok(text) => text,
            Err(e) => {
                error!("❌ model 文件抽取失败，终止本次处理: {}", e);
                return Ok(ExtractionReport {
                    model: ExtractionStep::TransportFailure(e),
                    student: ExtractionStep::NotAttempted,
                    committed: false,
                });
            }
        };

        if !self
            .session
            .store_text_if_current(token, Role::Model, &model.text)
            .await?
        {
            warn!("⚠️ 会话在抽取期间被重置，丢弃结果");
            return Ok(ExtractionReport {
                model: ExtractionStep::Superseded,
                student: ExtractionStep::NotAttempted,
                committed: false,
            });
        }

        // ========== 2. 学生答卷 ==========
        let student = match self.extract_one(Role::Student, student_file).await {
            Ok(text) => text,
            Err(e) => {
                error!("❌ student 文件抽取失败 (model 文本已保留): {}", e);
                return Ok(ExtractionReport {
                    model: ExtractionStep::Success(model),
                    student: ExtractionStep::TransportFailure(e),
                    committed: false,
                });
            }
        };

        // ========== 3. 提交 ==========
        let committed = self
            .session
            .commit_if_current(token, &model.text, &student.text)
            .await?;

        if !committed {
            warn!("⚠️ 会话在抽取期间被重置，丢弃结果");
            return Ok(ExtractionReport {
                model: ExtractionStep::Success(model),
                student: ExtractionStep::Superseded,
                committed: false,
            });
        }

        info!("✓ 两份答卷抽取完成");
        Ok(ExtractionReport {
            model: ExtractionStep::Success(model),
            student: ExtractionStep::Success(student),
            committed: true,
        })
    }

    /// 抽取单个文件；降级文本照常接受，只记录警告
    async fn extract_one(&self, role: Role, file: &UploadFile) -> Result<ExtractedText, ApiError> {
        info!("🔍 正在抽取 {} 文件: {}", role, file.name);

        let text = self.api.extract_text(file).await?;
        if text.trim().is_empty() {
            return Err(ApiError::EmptyText {
                endpoint: EXTRACT_ENDPOINT.to_string(),
            });
        }

        let extracted = ExtractedText::new(role, text);
        if extracted.is_degraded() {
            warn!(
                "⚠️ {} 文件处理可能有问题 ({:?}): {}",
                role,
                extracted.status,
                truncate_text(&extracted.text, 80)
            );
        } else {
            info!(
                "✓ {} 文件抽取成功，{} 字符",
                role,
                extracted.text.chars().count()
            );
        }

        Ok(extracted)
    }
}
