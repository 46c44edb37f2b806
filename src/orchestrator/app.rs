//! 会话控制器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建 HTTP 客户端、打开会话存储
//! 2. **路由**：根据持久化标记决定停在上传页还是总结页
//! 3. **状态修复**：标记位与文本不一致时清空会话、回到起点
//! 4. **向下委托**：抽取交给 ExtractionFlow，评测交给 EvaluationFlow

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{GraderApi, GraderClient};
use crate::config::Config;
use crate::error::{AppError, AppResult, StorageError, ValidationError};
use crate::models::{Role, SessionSnapshot, UploadFile};
use crate::services::{EvaluationService, FileSlotStore, RetryPolicy, SessionStore};
use crate::utils::logging;
use crate::workflow::{EvaluationFlow, EvaluationReport, ExtractionFlow, ExtractionReport};

/// 当前应当展示的页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// 上传页（起点）
    Upload,
    /// 总结页；重启后文件句柄已丢失时 `files_available` 为 false
    Summary { files_available: bool },
}

/// 总结页数据
#[derive(Debug)]
pub struct SummaryView {
    pub snapshot: SessionSnapshot,
    pub files_available: bool,
    /// 评测失败时携带错误，由界面提示重试
    pub evaluation: AppResult<EvaluationReport>,
}

/// 应用主结构
pub struct App {
    files: FileSlotStore,
    session: SessionStore,
    extraction: ExtractionFlow,
    evaluation: EvaluationFlow,
}

impl App {
    /// 使用真实的 HTTP 客户端和磁盘会话初始化
    pub fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);

        let api: Arc<dyn GraderApi> = Arc::new(GraderClient::new(&config)?);
        let session = SessionStore::open(&config.session_file);
        Ok(Self::with_parts(config, api, session))
    }

    /// 注入服务与存储（测试使用）
    pub fn with_parts(config: Config, api: Arc<dyn GraderApi>, session: SessionStore) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self {
            extraction: ExtractionFlow::new(api.clone(), session.clone()),
            evaluation: EvaluationFlow::new(EvaluationService::new(api, retry)),
            files: FileSlotStore::new(),
            session,
        }
    }

    pub fn files(&self) -> &FileSlotStore {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileSlotStore {
        &mut self.files
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 从磁盘读取文件并放入对应的槽
    pub async fn upload(&mut self, role: Role, path: &Path) -> AppResult<()> {
        let file = UploadFile::from_path(path)
            .await
            .map_err(|e| match e.downcast::<ValidationError>() {
                Ok(invalid) => AppError::Validation(invalid),
                Err(e) => AppError::Other(format!("{:#}", e)),
            })?;
        self.files.set_file(role, file)?;
        Ok(())
    }

    /// 对两个文件执行抽取
    pub async fn process(&mut self) -> AppResult<ExtractionReport> {
        let report = self.extraction.run(&self.files).await?;
        logging::log_extraction_summary(&report);
        Ok(report)
    }

    /// 根据持久化状态决定页面
    pub async fn route(&mut self) -> AppResult<View> {
        let snapshot = match self.session.restore().await {
            Ok(snapshot) => snapshot,
            Err(AppError::Storage(e @ StorageError::Corrupted { .. })) => {
                warn!("⚠️ 会话文件损坏，重置后回到起点: {}", e);
                self.reset().await?;
                return Ok(View::Upload);
            }
            Err(e) => return Err(e),
        };

        if !snapshot.is_consistent() {
            warn!("⚠️ 会话标记已置位但文本缺失，重置后回到起点");
            self.reset().await?;
            return Ok(View::Upload);
        }

        if snapshot.has_processed_data {
            Ok(View::Summary {
                files_available: self.files.both().is_some(),
            })
        } else {
            Ok(View::Upload)
        }
    }

    /// 总结页：恢复文本并重新评测；不在总结页时返回 None
    pub async fn summary(&mut self) -> AppResult<Option<SummaryView>> {
        let files_available = match self.route().await? {
            View::Summary { files_available } => files_available,
            View::Upload => return Ok(None),
        };

        let snapshot = self.session.restore().await?;
        let evaluation = self.evaluation.run(&snapshot).await;

        Ok(Some(SummaryView {
            snapshot,
            files_available,
            evaluation,
        }))
    }

    /// 清空文件和持久化会话
    pub async fn reset(&mut self) -> AppResult<()> {
        self.files.clear_session(&self.session).await?;
        info!("🔄 已重置，回到上传页");
        Ok(())
    }
}
