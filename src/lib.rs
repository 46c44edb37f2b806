//! # Answer Checker
//!
//! 答卷评测客户端：上传参考答案和学生答卷，交给远程服务抽取文本并评分
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程服务的 HTTP 调用，只暴露能力
//! - `GraderApi` - 抽取 / 评测接口抽象，测试时可替换
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `FileSlotStore` - 文件槽：校验、替换、清空
//! - `SessionStore` - 会话持久化：标记位 + 两段文本
//! - `EvaluationService` - 评测调用（带重试）
//! - `scoring` - 加权总分、反馈分档、字数比
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次完整的处理流程
//! - `ExtractionFlow` - 顺序抽取（model → student → commit）
//! - `EvaluationFlow` - 评测并生成报告
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 路由与状态修复
//! - `orchestrator/render` - 终端输出
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GraderApi, GraderClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{EvaluationResult, ExtractedText, ExtractionStatus, Role, UploadFile};
pub use orchestrator::{App, SummaryView, View};
pub use services::{FileSlotStore, SessionStore};
pub use workflow::{EvaluationReport, ExtractionFlow, ExtractionReport, ExtractionStep};
