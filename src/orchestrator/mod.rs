//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层相当于"页面控制器"：持有文件槽和会话，决定当前该展示什么。
//!
//! ## 模块划分
//!
//! ### `app` - 会话控制器
//! - 初始化 HTTP 客户端与会话存储
//! - 路由：上传页 / 总结页
//! - 修复不一致的持久化状态
//!
//! ### `render` - 终端渲染
//! - 总结页、抽取结果、文件列表的纯文本输出
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (路由 + 状态)
//!     ↓
//! workflow::{ExtractionFlow, EvaluationFlow} (单次流程)
//!     ↓
//! services (能力层：文件槽 / 会话 / 评测 / 评分)
//!     ↓
//! clients::GraderApi (远程服务)
//! ```

pub mod app;
pub mod render;

pub use app::{App, SummaryView, View};
