/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::workflow::{ExtractionReport, ExtractionStep};

/// 初始化 tracing
///
/// `RUST_LOG` 优先；否则默认 info，verbose 时为 debug
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 答卷评测客户端启动");
    info!("🌐 服务地址: {}", config.api_base_url);
    info!("💾 会话文件: {}", config.session_file.display());
    info!("{}", "=".repeat(60));
}

/// 记录抽取结果统计
pub fn log_extraction_summary(report: &ExtractionReport) {
    let describe = |step: &ExtractionStep| match step {
        ExtractionStep::Success(t) => format!("✅ {:?}, {} 字符", t.status, t.text.chars().count()),
        ExtractionStep::TransportFailure(_) => "❌ 失败".to_string(),
        ExtractionStep::NotAttempted => "⏭️ 未执行".to_string(),
        ExtractionStep::Superseded => "🗑️ 已丢弃".to_string(),
    };

    info!("\n{}", "─".repeat(60));
    info!("📄 model:   {}", describe(&report.model));
    info!("📄 student: {}", describe(&report.student));
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
