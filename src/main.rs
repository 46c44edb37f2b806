use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use answer_checker::config::{Config, DEFAULT_CONFIG_FILE};
use answer_checker::orchestrator::{render, App, SummaryView, View};
use answer_checker::workflow::ExtractionReport;
use answer_checker::utils::logging;
use answer_checker::Role;
use clap::{Parser, Subcommand};

/// 答卷评测客户端
#[derive(Debug, Parser)]
#[command(name = "answer-checker", version, about = "Upload answer sheets and review the evaluation")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// 覆盖服务地址
    #[arg(long)]
    api_base_url: Option<String>,

    /// 覆盖会话文件
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// 详细日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 上传两份答卷并抽取文本
    Process {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        student: PathBuf,
        /// 抽取成功后立即评测
        #[arg(long)]
        evaluate: bool,
    },
    /// 对已保存的文本重新评测
    Evaluate,
    /// 查看当前会话状态
    Status,
    /// 清空会话
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：文件 → 环境变量 → 命令行
    let mut config = Config::load(&cli.config)?;
    if let Some(url) = cli.api_base_url {
        config.api_base_url = url;
    }
    if let Some(path) = cli.session_file {
        config.session_file = path;
    }
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    let mut app = App::initialize(config)?;

    match cli.command {
        Command::Process {
            model,
            student,
            evaluate,
        } => {
            for (role, path) in [(Role::Model, &model), (Role::Student, &student)] {
                app.upload(role, path)
                    .await
                    .with_context(|| format!("{} file {}", role, path.display()))?;
            }
            print!("{}", render::render_files(app.files()));

            let report = app.process().await?;
            print!("{}", render::render_extraction(&report));

            ensure_committed(&report)?;
            if evaluate {
                print_summary(&mut app).await?;
            }
        }
        Command::Evaluate => print_summary(&mut app).await?,
        Command::Status => match app.route().await? {
            View::Upload => println!("No processed data. Upload both answer sheets to start."),
            View::Summary { .. } => {
                let snapshot = app.session().restore().await?;
                println!(
                    "Processed data available (saved {}).",
                    snapshot.processed_at.as_deref().unwrap_or("unknown")
                );
            }
        },
        Command::Reset => {
            app.reset().await?;
            println!("Session cleared.");
        }
    }

    Ok(())
}

async fn print_summary(app: &mut App) -> Result<()> {
    match app.summary().await? {
        Some(view) => {
            print!("{}", render::render_summary(&view));
            ensure_evaluated(&view)?;
        }
        None => println!("No processed data. Upload both answer sheets to start."),
    }
    Ok(())
}

/// 抽取未提交时以非零状态退出
fn ensure_committed(report: &ExtractionReport) -> Result<()> {
    if !report.committed {
        bail!("answer sheets were not processed");
    }
    Ok(())
}

/// 评测失败时以非零状态退出
fn ensure_evaluated(view: &SummaryView) -> Result<()> {
    if let Err(e) = &view.evaluation {
        bail!("evaluation failed: {}", e);
    }
    Ok(())
}
