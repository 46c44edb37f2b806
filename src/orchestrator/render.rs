//! 终端渲染
//!
//! 把总结页 / 抽取结果转换成纯文本

use std::fmt::Write;

use crate::models::{format_file_size, ExtractedText, Role};
use crate::orchestrator::SummaryView;
use crate::services::{FileSlotStore, Metric, MetricLevel};
use crate::workflow::{EvaluationReport, ExtractionReport, ExtractionStep};

const BAR_CELLS: usize = 20;

/// 进度条，例如 `[██████░░░░]`
pub fn bar(width_percent: u8) -> String {
    let filled = (width_percent.min(100) as usize * BAR_CELLS + 50) / 100;
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "░".repeat(BAR_CELLS - filled)
    )
}

fn level_marker(level: MetricLevel) -> &'static str {
    match level {
        MetricLevel::High => "🟢",
        MetricLevel::Medium => "🟡",
        MetricLevel::Low => "🔴",
        MetricLevel::NotApplicable => "⚪",
    }
}

pub fn render_metric(metric: &Metric) -> String {
    let value = match metric.percent {
        Some(p) => format!("{}%", p),
        None => "N/A".to_string(),
    };
    format!(
        "{} {:<28} {} {}",
        level_marker(metric.level),
        metric.label,
        bar(metric.bar_width),
        value
    )
}

pub fn render_report(report: &EvaluationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Student Test Summary");
    for metric in &report.metrics {
        let _ = writeln!(out, "  {}", render_metric(metric));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Test Results");
    let _ = writeln!(
        out,
        "  {}% {} {}",
        report.score.display_percentage,
        bar(report.score.bar_width),
        report.score.feedback
    );
    out
}

pub fn render_summary(view: &SummaryView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Extracted Answer Text Review");

    if !view.files_available {
        let _ = writeln!(
            out,
            "Your processed data is available, but files cannot be displayed after reload."
        );
    }

    for role in Role::ALL {
        let _ = writeln!(out, "\n--- {} answer sheet ---", role);
        match view.snapshot.text(role) {
            Some(text) => {
                // 降级文本换成提示块，原文不直接展示
                let extracted = ExtractedText::new(role, text);
                match extracted.warning_message() {
                    Some(note) => {
                        let _ = writeln!(out, "⚠️ Processing Note: {}", note);
                    }
                    None => {
                        let _ = writeln!(out, "{}", text.trim());
                    }
                }
            }
            None => {
                let _ = writeln!(out, "No text extracted from the file.");
            }
        }
    }
    let _ = writeln!(out);

    match &view.evaluation {
        Ok(report) => out.push_str(&render_report(report)),
        Err(e) => {
            let _ = writeln!(out, "Evaluation failed: {}", e);
            let _ = writeln!(out, "Run `answer-checker evaluate` to try again.");
        }
    }
    out
}

pub fn render_extraction(report: &ExtractionReport) -> String {
    let mut out = String::new();

    for (role, message) in report.warnings() {
        let _ = writeln!(out, "⚠️ Processing note ({}): {}", role, message);
    }

    match report.failed_role() {
        Some(role) => {
            let _ = writeln!(out, "Error processing {} file. Please try again.", role);
            if let ExtractionStep::TransportFailure(e) = report.step(role) {
                let _ = writeln!(out, "  {}", e);
            }
        }
        None if report.committed => {
            let _ = writeln!(out, "Both answer sheets processed.");
        }
        None => {
            let _ = writeln!(out, "Session was reset while processing; results discarded.");
        }
    }
    out
}

pub fn render_files(files: &FileSlotStore) -> String {
    let mut out = String::new();
    for role in Role::ALL {
        match files.file(role) {
            Some(f) => {
                let _ = writeln!(
                    out,
                    "  {:<8} {} ({}, {})",
                    role,
                    f.name,
                    format_file_size(f.size()),
                    f.extension().unwrap_or_default().to_uppercase()
                );
            }
            None => {
                let _ = writeln!(out, "  {:<8} (no file)", role);
            }
        }
    }
    out
}
