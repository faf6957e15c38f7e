use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use skillcheck_skills::{Report, SkillIndex};

use crate::service::ValidationRun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    passed: bool,
    checked: usize,
    failed: usize,
    reports: &'a [Report],
}

fn display_path(report: &Report) -> String {
    report
        .path
        .as_deref()
        .map_or_else(|| "<input>".to_string(), |p| p.display().to_string())
}

/// Render a validation run for the terminal or as JSON
pub fn render_run(run: &ValidationRun, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(&JsonSummary {
            passed: run.succeeded(),
            checked: run.reports.len(),
            failed: run.failures(),
            reports: &run.reports,
        })?),
        Format::Text => Ok(render_text(run)),
    }
}

fn render_text(run: &ValidationRun) -> String {
    let mut out = String::new();
    let mut errors = 0;
    let mut warnings = 0;

    for report in &run.reports {
        let path = display_path(report);
        if report.is_clean() {
            out.push_str(&format!("{path}: ok\n"));
            continue;
        }
        for violation in &report.violations {
            out.push_str(&format!("{path}: {violation}\n"));
        }
        errors += report.errors().count();
        warnings += report.warnings().count();
    }

    out.push_str(&format!(
        "{} document(s) checked, {} failed ({} error(s), {} warning(s))\n",
        run.reports.len(),
        run.failures(),
        errors,
        warnings
    ));
    out
}

/// Render an index for stdout
pub fn render_index(index: &SkillIndex, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(index.entries())?),
        Format::Text => Ok(index.render_markdown()),
    }
}
