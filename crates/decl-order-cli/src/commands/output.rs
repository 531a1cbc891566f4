//! Shared output formatting for check results.

use anyhow::Result;
use decl_order_core::{LintResult, Severity, ViolationDiagnostic};
use miette::GraphicalReportHandler;
use std::path::Path;

use crate::OutputFormat;

/// Print check results in the specified format.
///
/// `root` is the analyzed directory; violation paths are relative to it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn severity_indicator(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!(
            "  {}: {}",
            severity_indicator(violation.severity),
            violation.message
        );
        for label in &violation.labels {
            println!(
                "  = note: {} at line {}",
                label.message, label.location.line
            );
        }
        if let Some(suggestion) = &violation.suggestion {
            println!("  = help: {}", suggestion.message);
        }
        println!();
    }

    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

/// Renders each violation over its source with `miette`.
///
/// Falls back to the text form when the source can no longer be read.
fn print_pretty(result: &LintResult, root: &Path) {
    let handler = GraphicalReportHandler::new();

    for violation in &result.violations {
        let path = root.join(&violation.location.file);
        let Ok(source) = std::fs::read_to_string(&path) else {
            tracing::warn!("Cannot re-read {} for display", path.display());
            print!("{}", violation.format());
            println!();
            continue;
        };

        let diagnostic = ViolationDiagnostic::new(violation, source);
        let mut rendered = String::new();
        if handler.render_report(&mut rendered, &diagnostic).is_err() {
            print!("{}", violation.format());
        } else {
            print!("{rendered}");
        }
        println!();
    }

    print_summary(result);
}
