//! Check command implementation.

use anyhow::{Context, Result};
use decl_order_java::Analyzer;
use std::path::Path;

use crate::config_resolver::ConfigLocator;
use crate::{OrderArgs, OutputFormat};

/// Runs the check command.
pub fn run(
    path: &Path,
    format: OutputFormat,
    exclude: Vec<String>,
    overrides: &OrderArgs,
    locator: &ConfigLocator,
) -> Result<()> {
    let resolved = locator.load(overrides)?;
    let check = resolved.build_check()?;

    if !check.is_enabled() {
        tracing::warn!(
            "No declaration order configured in {}; set [order] custom_declaration_order or pass --order",
            resolved.origin
        );
    }

    let analyzer = Analyzer::builder()
        .root(path)
        .excludes(exclude)
        .config(&resolved.config.analyzer)
        .check(check)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {:?} with {} order rule(s)",
        path,
        analyzer.engine().order_check().rules().len()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, format, analyzer.root())?;

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
