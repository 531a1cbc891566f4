//! Rules command implementation.

use anyhow::Result;
use decl_order_core::{DeclarationOrderCheck, MemberCategory};

use crate::config_resolver::ConfigLocator;
use crate::OrderArgs;

/// Runs the rules command.
pub fn run(overrides: &OrderArgs, locator: &ConfigLocator) -> Result<()> {
    let resolved = locator.load(overrides)?;
    let check = resolved.build_check()?;

    println!("{} {} ({})\n", check.code(), check.name(), resolved.origin);
    print!("{}", render(&check));

    if check.is_enabled() {
        let untracked: Vec<&str> = MemberCategory::ALL
            .iter()
            .filter(|c| !check.tracks(**c))
            .map(|c| c.token())
            .collect();
        if !untracked.is_empty() {
            println!("\nNot constrained: {}", untracked.join(", "));
        }
    } else {
        println!("\nUse --order or [order] custom_declaration_order to configure, e.g.:");
        println!("  decl-order rules --order \"Field(static) ### Field ### CTOR ### Method\"");
    }

    Ok(())
}

/// Renders the rule table.
fn render(check: &DeclarationOrderCheck) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "{:<4} {:<12} {:<30} Case", "#", "Category", "Pattern");
    let _ = writeln!(out, "{}", "-".repeat(60));

    if check.rules().is_empty() {
        let _ = writeln!(out, "(no rules; the check is disabled)");
        return out;
    }

    for (i, rule) in check.rules().iter().enumerate() {
        let case = if rule.is_case_insensitive() {
            "ignore"
        } else {
            "exact"
        };
        let _ = writeln!(
            out,
            "{:<4} {:<12} {:<30} {}",
            i + 1,
            rule.category().token(),
            rule.source().unwrap_or("*"),
            case
        );
    }
    out
}
