//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# decl-order configuration

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src/main/java"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/build/**",
    "**/generated/**",
]

# Respect .gitignore files
respect_gitignore = true

# Number of worker threads (default: all cores)
# parallelism = 4

[order]
# Rule fragments separated by ###. Each fragment is a member category
# (Field, CTOR, Method, InnerClass) with an optional regular expression in
# parentheses, searched in the member's modifiers and annotations.
custom_declaration_order = "Field(static final) ### Field(static) ### Field ### CTOR ### Method ### InnerClass"

# Match the regular expressions case-insensitively
ignore_regex_case = false

# Severity of violations: "error", "warning", or "info"
severity = "error"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("decl-order.toml"), force)?;

    println!("Created decl-order.toml");
    println!("\nNext steps:");
    println!("  1. Edit the [order] table in decl-order.toml");
    println!("  2. Run: decl-order rules");
    println!("  3. Run: decl-order check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
