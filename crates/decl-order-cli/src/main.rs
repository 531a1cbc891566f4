//! decl-order CLI tool.
//!
//! Usage:
//! ```bash
//! decl-order check [OPTIONS] [PATH]
//! decl-order rules [--order ORDER]
//! decl-order init
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

use config_resolver::ConfigLocator;

/// Checks the order of fields, constructors, methods, and inner types in Java sources
#[derive(Parser)]
#[command(name = "decl-order")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check declaration order
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        #[command(flatten)]
        order: OrderArgs,
    },

    /// Show the parsed declaration order rules
    Rules {
        #[command(flatten)]
        order: OrderArgs,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Command-line overrides for the `[order]` table.
#[derive(Args, Debug, Default, Clone)]
pub struct OrderArgs {
    /// Declaration order, e.g. "Field(static) ### Field ### CTOR ### Method"
    #[arg(long, env = "DECL_ORDER_ORDER")]
    pub order: Option<String>,

    /// Match modifier patterns case-insensitively (`--ignore-case=false` to force exact)
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub ignore_case: Option<bool>,
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Source snippets with highlighted members.
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            exclude,
            order,
        } => {
            let locator = ConfigLocator::new(&path).explicit(cli.config.as_deref());
            commands::check::run(&path, format, exclude, &order, &locator)
        }
        Commands::Rules { order } => {
            let locator = ConfigLocator::new(".").explicit(cli.config.as_deref());
            commands::rules::run(&order, &locator)
        }
        Commands::Init { force } => commands::init::run(force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_overrides(args: &[&str]) -> OrderArgs {
        let cli = Cli::try_parse_from(["decl-order", "rules"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Rules { order } => order,
            _ => unreachable!(),
        }
    }

    #[test]
    fn ignore_case_flag_forms() {
        assert_eq!(rules_overrides(&[]).ignore_case, None);
        assert_eq!(rules_overrides(&["--ignore-case"]).ignore_case, Some(true));
        assert_eq!(rules_overrides(&["--ignore-case=true"]).ignore_case, Some(true));
        assert_eq!(rules_overrides(&["--ignore-case=false"]).ignore_case, Some(false));
    }

    #[test]
    fn ignore_case_flag_does_not_swallow_path() {
        let cli = Cli::try_parse_from(["decl-order", "check", "--ignore-case", "src"]).unwrap();
        match cli.command {
            Commands::Check { path, order, .. } => {
                assert_eq!(path, PathBuf::from("src"));
                assert_eq!(order.ignore_case, Some(true));
            }
            _ => unreachable!(),
        }
    }
}
