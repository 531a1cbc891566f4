//! Configuration types for decl-order.

use crate::check::DeclarationOrderCheck;
use crate::rules::RuleParseError;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for decl-order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Declaration order options.
    #[serde(default)]
    pub order: OrderConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Builds the check described by the `[order]` table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Order`] if the declaration order is malformed.
    pub fn build_check(&self) -> Result<DeclarationOrderCheck, ConfigError> {
        let mut check = DeclarationOrderCheck::new().with_severity(self.order.severity);
        check.set_ignore_regex_case(self.order.ignore_regex_case)?;
        check.set_custom_declaration_order(&self.order.custom_declaration_order)?;
        Ok(check)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: vec!["**/target/**".to_string(), "**/build/**".to_string()],
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

/// Options of the declaration order check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Rule fragments separated by `###`, e.g. `Field(static) ### Field ### Method`.
    /// An empty order disables the check.
    #[serde(default, alias = "customDeclarationOrder")]
    pub custom_declaration_order: String,

    /// Compile modifier patterns case-insensitively.
    #[serde(default, alias = "ignoreRegExCase")]
    pub ignore_regex_case: bool,

    /// Severity of reported violations.
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            custom_declaration_order: String::new(),
            ignore_regex_case: false,
            severity: default_severity(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_severity() -> Severity {
    Severity::Error
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// The configured declaration order is malformed.
    #[error("Invalid declaration order: {0}")]
    Order(#[from] RuleParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::MemberCategory;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.order.custom_declaration_order.is_empty());
        assert_eq!(config.order.severity, Severity::Error);

        let check = config.build_check().expect("default config should build");
        assert!(!check.is_enabled());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[analyzer]
root = "./src"
exclude = ["**/generated/**"]
parallelism = 4

[order]
custom_declaration_order = "Field(static) ### Field ### CTOR ### Method ### InnerClass"
ignore_regex_case = true
severity = "warning"
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("./src"));
        assert_eq!(config.analyzer.parallelism, Some(4));

        let check = config.build_check().expect("order should parse");
        assert_eq!(check.rules().len(), 5);
        assert!(check.ignores_case());
        assert_eq!(check.severity(), Severity::Warning);
        assert_eq!(
            check.rules().categories(),
            vec![
                MemberCategory::Field,
                MemberCategory::Constructor,
                MemberCategory::Method,
                MemberCategory::InnerType,
            ]
        );
    }

    #[test]
    fn test_checkstyle_option_names() {
        let toml = r#"
[order]
customDeclarationOrder = "Method ### Field"
ignoreRegExCase = true
"#;
        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.order.custom_declaration_order, "Method ### Field");
        assert!(config.order.ignore_regex_case);
    }

    #[test]
    fn test_malformed_order_is_reported() {
        let toml = r#"
[order]
custom_declaration_order = "Field(static ### Method"
"#;
        let config = Config::parse(toml).expect("Failed to parse");
        let err = config.build_check().expect_err("order should be rejected");
        assert!(matches!(
            err,
            ConfigError::Order(RuleParseError::UnbalancedParenthesis { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::parse("[order\n").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
