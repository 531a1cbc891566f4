//! Locating, loading, and overriding the configuration.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config <path>` (trusted as-is, a missing file is an error)
//! 2. `decl-order.toml`, then `.decl-order.toml`, in the project directory
//! 3. `config.toml` in `$DECL_ORDER_CONFIG_DIR` or `~/.decl-order/`
//! 4. Built-in defaults (empty order, check disabled)
//!
//! Command-line overrides from [`OrderArgs`] are applied after loading, and
//! the resulting check is built against the located origin so that parse
//! errors name the file they came from.

use anyhow::{Context, Result};
use decl_order_core::{Config, DeclarationOrderCheck};
use std::path::{Path, PathBuf};

use crate::OrderArgs;

const PROJECT_FILES: [&str; 2] = ["decl-order.toml", ".decl-order.toml"];
const GLOBAL_FILE: &str = "config.toml";
const GLOBAL_DIR_ENV: &str = "DECL_ORDER_CONFIG_DIR";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Builtin,
}

impl ConfigOrigin {
    /// The file backing this origin, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Builtin => None,
        }
    }
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "{}", p.display()),
            Self::Project(p) => write!(f, "{} (project)", p.display()),
            Self::Global(p) => write!(f, "{} (global)", p.display()),
            Self::Builtin => f.write_str("built-in defaults"),
        }
    }
}

/// Finds and loads the configuration for one invocation.
#[derive(Debug, Clone)]
pub struct ConfigLocator {
    project_dir: PathBuf,
    explicit: Option<PathBuf>,
    global_dir: Option<PathBuf>,
}

impl ConfigLocator {
    /// Locator for `project_dir`, with the global directory taken from the environment.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            explicit: None,
            global_dir: global_config_dir(),
        }
    }

    /// Uses `path` instead of searching, when given.
    #[must_use]
    pub fn explicit(mut self, path: Option<&Path>) -> Self {
        self.explicit = path.map(Path::to_path_buf);
        self
    }

    /// Replaces the global config directory.
    #[must_use]
    pub fn global_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.global_dir = dir;
        self
    }

    /// Picks the origin without reading any file.
    #[must_use]
    pub fn locate(&self) -> ConfigOrigin {
        if let Some(path) = &self.explicit {
            return ConfigOrigin::Explicit(path.clone());
        }

        let project = PROJECT_FILES
            .iter()
            .map(|name| ConfigOrigin::Project(self.project_dir.join(name)));
        let global = self
            .global_dir
            .iter()
            .map(|dir| ConfigOrigin::Global(dir.join(GLOBAL_FILE)));

        match project
            .chain(global)
            .find(|origin| origin.path().is_some_and(Path::is_file))
        {
            Some(origin) => {
                tracing::debug!("Found config: {origin}");
                origin
            }
            None => ConfigOrigin::Builtin,
        }
    }

    /// Locates, reads, and applies `overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if the located file cannot be read or parsed.
    pub fn load(&self, overrides: &OrderArgs) -> Result<ResolvedConfig> {
        let origin = self.locate();
        let mut config = match origin.path() {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        };
        if matches!(origin, ConfigOrigin::Global(_)) {
            tracing::info!("Using global config: {origin}");
        }

        apply_overrides(&mut config, overrides);
        Ok(ResolvedConfig { origin, config })
    }
}

/// A loaded configuration together with its origin.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Where the file was found.
    pub origin: ConfigOrigin,
    /// Parsed configuration with overrides applied.
    pub config: Config,
}

impl ResolvedConfig {
    /// Builds the declaration order check.
    ///
    /// # Errors
    ///
    /// Returns an error naming the origin if the order does not parse.
    pub fn build_check(&self) -> Result<DeclarationOrderCheck> {
        self.config
            .build_check()
            .with_context(|| format!("Invalid declaration order in {}", self.origin))
    }
}

/// Applies command-line overrides on top of a loaded configuration.
pub fn apply_overrides(config: &mut Config, overrides: &OrderArgs) {
    if let Some(order) = &overrides.order {
        config.order.custom_declaration_order.clone_from(order);
    }
    if let Some(ignore_case) = overrides.ignore_case {
        config.order.ignore_regex_case = ignore_case;
    }
}

/// `$DECL_ORDER_CONFIG_DIR`, else `~/.decl-order/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os(GLOBAL_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".decl-order")))
}
