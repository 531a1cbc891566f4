//! File discovery and parallel analysis.

use decl_order_core::{AnalyzerConfig, DeclarationOrderCheck, LintResult, Violation};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::OrderEngine;
use crate::extractor::{ExtractError, LanguageExtractor};
use crate::java::JavaExtractor;

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading a file or resolving the root.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Error while walking the source tree.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The language front end failed.
    #[error("Failed to analyze {path}: {source}")]
    Extract {
        /// File being analyzed.
        path: PathBuf,
        /// Underlying extractor error.
        source: ExtractError,
    },

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    exclude_patterns: Vec<String>,
    respect_gitignore: Option<bool>,
    parallelism: Option<usize>,
    check: Option<DeclarationOrderCheck>,
    fail_on_read_error: bool,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets whether `.gitignore` files are honored (default: true).
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = Some(respect);
        self
    }

    /// Limits the number of worker threads.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Applies the `[analyzer]` section of a configuration file.
    ///
    /// Values already set on the builder take precedence.
    #[must_use]
    pub fn config(mut self, config: &AnalyzerConfig) -> Self {
        self.root.get_or_insert_with(|| config.root.clone());
        self.exclude_patterns.extend(config.exclude.iter().cloned());
        self.respect_gitignore.get_or_insert(config.respect_gitignore);
        if let Some(threads) = config.parallelism {
            self.parallelism.get_or_insert(threads);
        }
        self
    }

    /// Sets whether an unreadable file aborts the analysis (default: false).
    #[must_use]
    pub fn fail_on_read_error(mut self, fail: bool) -> Self {
        self.fail_on_read_error = fail;
        self
    }

    /// Sets the declaration order check to run.
    #[must_use]
    pub fn check(mut self, check: DeclarationOrderCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be resolved, an exclude pattern
    /// is invalid, or the worker pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map_err(|source| AnalyzerError::Io {
                    path: root.clone(),
                    source,
                })?
                .join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(["**/target/**".to_string(), "**/build/**".to_string()]);
        }
        let excludes = exclude_patterns
            .iter()
            .map(|pattern| glob::Pattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = match self.parallelism {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            ),
            None => None,
        };

        Ok(Analyzer {
            root,
            excludes,
            respect_gitignore: self.respect_gitignore.unwrap_or(true),
            pool,
            engine: OrderEngine::new(self.check.unwrap_or_default()),
            extractors: vec![Box::new(JavaExtractor::new())],
            fail_on_read_error: self.fail_on_read_error,
        })
    }
}

/// Discovers source files and checks their declaration order.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    excludes: Vec<glob::Pattern>,
    respect_gitignore: bool,
    pool: Option<rayon::ThreadPool>,
    engine: OrderEngine,
    extractors: Vec<Box<dyn LanguageExtractor>>,
    fail_on_read_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the engine used for each file.
    #[must_use]
    pub fn engine(&self) -> &OrderEngine {
        &self.engine
    }

    /// Analyzes all files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery, reading, or extraction fails.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let per_file = match &self.pool {
            Some(pool) => pool.install(|| self.analyze_files(&files)),
            None => self.analyze_files(&files),
        }?;

        let mut result = LintResult::new();
        for violations in per_file.into_iter().flatten() {
            result.violations.extend(violations);
            result.files_checked += 1;
        }
        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes files in parallel. Skipped files yield `None`.
    fn analyze_files(
        &self,
        files: &[PathBuf],
    ) -> Result<Vec<Option<Vec<Violation>>>, AnalyzerError> {
        files
            .par_iter()
            .map(|path| match self.analyze_file(path) {
                Ok(violations) => Ok(Some(violations)),
                Err(AnalyzerError::Io { path, source }) if !self.fail_on_read_error => {
                    warn!("Skipping unreadable file {}: {}", path.display(), source);
                    Ok(None)
                }
                Err(e) => Err(e),
            })
            .collect()
    }

    /// Analyzes a single file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or extracted.
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Violation>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let source = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.analyze_source(path, &source)
    }

    /// Analyzes in-memory source as if it were at `path`.
    ///
    /// Files without a registered extractor yield no violations.
    ///
    /// # Errors
    ///
    /// Returns an error if the extractor fails.
    pub fn analyze_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Vec<Violation>, AnalyzerError> {
        let Some(extractor) = self.extractor_for(path) else {
            debug!("No extractor for {}", path.display());
            return Ok(Vec::new());
        };

        let mut analysis = extractor
            .analyze(source)
            .map_err(|source| AnalyzerError::Extract {
                path: path.to_path_buf(),
                source,
            })?;

        if analysis.has_syntax_errors {
            warn!(
                "{}: syntax errors, results may be incomplete",
                path.display()
            );
        }

        analysis.file_path = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
        Ok(self.engine.check(&analysis))
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn LanguageExtractor> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        self.extractors
            .iter()
            .find(|e| e.extensions().contains(&ext))
            .map(|extractor| extractor.as_ref())
    }

    /// Discovers all supported source files under the root.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .require_git(false);

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();

            if !path.is_file() || self.extractor_for(path).is_none() {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path(path) || pattern.matches_path(rel))
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("root", &self.root)
            .field("excludes", &self.excludes)
            .field("respect_gitignore", &self.respect_gitignore)
            .field(
                "parallelism",
                &self.pool.as_ref().map(rayon::ThreadPool::current_num_threads),
            )
            .field("engine", &self.engine)
            .field("fail_on_read_error", &self.fail_on_read_error)
            .finish_non_exhaustive()
    }
}
