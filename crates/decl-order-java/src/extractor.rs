//! Language-agnostic extraction types and trait.
//!
//! `LanguageExtractor` is the extension point for adding new languages.
//! Implement it to turn source text into the declaration event stream
//! consumed by [`OrderEngine`](crate::OrderEngine).

use decl_order_core::{DeclEvent, MemberDecl};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while extracting declarations from source.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The grammar could not be loaded into the parser.
    #[error("Failed to load {language} grammar: {source}")]
    Language {
        /// Language identifier.
        language: &'static str,
        /// Underlying tree-sitter error.
        source: tree_sitter::LanguageError,
    },

    /// The parser produced no tree.
    #[error("Parser returned no syntax tree for {language} source")]
    NoTree {
        /// Language identifier.
        language: &'static str,
    },
}

/// Result of analyzing a single source file with Tree-sitter.
#[derive(Debug, Clone, Default)]
pub struct FileAnalysis {
    /// Path relative to project root.
    pub file_path: PathBuf,
    /// Body entries, members, and body exits in source order.
    pub events: Vec<DeclEvent>,
    /// Whether the parser had to recover from syntax errors.
    pub has_syntax_errors: bool,
}

impl FileAnalysis {
    /// Iterates the member declarations, ignoring body boundaries.
    pub fn members(&self) -> impl Iterator<Item = &MemberDecl> {
        self.events.iter().filter_map(|event| match event {
            DeclEvent::Member(member) => Some(member),
            DeclEvent::EnterBody | DeclEvent::LeaveBody => None,
        })
    }

    /// Number of structural unit bodies found.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, DeclEvent::EnterBody))
            .count()
    }
}

/// Trait for language-specific Tree-sitter extraction.
///
/// Implement this to add support for a new language.
/// The extractor receives raw source text and returns a [`FileAnalysis`]
/// whose events are balanced: every `EnterBody` has a matching `LeaveBody`.
pub trait LanguageExtractor: Send + Sync {
    /// Language identifier (e.g., `"java"`).
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor handles (e.g., `&["java"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extract the declaration events from source code.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] if the parser cannot be set up.
    fn analyze(&self, source: &str) -> Result<FileAnalysis, ExtractError>;
}
