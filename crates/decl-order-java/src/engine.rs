//! Declaration order engine.
//!
//! Runs a [`DeclarationOrderCheck`] over the events of a [`FileAnalysis`],
//! producing [`Violation`]s from decl-order-core.

use decl_order_core::{DeclarationOrderCheck, Violation};
use tracing::debug;

use crate::extractor::FileAnalysis;

/// Evaluates the configured declaration order against extracted files.
#[derive(Debug, Clone)]
pub struct OrderEngine {
    check: DeclarationOrderCheck,
}

impl OrderEngine {
    /// Create a new engine from a configured check.
    #[must_use]
    pub fn new(check: DeclarationOrderCheck) -> Self {
        Self { check }
    }

    /// The check this engine runs.
    #[must_use]
    pub fn order_check(&self) -> &DeclarationOrderCheck {
        &self.check
    }

    /// Check a single file analysis for declaration order violations.
    #[must_use]
    pub fn check(&self, analysis: &FileAnalysis) -> Vec<Violation> {
        if !self.check.is_enabled() {
            return Vec::new();
        }

        let violations = self
            .check
            .check_events(&analysis.file_path, &analysis.events);

        debug!(
            "{}: {} members, {} violations",
            analysis.file_path.display(),
            analysis.members().count(),
            violations.len()
        );
        violations
    }
}
