//! # decl-order-core
//!
//! Language-independent engine for checking the order of member
//! declarations inside classes and other structural units.
//!
//! A declaration order is written as rule fragments separated by `###`:
//!
//! ```text
//! Field(static final) ### Field ### CTOR ### Method ### InnerClass
//! ```
//!
//! Each fragment names a member category (`Field`, `CTOR`, `Method`,
//! `InnerClass`) and an optional regular expression searched in the member's
//! flattened modifier text. The list position is the rule's priority.
//!
//! This crate provides:
//!
//! - [`RuleParser`] and [`RuleList`] for the order syntax
//! - [`ModifierNode`] and [`flatten_modifiers`] for the modifier text
//! - [`OrderMatcher`] for the per-unit ordering state machine
//! - [`ScopeController`] for nesting of structural units
//! - [`DeclarationOrderCheck`] turning [`DeclEvent`] streams into [`Violation`]s
//!
//! ## Example
//!
//! ```
//! use decl_order_core::{DeclEvent, DeclarationOrderCheck, Location, MemberCategory, MemberDecl};
//! use std::path::{Path, PathBuf};
//!
//! let check = DeclarationOrderCheck::new().with_order("Field ### Method")?;
//! let at = |line| Location::new(PathBuf::new(), line, 5);
//! let events = [
//!     DeclEvent::EnterBody,
//!     DeclEvent::Member(MemberDecl::new(MemberCategory::Method, at(2))),
//!     DeclEvent::Member(MemberDecl::new(MemberCategory::Field, at(3))),
//!     DeclEvent::LeaveBody,
//! ];
//! let violations = check.check_events(Path::new("Foo.java"), &events);
//! assert_eq!(violations.len(), 1);
//! # Ok::<(), decl_order_core::RuleParseError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod config;
mod matcher;
mod modifiers;
mod rules;
mod scope;
mod types;

pub use check::{DeclEvent, DeclarationOrderCheck, MemberDecl, OrderTraversal, CODE, NAME};
pub use config::{AnalyzerConfig, Config, ConfigError, OrderConfig};
pub use matcher::{Evaluation, OrderMatcher, OrderState};
pub use modifiers::{flatten_modifiers, Annotation, ModifierNode};
pub use rules::{
    MatchRule, MemberCategory, RuleList, RuleParseError, RuleParser, RulePattern, SEPARATOR,
};
pub use scope::{MemberOutcome, ScopeController, ScopeStack};
pub use types::{
    Label, LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic,
};
