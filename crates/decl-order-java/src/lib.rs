//! # decl-order-java
//!
//! Tree-sitter based Java front end for declaration order checks.
//!
//! This crate turns Java sources into the declaration event stream of
//! `decl-order-core` and runs the check over whole source trees. It adds:
//!
//! - [`LanguageExtractor`] trait for pluggable language support
//! - [`JavaExtractor`] for Java member and modifier extraction
//! - [`OrderEngine`] for running a configured check over a [`FileAnalysis`]
//! - [`Analyzer`] for file discovery and parallel analysis
//!
//! ## Example
//!
//! ```no_run
//! use decl_order_core::Config;
//! use decl_order_java::Analyzer;
//!
//! let config = Config::from_file("decl-order.toml".as_ref())?;
//! let analyzer = Analyzer::builder()
//!     .config(&config.analyzer)
//!     .check(config.build_check()?)
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod engine;
pub mod extractor;
pub mod java;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use engine::OrderEngine;
pub use extractor::{ExtractError, FileAnalysis, LanguageExtractor};
pub use java::JavaExtractor;
