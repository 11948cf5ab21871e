//! sift - structural pattern matching for JSON-shaped values
//!
//! A matcher engine for asserting on JSON documents: patterns look like
//! the data they match, with matcher nodes embedded wherever a literal
//! comparison is too strict.
//!
//! # Architecture
//!
//! The engine is a small set of types with one dispatch point:
//!
//! - [`Pattern`] — sum type built at construction time: a literal JSON
//!   shape, a container of child patterns, or a [`Matcher`] node
//! - [`Matcher`] — closed enum of matching strategies; evaluation is one
//!   exhaustive `match` in [`Matcher::test`]
//! - [`MatchResult`] — failures as data: matcher name, structural path,
//!   human-readable message
//! - [`Capture`] — a matcher and a handle in one: records matched values,
//!   replayed through a cursor after the run
//! - [`Match`] — factory namespace; pattern-shape misuse panics at
//!   construction instead of producing a pattern that can never match
//!
//! # Key Design Insights
//!
//! 1. **Matchers never panic on target data**: a wrong-shape target is a
//!    recorded failure, so a single `test()` pass reports every mismatch
//!    in the document, not just the first.
//!
//! 2. **Literal means exact**: partiality is opt-in, per node, via
//!    [`Match::object_like`] / [`Match::array_with`]. A literal object in
//!    any position requires symmetric keys.
//!
//! 3. **Captures are deferred**: values recorded during a run are staged
//!    in the [`MatchResult`] and flushed to the shared store by
//!    [`MatchResult::finished`] only when the run has zero failures, so
//!    speculative probes (subsequence scans, negation) never pollute a
//!    capture.
//!
//! # Example
//!
//! ```
//! use sift::{pattern, Match};
//! use serde_json::json;
//!
//! let pattern = pattern!({
//!     "Fred": Match::object_like(pattern!({ "Wobble": "Flob" })),
//! });
//!
//! // Extra fields under object_like are fine.
//! let result = pattern.test(&json!({
//!     "Fred": { "Wobble": "Flob", "Bob": "Cat" },
//! }));
//! assert!(!result.has_failed());
//!
//! // Failures carry the structural path to the mismatch.
//! let result = pattern.test(&json!({ "Fred": { "Bob": "Cat" } }));
//! assert_eq!(
//!     result.to_human_strings(),
//!     vec![r#"/Fred: missing field "Wobble""#.to_string()],
//! );
//! ```
//!
//! # Extensions
//!
//! - [`sift-cfn`](https://docs.rs/sift-cfn) — CloudFormation template
//!   assertions built on this engine (separate crate)
//! - `sift-conformance` — fixture-driven conformance suite (internal)

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod capture;
mod matchers;
mod pattern;
mod result;

pub mod value;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use capture::Capture;
pub use matchers::{Match, Matcher};
pub use pattern::Pattern;
pub use result::{MatchFailure, MatchResult};

// Config surface (feature-gated)
#[cfg(feature = "config")]
pub use config::{CompiledPattern, PatternConfig};

// The value model is serde_json's; re-exported because patterns, results
// and the `pattern!` macro all speak it.
pub use serde_json::{Map, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use sift::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Capture handles
        Capture,
        // Factory namespace
        Match,
        // Failure data
        MatchFailure,
        MatchResult,
        Matcher,
        // Core types
        Pattern,
        // Errors
        PatternError,
        Value,
    };

    #[cfg(feature = "config")]
    pub use crate::{CompiledPattern, PatternConfig};
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth for nested pattern configurations.
///
/// This limit protects against stack overflow from deeply nested
/// directives. Checked when `PatternConfig::compile` runs, never during
/// matching.
pub const MAX_PATTERN_DEPTH: usize = 64;

/// Maximum length for regex patterns.
///
/// Regex compilation is expensive even with the linear-time Rust `regex`
/// crate, so configuration-supplied patterns are bounded.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from pattern configuration loading and compilation.
///
/// These errors are caught when a declarative pattern is compiled, not
/// during matching. Fix the configuration and recompile. Match failures
/// are not errors at all; they are data, carried by [`MatchResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// A regex pattern is invalid.
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying error message.
        source: String,
    },
    /// Configuration deserialization or construction failed.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
    /// A `$`-prefixed key did not name a known directive.
    UnknownDirective {
        /// The unrecognized directive, `$` included.
        directive: String,
        /// Directives that ARE known (for self-correcting error messages).
        available: Vec<String>,
    },
    /// Pattern nesting exceeds [`MAX_PATTERN_DEPTH`].
    DepthExceeded {
        /// Actual depth of the pattern tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// A regex pattern exceeds the maximum allowed length.
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern \"{pattern}\": {source}")
            }
            Self::InvalidConfig { source } => {
                write!(f, "invalid config: {source}")
            }
            Self::UnknownDirective {
                directive,
                available,
            } => {
                write!(
                    f,
                    "unknown directive \"{directive}\" — known directives: {}",
                    available.join(", ")
                )
            }
            Self::DepthExceeded { depth, max } => {
                write!(
                    f,
                    "pattern nesting depth is {depth}, but maximum allowed is {max} \
                     — reduce nesting or flatten your pattern"
                )
            }
            Self::PatternTooLong { len, max } => {
                write!(f, "pattern length is {len}, but maximum allowed is {max}")
            }
        }
    }
}

impl std::error::Error for PatternError {}
