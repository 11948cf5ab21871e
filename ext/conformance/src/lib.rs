//! sift-conformance: shared test support for the sift engine
//!
//! Two layers:
//!
//! - bare assertion helpers ([`assert_matches`] / [`assert_not_matches`])
//!   for tests that build patterns in Rust, and
//! - a YAML fixture runner (`fixture` module, feature = "fixtures") that
//!   drives the config grammar from data files.
//!
//! # Example
//!
//! ```
//! use sift::{pattern, Match};
//! use sift_conformance::{assert_matches, assert_not_matches};
//! use serde_json::json;
//!
//! let queue = pattern!({ "QueueName": Match::any_value() });
//! assert_matches(&queue, &json!({ "QueueName": "jobs" }));
//! assert_not_matches(&queue, &json!({ "Visibility": 120 }));
//! ```

use sift::{Pattern, Value};

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Assert that `pattern` matches `target`.
///
/// Flushes captures on success, the same way the template assertions do.
///
/// # Panics
///
/// Panics with the rendered failure list when the pattern does not match.
#[track_caller]
pub fn assert_matches(pattern: &Pattern, target: &Value) {
    let mut result = pattern.test(target);
    if result.has_failed() {
        panic!(
            "pattern did not match:\n  {}",
            result.to_human_strings().join("\n  ")
        );
    }
    result.finished();
}

/// Assert that `pattern` does not match `target`.
///
/// # Panics
///
/// Panics when the pattern matches.
#[track_caller]
pub fn assert_not_matches(pattern: &Pattern, target: &Value) {
    let result = pattern.test(target);
    assert!(
        result.has_failed(),
        "pattern unexpectedly matched {target}"
    );
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{assert_matches, assert_not_matches};
    #[cfg(feature = "fixtures")]
    pub use super::fixture::{CaseResult, Expect, Fixture, TestCase};
    pub use sift::prelude::*;
}
