//! Match results — diagnostics as data.
//!
//! A [`MatchResult`] accumulates everything one matching attempt learned:
//! every mismatch (addressed by structural path) and every value captured
//! by a [`Capture`](crate::Capture) along the way. Mismatches are ordinary
//! data, never errors: a single `test()` walks the whole target and
//! reports *all* failures in one pass.
//!
//! Container matchers build results bottom-up with [`MatchResult::compose`]:
//! each recursion level tests its children in isolation, then folds the
//! child results in under its own path segment. Path segments render as
//! `/key` for mapping keys and `[index]` for sequence indices, so a
//! rendered failure line reads like
//! `/Fred/Wobble[2]: expected "Flob" but received "Cat"`.

use crate::Capture;
use serde_json::Value;

/// One recorded mismatch: which matcher failed, where, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFailure {
    /// Diagnostic name of the matcher that recorded the failure.
    pub matcher: &'static str,
    /// Path from the tested root to the mismatch, as rendered segments.
    pub path: Vec<String>,
    /// Human-readable reason.
    pub message: String,
}

impl MatchFailure {
    /// Render as a single human-readable line (`"<path>: <message>"`, or
    /// just the message for a failure at the root).
    #[must_use]
    pub fn render(&self) -> String {
        if self.path.is_empty() {
            self.message.clone()
        } else {
            format!("{}: {}", self.path.concat(), self.message)
        }
    }
}

/// A capture record: a value that matched a capture's delegate pattern,
/// pending flush into the capture's store (see [`MatchResult::finished`]).
#[derive(Debug, Clone)]
struct CaptureRecord {
    capture: Capture,
    value: Value,
}

/// Accumulator for the outcome of one matching attempt.
///
/// Created fresh per `test()` invocation; write-once (failures and capture
/// records only ever accumulate) until handed back to the caller.
#[derive(Debug)]
pub struct MatchResult {
    target: Value,
    failures: Vec<MatchFailure>,
    captures: Vec<CaptureRecord>,
    finalized: bool,
}

impl MatchResult {
    /// Start a result for a matching attempt against `target`.
    #[must_use]
    pub fn new(target: &Value) -> Self {
        Self {
            target: target.clone(),
            failures: Vec::new(),
            captures: Vec::new(),
            finalized: false,
        }
    }

    /// The value this result was produced against.
    #[must_use]
    pub fn target(&self) -> &Value {
        &self.target
    }

    /// Record a mismatch. Never fails; mismatches are data.
    pub fn record_failure(
        &mut self,
        matcher: &'static str,
        path: Vec<String>,
        message: impl Into<String>,
    ) {
        self.failures.push(MatchFailure {
            matcher,
            path,
            message: message.into(),
        });
    }

    /// Record that `capture` matched `value` during this attempt.
    ///
    /// The value is not written into the capture's store yet: records are
    /// carried by the result (and moved upward by [`compose`]) until
    /// [`finished`] decides whether the attempt as a whole succeeded.
    /// Speculative probes (an `ArrayWith` scan, the inner run of a `Not`)
    /// simply drop their results, and their captures with them.
    ///
    /// [`compose`]: MatchResult::compose
    /// [`finished`]: MatchResult::finished
    pub fn record_capture(&mut self, capture: &Capture, value: &Value) {
        self.captures.push(CaptureRecord {
            capture: capture.clone(),
            value: value.clone(),
        });
    }

    /// Fold a child result into this one under `segment`.
    ///
    /// Every child failure is re-recorded with `segment` prefixed to its
    /// path; every child capture record is moved into this result.
    pub fn compose(&mut self, segment: &str, child: MatchResult) -> &mut Self {
        for failure in child.failures {
            let mut path = Vec::with_capacity(failure.path.len() + 1);
            path.push(segment.to_string());
            path.extend(failure.path);
            self.failures.push(MatchFailure { path, ..failure });
        }
        self.captures.extend(child.captures);
        self
    }

    /// Finalize the attempt. Idempotent.
    ///
    /// If the attempt recorded no failures, all pending capture records are
    /// flushed into their captures' stores (in encounter order) and each
    /// touched capture's cursor is initialized to its first entry. A failed
    /// attempt flushes nothing: a capture only accumulates once per
    /// *matching* target.
    pub fn finished(&mut self) -> &mut Self {
        if self.finalized {
            return self;
        }
        if self.failures.is_empty() {
            for record in &self.captures {
                record.capture.append(record.value.clone());
            }
            for record in &self.captures {
                record.capture.init_cursor();
            }
        }
        self.finalized = true;
        self
    }

    /// Whether any mismatch was recorded.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of recorded mismatches.
    #[must_use]
    pub fn fail_count(&self) -> usize {
        self.failures.len()
    }

    /// The recorded mismatches, in discovery order.
    #[must_use]
    pub fn failures(&self) -> &[MatchFailure] {
        &self.failures
    }

    /// Render every failure as one line: `"<path>: <message>"`.
    #[must_use]
    pub fn to_human_strings(&self) -> Vec<String> {
        self.failures.iter().map(MatchFailure::render).collect()
    }
}
