//! Value capture — extracting matched sub-values from a target.
//!
//! A [`Capture`] is both a matcher (embed it at any pattern position) and a
//! handle the caller keeps: every time the pattern as a whole matches a
//! target, the value at the capture's position is appended to its store.
//! The handle then pages through the stored entries with [`Capture::next`]
//! and reads them with the typed accessors.
//!
//! Captures are deliberately reusable across matching attempts: scanning
//! ten resources with one shared capture accumulates up to ten entries, in
//! scan order. The store sits behind a mutex so a handle may also be shared
//! across threads scanning in parallel.

use crate::{value::kind, Pattern};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct CaptureState {
    captured: Vec<Value>,
    cursor: Option<usize>,
}

/// A matcher that records every value it matches, for later retrieval.
///
/// Cloning a `Capture` clones the *handle*: all clones share one store, so
/// the instance embedded in a pattern and the instance the test holds onto
/// observe the same captured values.
///
/// # Example
///
/// ```
/// use sift::{pattern, Capture};
/// use serde_json::json;
///
/// let fred = Capture::new();
/// let pattern = pattern!({ "Fred": (&fred) });
///
/// pattern.test(&json!({ "Fred": "Flob" })).finished();
/// pattern.test(&json!({ "Fred": "Quib" })).finished();
///
/// assert_eq!(fred.as_string(), "Flob");
/// assert!(fred.next());
/// assert_eq!(fred.as_string(), "Quib");
/// assert!(!fred.next());
/// ```
#[derive(Clone, Default)]
pub struct Capture {
    state: Arc<Mutex<CaptureState>>,
    pattern: Option<Arc<Pattern>>,
}

impl Capture {
    /// A capture that matches any non-null value (like `Match::any_value`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A capture that only records values matching `pattern`.
    #[must_use]
    pub fn with_pattern(pattern: impl Into<Pattern>) -> Self {
        Self {
            state: Arc::new(Mutex::new(CaptureState::default())),
            pattern: Some(Arc::new(pattern.into())),
        }
    }

    /// The delegate pattern, if one was supplied.
    pub(crate) fn delegate(&self) -> Option<&Pattern> {
        self.pattern.as_deref()
    }

    /// Append a flushed value to the store. Cursor is left untouched;
    /// [`init_cursor`](Self::init_cursor) runs after a flush completes.
    pub(crate) fn append(&self, value: Value) {
        self.state().captured.push(value);
    }

    /// Point the cursor at the first entry if it has never been set.
    pub(crate) fn init_cursor(&self) {
        let mut state = self.state();
        if state.cursor.is_none() && !state.captured.is_empty() {
            state.cursor = Some(0);
        }
    }

    /// Number of values captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().captured.len()
    }

    /// Whether nothing has been captured yet. The cursor accessors panic
    /// on an empty capture; check this first when a capture may not have
    /// fired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().captured.is_empty()
    }

    /// Advance the cursor to the next captured entry.
    ///
    /// Returns `true` if the cursor moved, `false` if it was already on the
    /// last entry (the cursor stays put).
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured yet — paging through an empty
    /// capture is a test bug, not a match outcome.
    pub fn next(&self) -> bool {
        let mut state = self.state();
        let Some(cursor) = state.cursor else {
            panic!("next() called before anything was captured");
        };
        if cursor + 1 < state.captured.len() {
            state.cursor = Some(cursor + 1);
            true
        } else {
            false
        }
    }

    /// The entry under the cursor, untyped.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured.
    #[must_use]
    #[track_caller]
    pub fn value(&self) -> Value {
        self.current()
    }

    /// The entry under the cursor as a string.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured or the entry is not a string.
    #[must_use]
    #[track_caller]
    pub fn as_string(&self) -> String {
        match self.current() {
            Value::String(s) => s,
            other => panic!("captured value is {}, not a string", kind(&other)),
        }
    }

    /// The entry under the cursor as a number.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured or the entry is not a number.
    #[must_use]
    #[track_caller]
    pub fn as_number(&self) -> f64 {
        match self.current() {
            Value::Number(n) => match n.as_f64() {
                Some(f) => f,
                None => panic!("captured number {n} does not fit in f64"),
            },
            other => panic!("captured value is {}, not a number", kind(&other)),
        }
    }

    /// The entry under the cursor as a boolean.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured or the entry is not a boolean.
    #[must_use]
    #[track_caller]
    pub fn as_boolean(&self) -> bool {
        match self.current() {
            Value::Bool(b) => b,
            other => panic!("captured value is {}, not a boolean", kind(&other)),
        }
    }

    /// The entry under the cursor as an array.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured or the entry is not an array.
    #[must_use]
    #[track_caller]
    pub fn as_array(&self) -> Vec<Value> {
        match self.current() {
            Value::Array(items) => items,
            other => panic!("captured value is {}, not an array", kind(&other)),
        }
    }

    /// The entry under the cursor as an object.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been captured or the entry is not an object.
    #[must_use]
    #[track_caller]
    pub fn as_object(&self) -> Map<String, Value> {
        match self.current() {
            Value::Object(map) => map,
            other => panic!("captured value is {}, not an object", kind(&other)),
        }
    }

    #[track_caller]
    fn current(&self) -> Value {
        let state = self.state();
        match state.cursor {
            Some(cursor) => state.captured[cursor].clone(),
            None => panic!("nothing has been captured"),
        }
    }

    fn state(&self) -> MutexGuard<'_, CaptureState> {
        // A poisoned lock only means another thread panicked mid-append;
        // the Vec push / cursor write cannot leave the state torn.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for Capture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Capture")
            .field("captured", &state.captured.len())
            .field("cursor", &state.cursor)
            .field("has_pattern", &self.pattern.is_some())
            .finish()
    }
}
