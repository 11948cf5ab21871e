//! Matcher variants and the matching algorithms behind them.
//!
//! Every matcher is a variant of the closed [`Matcher`] enum, dispatched
//! with a single `match` in [`Matcher::test`]. The [`Match`] type is the
//! factory namespace callers use to build matcher nodes; it validates
//! pattern shape eagerly, so a malformed pattern fails at construction
//! (a panic, programmer error) instead of surfacing as a confusing match
//! failure later.
//!
//! Data-shape problems in the *target* are never panics: a matcher handed
//! the wrong kind of value records a failure and moves on, so one `test`
//! pass surfaces every mismatch at once.

use crate::value::{kind, value_eq};
use crate::{Capture, MatchResult, Pattern};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════════
// Matcher variants
// ═══════════════════════════════════════════════════════════════════════════

/// A matcher node inside a [`Pattern`].
///
/// The set is closed: matching is one exhaustive `match`, and every
/// variant's failure messages carry the variant's name (see
/// [`Matcher::name`]) so diagnostics always say which matcher objected.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Deep structural equality with the wrapped pattern. Embedded
    /// matchers still apply; everything literal must be equal, symmetric
    /// in both directions.
    Exact(Box<Pattern>),
    /// Object match that ignores keys not named in the pattern.
    ObjectLike(BTreeMap<String, Pattern>),
    /// Object match that additionally rejects keys not named in the
    /// pattern.
    ObjectEquals(BTreeMap<String, Pattern>),
    /// Ordered, non-contiguous subsequence match: every pattern element
    /// must match some target element, at strictly increasing indices.
    ArrayWith(Vec<Pattern>),
    /// Array match requiring equal length and index-wise matches.
    ArrayEquals(Vec<Pattern>),
    /// Matches only where a value is missing (or standalone `null`).
    Absent,
    /// Matches any present (non-null) value.
    AnyValue,
    /// Inverts the wrapped pattern's outcome.
    Not(Box<Pattern>),
    /// Matches strings against a regular expression (unanchored).
    StringLikeRegexp(Regex),
    /// Parses a JSON-encoded string, then matches the wrapped pattern
    /// against the parsed document.
    SerializedJson(Box<Pattern>),
    /// Delegates to the capture's inner pattern (or [`Matcher::AnyValue`])
    /// and records the value on success.
    Capture(Capture),
}

impl Matcher {
    /// The name recorded on failures produced by this matcher.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact(_) => "exact",
            Self::ObjectLike(_) => "object_like",
            Self::ObjectEquals(_) => "object_equals",
            Self::ArrayWith(_) => "array_with",
            Self::ArrayEquals(_) => "array_equals",
            Self::Absent => "absent",
            Self::AnyValue => "any_value",
            Self::Not(_) => "not",
            Self::StringLikeRegexp(_) => "string_like_regexp",
            Self::SerializedJson(_) => "serialized_json",
            Self::Capture(_) => "capture",
        }
    }

    /// Test `actual` against this matcher.
    ///
    /// Never panics on target data: wrong-kind values, unparseable JSON
    /// strings and the like are recorded failures.
    #[must_use]
    pub fn test(&self, actual: &Value) -> MatchResult {
        match self {
            Self::Exact(pattern) => pattern.test(actual),
            Self::ObjectLike(entries) => test_object(self.name(), entries, actual, true),
            Self::ObjectEquals(entries) => test_object(self.name(), entries, actual, false),
            Self::ArrayWith(elements) => test_array_with(self.name(), elements, actual),
            Self::ArrayEquals(elements) => test_array_equals(self.name(), elements, actual),
            Self::Absent => {
                let mut result = MatchResult::new(actual);
                // Standalone use: a missing value is represented as null.
                if !actual.is_null() {
                    result.record_failure(
                        self.name(),
                        vec![],
                        format!("expected value to be absent, but received {actual}"),
                    );
                }
                result
            }
            Self::AnyValue => {
                let mut result = MatchResult::new(actual);
                if actual.is_null() {
                    result.record_failure(
                        self.name(),
                        vec![],
                        "expected any value but received null",
                    );
                }
                result
            }
            Self::Not(pattern) => {
                let inner = pattern.test(actual);
                let mut result = MatchResult::new(actual);
                if !inner.has_failed() {
                    result.record_failure(
                        self.name(),
                        vec![],
                        "value should not match pattern, but it did",
                    );
                }
                result
            }
            Self::StringLikeRegexp(regex) => {
                let mut result = MatchResult::new(actual);
                match actual {
                    Value::String(s) => {
                        if !regex.is_match(s) {
                            result.record_failure(
                                self.name(),
                                vec![],
                                format!(
                                    "expected a string matching /{}/ but received {s:?}",
                                    regex.as_str()
                                ),
                            );
                        }
                    }
                    other => result.record_failure(
                        self.name(),
                        vec![],
                        format!("expected type string but received {}", kind(other)),
                    ),
                }
                result
            }
            Self::SerializedJson(pattern) => {
                let mut result = MatchResult::new(actual);
                match actual {
                    Value::String(s) => match serde_json::from_str::<Value>(s) {
                        Ok(parsed) => {
                            let inner = pattern.test(&parsed);
                            result.compose("<json>", inner);
                        }
                        Err(err) => result.record_failure(
                            self.name(),
                            vec![],
                            format!("invalid JSON string: {err}"),
                        ),
                    },
                    other => result.record_failure(
                        self.name(),
                        vec![],
                        format!("expected type string but received {}", kind(other)),
                    ),
                }
                result
            }
            Self::Capture(capture) => {
                let mut result = match capture.delegate() {
                    Some(pattern) => pattern.test(actual),
                    None => Matcher::AnyValue.test(actual),
                };
                if !result.has_failed() {
                    result.record_capture(capture, actual);
                }
                result
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Matching algorithms
// ═══════════════════════════════════════════════════════════════════════════

/// Deep equality against a literal value, with distinct messages for
/// same-kind and cross-kind mismatches.
pub(crate) fn test_literal(name: &'static str, expected: &Value, actual: &Value) -> MatchResult {
    match expected {
        Value::Object(map) => {
            let entries: BTreeMap<String, Pattern> = map
                .iter()
                .map(|(k, v)| (k.clone(), Pattern::Literal(v.clone())))
                .collect();
            test_object(name, &entries, actual, false)
        }
        Value::Array(items) => {
            let elements: Vec<Pattern> = items.iter().cloned().map(Pattern::Literal).collect();
            test_array_equals(name, &elements, actual)
        }
        _ => {
            let mut result = MatchResult::new(actual);
            if !value_eq(expected, actual) {
                let expected_kind = kind(expected);
                let actual_kind = kind(actual);
                if expected_kind == actual_kind {
                    result.record_failure(
                        name,
                        vec![],
                        format!("expected {expected} but received {actual}"),
                    );
                } else {
                    result.record_failure(
                        name,
                        vec![],
                        format!("expected type {expected_kind} but received {actual_kind}"),
                    );
                }
            }
            result
        }
    }
}

/// Object matching. `partial` ignores target keys the pattern does not
/// name; otherwise they are `unexpected field` failures. `Absent` gets its
/// container meaning here: it passes on a missing key and fails on a
/// present one, null included.
pub(crate) fn test_object(
    name: &'static str,
    entries: &BTreeMap<String, Pattern>,
    actual: &Value,
    partial: bool,
) -> MatchResult {
    let mut result = MatchResult::new(actual);
    let Value::Object(map) = actual else {
        result.record_failure(
            name,
            vec![],
            format!("expected type object but received {}", kind(actual)),
        );
        return result;
    };
    for (key, pattern) in entries {
        let wants_absent = matches!(pattern, Pattern::Matcher(Matcher::Absent));
        match map.get(key) {
            None => {
                if !wants_absent {
                    result.record_failure(name, vec![], format!("missing field {key:?}"));
                }
            }
            Some(child) => {
                if wants_absent {
                    result.record_failure(
                        name,
                        vec![],
                        format!("field {key:?} is present, but should be absent"),
                    );
                } else {
                    let child_result = pattern.test(child);
                    result.compose(&format!("/{key}"), child_result);
                }
            }
        }
    }
    if !partial {
        for key in map.keys() {
            if !entries.contains_key(key) {
                result.record_failure(name, vec![], format!("unexpected field {key:?}"));
            }
        }
    }
    result
}

/// Index-wise array matching: lengths must agree, then element `i` of the
/// pattern is tested against element `i` of the target.
pub(crate) fn test_array_equals(
    name: &'static str,
    elements: &[Pattern],
    actual: &Value,
) -> MatchResult {
    let mut result = MatchResult::new(actual);
    let Value::Array(items) = actual else {
        result.record_failure(
            name,
            vec![],
            format!("expected type array but received {}", kind(actual)),
        );
        return result;
    };
    if elements.len() != items.len() {
        result.record_failure(
            name,
            vec![],
            format!(
                "expected array of length {} but received length {}",
                elements.len(),
                items.len()
            ),
        );
        return result;
    }
    for (index, (pattern, item)) in elements.iter().zip(items).enumerate() {
        let child_result = pattern.test(item);
        result.compose(&format!("[{index}]"), child_result);
    }
    result
}

/// Subsequence array matching: a greedy left-to-right cursor scan. Each
/// pattern element consumes the first target element at or after the
/// cursor that it matches; probe results of non-matching candidates are
/// dropped, so their captures never leak. Order violations therefore fail
/// even when every element is present somewhere in the target.
pub(crate) fn test_array_with(
    name: &'static str,
    elements: &[Pattern],
    actual: &Value,
) -> MatchResult {
    let mut result = MatchResult::new(actual);
    let Value::Array(items) = actual else {
        result.record_failure(
            name,
            vec![],
            format!("expected type array but received {}", kind(actual)),
        );
        return result;
    };
    let mut search_from = 0usize;
    for (pattern_index, pattern) in elements.iter().enumerate() {
        let mut matched = None;
        for (candidate_index, item) in items.iter().enumerate().skip(search_from) {
            let probe = pattern.test(item);
            if !probe.has_failed() {
                matched = Some((candidate_index, probe));
                break;
            }
        }
        match matched {
            Some((candidate_index, probe)) => {
                result.compose(&format!("[{candidate_index}]"), probe);
                search_from = candidate_index + 1;
            }
            None => {
                result.record_failure(
                    name,
                    vec![],
                    format!(
                        "pattern element {pattern_index} not found in array, starting from index {search_from}"
                    ),
                );
            }
        }
    }
    result
}

// ═══════════════════════════════════════════════════════════════════════════
// Factory namespace
// ═══════════════════════════════════════════════════════════════════════════

/// Factory namespace for matcher nodes. Never instantiated; every
/// constructor is an associated function returning a [`Pattern`].
///
/// Shape requirements are enforced here: handing `object_like` an array,
/// or `array_with` a scalar, is a bug in the caller's pattern and panics
/// immediately rather than producing a pattern that can never match.
///
/// ```
/// use sift::{pattern, Match};
/// use serde_json::json;
///
/// let p = Match::array_with(pattern!(["Flob"]));
/// assert!(!p.test(&json!(["Wib", "Flob", "Wub"])).has_failed());
/// ```
pub enum Match {}

impl Match {
    /// Deep structural equality with `pattern`.
    pub fn exact(pattern: impl Into<Pattern>) -> Pattern {
        Pattern::Matcher(Matcher::Exact(Box::new(pattern.into())))
    }

    /// Object match ignoring target keys the pattern does not name.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not object-shaped.
    #[track_caller]
    pub fn object_like(pattern: impl Into<Pattern>) -> Pattern {
        let pattern = pattern.into();
        let shape = pattern.shape();
        match pattern.into_object_entries() {
            Some(entries) => Pattern::Matcher(Matcher::ObjectLike(entries)),
            None => panic!("Match::object_like requires an object pattern, got {shape}"),
        }
    }

    /// Object match rejecting target keys the pattern does not name.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not object-shaped.
    #[track_caller]
    pub fn object_equals(pattern: impl Into<Pattern>) -> Pattern {
        let pattern = pattern.into();
        let shape = pattern.shape();
        match pattern.into_object_entries() {
            Some(entries) => Pattern::Matcher(Matcher::ObjectEquals(entries)),
            None => panic!("Match::object_equals requires an object pattern, got {shape}"),
        }
    }

    /// Ordered, non-contiguous subsequence match over an array.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not array-shaped.
    #[track_caller]
    pub fn array_with(pattern: impl Into<Pattern>) -> Pattern {
        let pattern = pattern.into();
        let shape = pattern.shape();
        match pattern.into_array_elements() {
            Some(elements) => Pattern::Matcher(Matcher::ArrayWith(elements)),
            None => panic!("Match::array_with requires an array pattern, got {shape}"),
        }
    }

    /// Array match requiring equal length and index-wise matches.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not array-shaped.
    #[track_caller]
    pub fn array_equals(pattern: impl Into<Pattern>) -> Pattern {
        let pattern = pattern.into();
        let shape = pattern.shape();
        match pattern.into_array_elements() {
            Some(elements) => Pattern::Matcher(Matcher::ArrayEquals(elements)),
            None => panic!("Match::array_equals requires an array pattern, got {shape}"),
        }
    }

    /// Matches only where a value is missing.
    #[must_use]
    pub fn absent() -> Pattern {
        Pattern::Matcher(Matcher::Absent)
    }

    /// Matches any present value.
    #[must_use]
    pub fn any_value() -> Pattern {
        Pattern::Matcher(Matcher::AnyValue)
    }

    /// Inverts the outcome of `pattern`.
    pub fn not(pattern: impl Into<Pattern>) -> Pattern {
        Pattern::Matcher(Matcher::Not(Box::new(pattern.into())))
    }

    /// Matches strings against `pattern` (unanchored regular expression).
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    #[track_caller]
    pub fn string_like_regexp(pattern: &str) -> Pattern {
        match Regex::new(pattern) {
            Ok(regex) => Pattern::Matcher(Matcher::StringLikeRegexp(regex)),
            Err(err) => panic!("Match::string_like_regexp received an invalid pattern: {err}"),
        }
    }

    /// Parses a JSON-encoded string in the target, then matches `pattern`
    /// against the parsed document.
    pub fn serialized_json(pattern: impl Into<Pattern>) -> Pattern {
        Pattern::Matcher(Matcher::SerializedJson(Box::new(pattern.into())))
    }
}
