//! Patterns — value trees with matchers embedded at any position.
//!
//! A [`Pattern`] is shaped like a JSON value, except any node may instead
//! be a [`Matcher`]. The split is decided at construction time (a sum
//! type), so the engine never needs to shape-sniff "is this thing a
//! matcher?" at match time: [`Pattern::test`] applies the dispatcher rule
//! — a `Matcher` node delegates, everything else requires deep equality —
//! and container matchers apply the same rule one level down.
//!
//! Patterns are cheapest to build with the [`pattern!`](macro@crate::pattern)
//! macro, which reads like JSON and accepts anything `Into<Pattern>`
//! (matchers, captures, primitives) in value position:
//!
//! ```
//! use sift::{pattern, Match};
//! use serde_json::json;
//!
//! let pattern = pattern!({
//!     "Fred": Match::object_like(pattern!({ "Wobble": "Flob" })),
//!     "Bob": Match::absent(),
//! });
//! assert!(!pattern.test(&json!({ "Fred": { "Wobble": "Flob", "Extra": 1 } })).has_failed());
//! ```

use crate::{matchers, Capture, MatchResult, Matcher};
use serde_json::Value;
use std::collections::BTreeMap;

/// A value tree that may embed matchers, used as the expected side of a
/// match.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// A literal value with no matchers anywhere below; compared by deep
    /// equality.
    Literal(Value),
    /// A mapping node whose children may embed matchers.
    Object(BTreeMap<String, Pattern>),
    /// A sequence node whose children may embed matchers.
    Array(Vec<Pattern>),
    /// An explicit matcher at this position.
    Matcher(Matcher),
}

impl Pattern {
    /// Whether this node is an explicit matcher (the dispatcher rule's
    /// capability probe).
    #[must_use]
    pub fn is_matcher(&self) -> bool {
        matches!(self, Self::Matcher(_))
    }

    /// Test `actual` against this pattern.
    ///
    /// This is the dispatcher rule at the root: a `Matcher` node delegates
    /// to the matcher, any other node gets `exact` (deep equality)
    /// semantics — symmetric keys for mappings, equal lengths and
    /// index-wise matching for sequences — with embedded matchers honored
    /// at any depth.
    #[must_use]
    pub fn test(&self, actual: &Value) -> MatchResult {
        match self {
            Self::Matcher(matcher) => matcher.test(actual),
            Self::Literal(expected) => matchers::test_literal("exact", expected, actual),
            Self::Object(entries) => matchers::test_object("exact", entries, actual, false),
            Self::Array(elements) => matchers::test_array_equals("exact", elements, actual),
        }
    }

    /// The shape of this node, for factory misuse messages.
    pub(crate) fn shape(&self) -> &'static str {
        match self {
            Self::Literal(value) => crate::value::kind(value),
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Matcher(_) => "matcher",
        }
    }

    /// View this pattern as mapping entries, if it is object-shaped.
    pub(crate) fn into_object_entries(self) -> Option<BTreeMap<String, Pattern>> {
        match self {
            Self::Object(entries) => Some(entries),
            Self::Literal(Value::Object(map)) => Some(
                map.into_iter()
                    .map(|(k, v)| (k, Pattern::Literal(v)))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// View this pattern as sequence elements, if it is array-shaped.
    pub(crate) fn into_array_elements(self) -> Option<Vec<Pattern>> {
        match self {
            Self::Array(elements) => Some(elements),
            Self::Literal(Value::Array(items)) => {
                Some(items.into_iter().map(Pattern::Literal).collect())
            }
            _ => None,
        }
    }
}

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<Matcher> for Pattern {
    fn from(matcher: Matcher) -> Self {
        Self::Matcher(matcher)
    }
}

impl From<Capture> for Pattern {
    fn from(capture: Capture) -> Self {
        Self::Matcher(Matcher::Capture(capture))
    }
}

impl From<&Capture> for Pattern {
    fn from(capture: &Capture) -> Self {
        Self::Matcher(Matcher::Capture(capture.clone()))
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::Literal(Value::String(value.to_string()))
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Self::Literal(Value::String(value))
    }
}

impl From<bool> for Pattern {
    fn from(value: bool) -> Self {
        Self::Literal(Value::Bool(value))
    }
}

impl From<i32> for Pattern {
    fn from(value: i32) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<i64> for Pattern {
    fn from(value: i64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<u64> for Pattern {
    fn from(value: u64) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<f64> for Pattern {
    fn from(value: f64) -> Self {
        // Non-finite floats have no JSON representation; Value::from maps
        // them to null, same as serde_json's own macro.
        Self::Literal(Value::from(value))
    }
}

impl From<Vec<Pattern>> for Pattern {
    fn from(elements: Vec<Pattern>) -> Self {
        Self::Array(elements)
    }
}

impl From<BTreeMap<String, Pattern>> for Pattern {
    fn from(entries: BTreeMap<String, Pattern>) -> Self {
        Self::Object(entries)
    }
}

/// Build a [`Pattern`] from JSON-shaped syntax.
///
/// Supports everything `serde_json::json!` supports for literals, and
/// additionally accepts any expression convertible `Into<Pattern>` — a
/// `Match::*` factory call, a [`Capture`](crate::Capture) handle — in any
/// value position. Object keys must be string literals.
///
/// ```
/// use sift::{pattern, Match};
///
/// let p = pattern!({
///     "Name": Match::string_like_regexp("^prod-"),
///     "Tags": ["a", "b"],
///     "Legacy": Match::absent(),
/// });
/// assert!(!p.is_matcher());
/// ```
#[macro_export]
macro_rules! pattern {
    (null) => {
        $crate::Pattern::Literal($crate::Value::Null)
    };
    ([ $($tt:tt)* ]) => {
        $crate::Pattern::Array($crate::__pattern_internal!(@array [] $($tt)*))
    };
    ({ $($tt:tt)* }) => {{
        #[allow(unused_mut)]
        let mut entries =
            ::std::collections::BTreeMap::<::std::string::String, $crate::Pattern>::new();
        $crate::__pattern_internal!(@object entries $($tt)*);
        $crate::Pattern::Object(entries)
    }};
    ($other:expr) => {
        $crate::Pattern::from($other)
    };
}

// TT muncher behind `pattern!`, shaped after serde_json's json_internal:
// structural forms (null / arrays / objects) are consumed as token trees
// before the expression arms so that non-Rust-expression syntax never
// reaches an `expr` fragment.
#[doc(hidden)]
#[macro_export]
macro_rules! __pattern_internal {
    // ──── array elements ────
    (@array [$($elems:expr,)*]) => {
        ::std::vec![$($elems,)*]
    };
    (@array [$($elems:expr),*]) => {
        ::std::vec![$($elems),*]
    };
    (@array [$($elems:expr,)*] null $($rest:tt)*) => {
        $crate::__pattern_internal!(@array [$($elems,)* $crate::pattern!(null)] $($rest)*)
    };
    (@array [$($elems:expr,)*] [$($array:tt)*] $($rest:tt)*) => {
        $crate::__pattern_internal!(@array [$($elems,)* $crate::pattern!([$($array)*])] $($rest)*)
    };
    (@array [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::__pattern_internal!(@array [$($elems,)* $crate::pattern!({$($map)*})] $($rest)*)
    };
    (@array [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::__pattern_internal!(@array [$($elems,)* $crate::pattern!($next),] $($rest)*)
    };
    (@array [$($elems:expr,)*] $last:expr) => {
        ::std::vec![$($elems,)* $crate::pattern!($last)]
    };
    (@array [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::__pattern_internal!(@array [$($elems,)*] $($rest)*)
    };

    // ──── object entries (keys are string literals) ────
    (@object $map:ident) => {};
    (@object $map:ident $key:literal : null , $($rest:tt)*) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!(null));
        $crate::__pattern_internal!(@object $map $($rest)*);
    };
    (@object $map:ident $key:literal : null) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!(null));
    };
    (@object $map:ident $key:literal : [$($array:tt)*] , $($rest:tt)*) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!([$($array)*]));
        $crate::__pattern_internal!(@object $map $($rest)*);
    };
    (@object $map:ident $key:literal : [$($array:tt)*]) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!([$($array)*]));
    };
    (@object $map:ident $key:literal : {$($inner:tt)*} , $($rest:tt)*) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!({$($inner)*}));
        $crate::__pattern_internal!(@object $map $($rest)*);
    };
    (@object $map:ident $key:literal : {$($inner:tt)*}) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!({$($inner)*}));
    };
    (@object $map:ident $key:literal : $value:expr , $($rest:tt)*) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!($value));
        $crate::__pattern_internal!(@object $map $($rest)*);
    };
    (@object $map:ident $key:literal : $value:expr) => {
        $map.insert(::std::string::String::from($key), $crate::pattern!($value));
    };
}
