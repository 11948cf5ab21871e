//! Declarative pattern configuration.
//!
//! Patterns can be written as plain JSON or YAML documents and compiled
//! into runtime [`Pattern`]s. The grammar is the data itself: any object
//! with exactly one `$`-prefixed key is a directive naming a matcher,
//! everything else is literal structure.
//!
//! | Directive | Compiles to | Payload |
//! |-----------|-------------|---------|
//! | `$exact` | [`Matcher::Exact`] | any pattern node |
//! | `$object_like` | [`Matcher::ObjectLike`] | object |
//! | `$object_equals` | [`Matcher::ObjectEquals`] | object |
//! | `$array_with` | [`Matcher::ArrayWith`] | array |
//! | `$array_equals` | [`Matcher::ArrayEquals`] | array |
//! | `$absent` | [`Matcher::Absent`] | `null` |
//! | `$any_value` | [`Matcher::AnyValue`] | `null` |
//! | `$not` | [`Matcher::Not`] | any pattern node |
//! | `$string_like_regexp` | [`Matcher::StringLikeRegexp`] | string |
//! | `$serialized_json` | [`Matcher::SerializedJson`] | any pattern node |
//! | `$capture` | [`Matcher::Capture`] | name, or `{"name", "pattern"}` |
//! | `$literal` | [`Pattern::Literal`] | any value, taken verbatim |
//!
//! A document key that legitimately starts with `$` must be wrapped in
//! `$literal`; objects mixing directive and literal keys do not compile.
//! Reusing a `$capture` name shares one capture handle across all its
//! positions; declare the optional pattern on the first occurrence only.
//!
//! Unlike the [`Match`](crate::Match) factories, shape problems here are
//! [`PatternError`]s rather than panics: configuration is data, not code.
//!
//! # Example
//!
//! ```
//! use sift::PatternConfig;
//! use serde_json::json;
//!
//! let config = PatternConfig::new(json!({
//!     "$object_like": {
//!         "Name": { "$string_like_regexp": "^prod-" },
//!         "Legacy": { "$absent": null },
//!     }
//! }));
//! let compiled = config.compile().unwrap();
//! assert!(!compiled.test(&json!({ "Name": "prod-db", "Size": 42 })).has_failed());
//! ```

use crate::value::kind;
use crate::{
    Capture, Match, MatchResult, Matcher, Pattern, PatternError, MAX_PATTERN_DEPTH,
    MAX_REGEX_PATTERN_LENGTH,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Known directives, sorted.
const DIRECTIVES: [&str; 12] = [
    "$absent",
    "$any_value",
    "$array_equals",
    "$array_with",
    "$capture",
    "$exact",
    "$literal",
    "$not",
    "$object_equals",
    "$object_like",
    "$serialized_json",
    "$string_like_regexp",
];

/// A pattern document as written by the user, not yet compiled.
///
/// Deserializes transparently from any self-describing format: JSON via
/// [`PatternConfig::from_json`], YAML by deserializing into this type with
/// `serde_yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PatternConfig {
    document: Value,
}

impl PatternConfig {
    /// Wrap an already-parsed document.
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    /// Parse a JSON pattern document.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidConfig`] if `text` is not valid JSON.
    pub fn from_json(text: &str) -> Result<Self, PatternError> {
        serde_json::from_str(text)
            .map(Self::new)
            .map_err(|e| PatternError::InvalidConfig {
                source: e.to_string(),
            })
    }

    /// Compile the document into a runtime pattern.
    ///
    /// Each call produces fresh [`Capture`] stores: compiling once and
    /// testing many targets accumulates captures, compiling per target
    /// starts clean.
    ///
    /// # Errors
    ///
    /// - [`PatternError::UnknownDirective`] — a `$` key that names no directive
    /// - [`PatternError::InvalidConfig`] — wrong payload shape, mixed
    ///   directive/literal keys, capture redeclaration
    /// - [`PatternError::InvalidPattern`] — a regex that does not compile
    /// - [`PatternError::PatternTooLong`] — a regex beyond [`MAX_REGEX_PATTERN_LENGTH`]
    /// - [`PatternError::DepthExceeded`] — nesting beyond [`MAX_PATTERN_DEPTH`]
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        let mut compiler = Compiler::default();
        let pattern = compiler.compile_node(&self.document, 1)?;
        Ok(CompiledPattern {
            pattern,
            captures: compiler.captures,
        })
    }
}

/// A compiled pattern together with its named capture handles.
#[derive(Debug)]
pub struct CompiledPattern {
    pattern: Pattern,
    captures: BTreeMap<String, Capture>,
}

impl CompiledPattern {
    /// The runtime pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Test `actual` against the compiled pattern.
    #[must_use]
    pub fn test(&self, actual: &Value) -> MatchResult {
        self.pattern.test(actual)
    }

    /// The capture handle declared under `name`, if any.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.get(name)
    }

    /// All named captures, sorted by name.
    pub fn captures(&self) -> impl Iterator<Item = (&str, &Capture)> {
        self.captures.iter().map(|(name, c)| (name.as_str(), c))
    }
}

#[derive(Default)]
struct Compiler {
    captures: BTreeMap<String, Capture>,
}

impl Compiler {
    fn compile_node(&mut self, node: &Value, depth: usize) -> Result<Pattern, PatternError> {
        if depth > MAX_PATTERN_DEPTH {
            return Err(PatternError::DepthExceeded {
                depth,
                max: MAX_PATTERN_DEPTH,
            });
        }
        match node {
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some((key, payload)) = map.iter().next() {
                        if key.starts_with('$') {
                            return self.compile_directive(key, payload, depth);
                        }
                    }
                }
                let directive_keys: Vec<&str> = map
                    .keys()
                    .filter(|k| k.starts_with('$'))
                    .map(String::as_str)
                    .collect();
                if !directive_keys.is_empty() {
                    return Err(PatternError::InvalidConfig {
                        source: format!(
                            "object mixes directive and literal keys ({}); wrap literal \"$\" keys in $literal",
                            directive_keys.join(", ")
                        ),
                    });
                }
                let mut entries = BTreeMap::new();
                for (key, child) in map {
                    entries.insert(key.clone(), self.compile_node(child, depth + 1)?);
                }
                Ok(Pattern::Object(entries))
            }
            Value::Array(items) => {
                let elements = items
                    .iter()
                    .map(|item| self.compile_node(item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Pattern::Array(elements))
            }
            other => Ok(Pattern::Literal(other.clone())),
        }
    }

    fn compile_directive(
        &mut self,
        directive: &str,
        payload: &Value,
        depth: usize,
    ) -> Result<Pattern, PatternError> {
        match directive {
            "$exact" => Ok(Match::exact(self.compile_node(payload, depth + 1)?)),
            "$object_like" => {
                let inner = self.compile_node(payload, depth + 1)?;
                match inner.into_object_entries() {
                    Some(entries) => Ok(Pattern::Matcher(Matcher::ObjectLike(entries))),
                    None => Err(invalid_payload(directive, "an object", payload)),
                }
            }
            "$object_equals" => {
                let inner = self.compile_node(payload, depth + 1)?;
                match inner.into_object_entries() {
                    Some(entries) => Ok(Pattern::Matcher(Matcher::ObjectEquals(entries))),
                    None => Err(invalid_payload(directive, "an object", payload)),
                }
            }
            "$array_with" => {
                let inner = self.compile_node(payload, depth + 1)?;
                match inner.into_array_elements() {
                    Some(elements) => Ok(Pattern::Matcher(Matcher::ArrayWith(elements))),
                    None => Err(invalid_payload(directive, "an array", payload)),
                }
            }
            "$array_equals" => {
                let inner = self.compile_node(payload, depth + 1)?;
                match inner.into_array_elements() {
                    Some(elements) => Ok(Pattern::Matcher(Matcher::ArrayEquals(elements))),
                    None => Err(invalid_payload(directive, "an array", payload)),
                }
            }
            "$absent" => {
                if payload.is_null() {
                    Ok(Match::absent())
                } else {
                    Err(invalid_payload(directive, "null (no payload)", payload))
                }
            }
            "$any_value" => {
                if payload.is_null() {
                    Ok(Match::any_value())
                } else {
                    Err(invalid_payload(directive, "null (no payload)", payload))
                }
            }
            "$not" => Ok(Match::not(self.compile_node(payload, depth + 1)?)),
            "$string_like_regexp" => {
                let Value::String(pattern) = payload else {
                    return Err(invalid_payload(directive, "a string", payload));
                };
                if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
                    return Err(PatternError::PatternTooLong {
                        len: pattern.len(),
                        max: MAX_REGEX_PATTERN_LENGTH,
                    });
                }
                match Regex::new(pattern) {
                    Ok(regex) => Ok(Pattern::Matcher(Matcher::StringLikeRegexp(regex))),
                    Err(err) => Err(PatternError::InvalidPattern {
                        pattern: pattern.clone(),
                        source: err.to_string(),
                    }),
                }
            }
            "$serialized_json" => Ok(Match::serialized_json(
                self.compile_node(payload, depth + 1)?,
            )),
            "$capture" => self.compile_capture(payload, depth),
            // Verbatim escape: the payload is literal structure, "$" keys
            // and all.
            "$literal" => Ok(Pattern::Literal(payload.clone())),
            unknown => Err(PatternError::UnknownDirective {
                directive: unknown.to_string(),
                available: DIRECTIVES.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    fn compile_capture(&mut self, payload: &Value, depth: usize) -> Result<Pattern, PatternError> {
        let (name, delegate) = match payload {
            Value::String(name) => (name.clone(), None),
            Value::Object(spec) => {
                let Some(name) = spec.get("name").and_then(Value::as_str) else {
                    return Err(PatternError::InvalidConfig {
                        source: "$capture requires a string \"name\"".to_string(),
                    });
                };
                for key in spec.keys() {
                    if key != "name" && key != "pattern" {
                        return Err(PatternError::InvalidConfig {
                            source: format!(
                                "unknown $capture field \"{key}\"; expected \"name\" and optional \"pattern\""
                            ),
                        });
                    }
                }
                let delegate = spec
                    .get("pattern")
                    .map(|p| self.compile_node(p, depth + 1))
                    .transpose()?;
                (name.to_string(), delegate)
            }
            other => return Err(invalid_payload("$capture", "a name or {name, pattern}", other)),
        };
        match self.captures.entry(name) {
            Entry::Occupied(entry) => {
                if delegate.is_some() {
                    return Err(PatternError::InvalidConfig {
                        source: format!(
                            "capture \"{}\" already declared; declare its pattern on the first occurrence only",
                            entry.key()
                        ),
                    });
                }
                Ok(Pattern::Matcher(Matcher::Capture(entry.get().clone())))
            }
            Entry::Vacant(slot) => {
                let capture = match delegate {
                    Some(pattern) => Capture::with_pattern(pattern),
                    None => Capture::new(),
                };
                slot.insert(capture.clone());
                Ok(Pattern::Matcher(Matcher::Capture(capture)))
            }
        }
    }
}

fn invalid_payload(directive: &str, expected: &str, payload: &Value) -> PatternError {
    PatternError::InvalidConfig {
        source: format!("{directive} requires {expected}, got {}", kind(payload)),
    }
}
