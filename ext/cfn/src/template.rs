//! The template façade: section-aware assertions over a parsed template.
//!
//! A [`Template`] wraps a CloudFormation document and exposes assertion
//! methods per section. Every `has_*` method has a `try_has_*` twin
//! returning `Result`; the unprefixed form panics with the rendered
//! failure list, which is what a failing test should print.
//!
//! # Pattern lifting
//!
//! Object-shaped patterns handed to section assertions are lifted to
//! [`Match::object_like`]: when you assert on a resource you almost never
//! want to spell out every key CloudFormation synthesizes. Explicit
//! matchers pass through untouched, so `Match::object_equals` (or any
//! other matcher) opts out of the default.

use crate::error::{AssertionError, ClosestMatch};
use serde_json::{Map, Value};
use sift::{Match, Pattern};
use std::collections::BTreeMap;
use std::str::FromStr;

const RESOURCES: &str = "Resources";
const OUTPUTS: &str = "Outputs";
const MAPPINGS: &str = "Mappings";
const CONDITIONS: &str = "Conditions";
const PARAMETERS: &str = "Parameters";

/// Sections that must be objects when present.
const SECTIONS: [&str; 5] = [RESOURCES, OUTPUTS, MAPPINGS, CONDITIONS, PARAMETERS];

/// A parsed CloudFormation template, ready for assertions.
///
/// ```
/// use sift::{pattern, Match};
/// use sift_cfn::Template;
///
/// let template: Template = r#"{
///     "Resources": {
///         "MyFunction": {
///             "Type": "AWS::Lambda::Function",
///             "Properties": { "Runtime": "nodejs18.x", "Handler": "index.handler" }
///         }
///     }
/// }"#.parse().unwrap();
///
/// template.has_resource_properties("AWS::Lambda::Function", pattern!({
///     "Runtime": Match::string_like_regexp("^nodejs"),
/// }));
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    doc: Value,
}

impl Template {
    /// Wrap an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::InvalidTemplate`] if the document is not
    /// an object, or if a known section is present but not an object.
    pub fn from_value(doc: Value) -> Result<Self, AssertionError> {
        if !doc.is_object() {
            return Err(AssertionError::InvalidTemplate {
                reason: format!(
                    "template must be a JSON object, got {}",
                    sift::value::kind(&doc)
                ),
            });
        }
        for section in SECTIONS {
            if let Some(value) = doc.get(section) {
                if !value.is_object() {
                    return Err(AssertionError::InvalidTemplate {
                        reason: format!(
                            "section \"{section}\" must be an object, got {}",
                            sift::value::kind(value)
                        ),
                    });
                }
            }
        }
        Ok(Self { doc })
    }

    /// The underlying document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    // ─────────────────────────────────────────────────────────────────────
    // Whole-template matching
    // ─────────────────────────────────────────────────────────────────────

    /// Match a pattern against the entire template document.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::TemplateMismatch`] with every rendered
    /// failure when the pattern does not match.
    pub fn try_template_matches(
        &self,
        pattern: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        let pattern = lift(pattern.into());
        let mut result = pattern.test(&self.doc);
        if result.has_failed() {
            return Err(AssertionError::TemplateMismatch {
                failures: result.to_human_strings(),
            });
        }
        result.finished();
        Ok(())
    }

    /// Panicking twin of [`try_template_matches`](Self::try_template_matches).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when the pattern does not
    /// match.
    #[track_caller]
    pub fn template_matches(&self, pattern: impl Into<Pattern>) {
        if let Err(err) = self.try_template_matches(pattern) {
            panic!("{err}");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────

    /// Assert that at least one resource of `type_name` matches `pattern`.
    ///
    /// The pattern sees the whole resource object (`Type`, `Properties`,
    /// `DependsOn`, ...). Every matching resource flushes its captures, so
    /// a shared [`Capture`](sift::Capture) accumulates one entry per
    /// matching resource, in logical-ID order.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoneMatch`] naming the closest candidate
    /// when nothing matches.
    pub fn try_has_resource(
        &self,
        type_name: &str,
        pattern: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        let pattern = lift(pattern.into());
        let scan = scan_entries(self.resources_of_type(type_name), Some(&pattern));
        scan.require_match(RESOURCES, type_name)
    }

    /// Panicking twin of [`try_has_resource`](Self::try_has_resource).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when no resource matches.
    #[track_caller]
    pub fn has_resource(&self, type_name: &str, pattern: impl Into<Pattern>) {
        if let Err(err) = self.try_has_resource(type_name, pattern) {
            panic!("{err}");
        }
    }

    /// Assert that at least one resource of `type_name` has matching
    /// `Properties`.
    ///
    /// Equivalent to [`try_has_resource`](Self::try_has_resource) with the
    /// pattern nested under `Properties`. Pass [`Match::absent`] to assert
    /// a resource synthesized without a `Properties` block.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoneMatch`] when nothing matches.
    pub fn try_has_resource_properties(
        &self,
        type_name: &str,
        properties: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        self.try_has_resource(type_name, properties_pattern(properties.into()))
    }

    /// Panicking twin of
    /// [`try_has_resource_properties`](Self::try_has_resource_properties).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when no resource matches.
    #[track_caller]
    pub fn has_resource_properties(&self, type_name: &str, properties: impl Into<Pattern>) {
        if let Err(err) = self.try_has_resource_properties(type_name, properties) {
            panic!("{err}");
        }
    }

    /// All resources of `type_name` matching `pattern`, keyed by logical
    /// ID. Pass `None` to list every resource of the type; pass `"*"` as
    /// the type to search all resources. Never fails: no matches is an
    /// empty map.
    #[must_use]
    pub fn find_resources(
        &self,
        type_name: &str,
        pattern: Option<Pattern>,
    ) -> BTreeMap<String, Value> {
        let pattern = pattern.map(lift);
        scan_entries(self.resources_of_type(type_name), pattern.as_ref()).matched
    }

    /// Assert that exactly `count` resources of `type_name` exist.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::CountMismatch`] with both counts.
    pub fn try_resource_count_is(
        &self,
        type_name: &str,
        count: usize,
    ) -> Result<(), AssertionError> {
        let actual = self.find_resources(type_name, None).len();
        if actual == count {
            Ok(())
        } else {
            Err(AssertionError::CountMismatch {
                section: RESOURCES,
                query: type_name.to_string(),
                expected: count,
                actual,
            })
        }
    }

    /// Panicking twin of [`try_resource_count_is`](Self::try_resource_count_is).
    ///
    /// # Panics
    ///
    /// Panics when the count differs.
    #[track_caller]
    pub fn resource_count_is(&self, type_name: &str, count: usize) {
        if let Err(err) = self.try_resource_count_is(type_name, count) {
            panic!("{err}");
        }
    }

    /// Assert that exactly `count` resources of `type_name` have matching
    /// `Properties`.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::CountMismatch`] with both counts.
    pub fn try_resource_properties_count_is(
        &self,
        type_name: &str,
        properties: impl Into<Pattern>,
        count: usize,
    ) -> Result<(), AssertionError> {
        let actual = self
            .find_resources(type_name, Some(properties_pattern(properties.into())))
            .len();
        if actual == count {
            Ok(())
        } else {
            Err(AssertionError::CountMismatch {
                section: RESOURCES,
                query: type_name.to_string(),
                expected: count,
                actual,
            })
        }
    }

    /// Panicking twin of
    /// [`try_resource_properties_count_is`](Self::try_resource_properties_count_is).
    ///
    /// # Panics
    ///
    /// Panics when the count differs.
    #[track_caller]
    pub fn resource_properties_count_is(
        &self,
        type_name: &str,
        properties: impl Into<Pattern>,
        count: usize,
    ) {
        if let Err(err) = self.try_resource_properties_count_is(type_name, properties, count) {
            panic!("{err}");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Outputs / Mappings / Conditions / Parameters
    // ─────────────────────────────────────────────────────────────────────

    /// Assert that the output under `logical_id` matches `pattern`.
    /// `"*"` matches against every output.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoneMatch`] when nothing matches.
    pub fn try_has_output(
        &self,
        logical_id: &str,
        pattern: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        self.try_has_entry(OUTPUTS, logical_id, pattern.into())
    }

    /// Panicking twin of [`try_has_output`](Self::try_has_output).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when no output matches.
    #[track_caller]
    pub fn has_output(&self, logical_id: &str, pattern: impl Into<Pattern>) {
        if let Err(err) = self.try_has_output(logical_id, pattern) {
            panic!("{err}");
        }
    }

    /// All outputs matching `pattern`, keyed by logical ID.
    #[must_use]
    pub fn find_outputs(
        &self,
        logical_id: &str,
        pattern: Option<Pattern>,
    ) -> BTreeMap<String, Value> {
        self.find_entries(OUTPUTS, logical_id, pattern)
    }

    /// Assert that the mapping under `logical_id` matches `pattern`.
    /// `"*"` matches against every mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoneMatch`] when nothing matches.
    pub fn try_has_mapping(
        &self,
        logical_id: &str,
        pattern: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        self.try_has_entry(MAPPINGS, logical_id, pattern.into())
    }

    /// Panicking twin of [`try_has_mapping`](Self::try_has_mapping).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when no mapping matches.
    #[track_caller]
    pub fn has_mapping(&self, logical_id: &str, pattern: impl Into<Pattern>) {
        if let Err(err) = self.try_has_mapping(logical_id, pattern) {
            panic!("{err}");
        }
    }

    /// All mappings matching `pattern`, keyed by logical ID.
    #[must_use]
    pub fn find_mappings(
        &self,
        logical_id: &str,
        pattern: Option<Pattern>,
    ) -> BTreeMap<String, Value> {
        self.find_entries(MAPPINGS, logical_id, pattern)
    }

    /// Assert that the condition under `logical_id` matches `pattern`.
    /// `"*"` matches against every condition.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoneMatch`] when nothing matches.
    pub fn try_has_condition(
        &self,
        logical_id: &str,
        pattern: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        self.try_has_entry(CONDITIONS, logical_id, pattern.into())
    }

    /// Panicking twin of [`try_has_condition`](Self::try_has_condition).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when no condition matches.
    #[track_caller]
    pub fn has_condition(&self, logical_id: &str, pattern: impl Into<Pattern>) {
        if let Err(err) = self.try_has_condition(logical_id, pattern) {
            panic!("{err}");
        }
    }

    /// All conditions matching `pattern`, keyed by logical ID.
    #[must_use]
    pub fn find_conditions(
        &self,
        logical_id: &str,
        pattern: Option<Pattern>,
    ) -> BTreeMap<String, Value> {
        self.find_entries(CONDITIONS, logical_id, pattern)
    }

    /// Assert that the parameter under `logical_id` matches `pattern`.
    /// `"*"` matches against every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::NoneMatch`] when nothing matches.
    pub fn try_has_parameter(
        &self,
        logical_id: &str,
        pattern: impl Into<Pattern>,
    ) -> Result<(), AssertionError> {
        self.try_has_entry(PARAMETERS, logical_id, pattern.into())
    }

    /// Panicking twin of [`try_has_parameter`](Self::try_has_parameter).
    ///
    /// # Panics
    ///
    /// Panics with the rendered failure list when no parameter matches.
    #[track_caller]
    pub fn has_parameter(&self, logical_id: &str, pattern: impl Into<Pattern>) {
        if let Err(err) = self.try_has_parameter(logical_id, pattern) {
            panic!("{err}");
        }
    }

    /// All parameters matching `pattern`, keyed by logical ID.
    #[must_use]
    pub fn find_parameters(
        &self,
        logical_id: &str,
        pattern: Option<Pattern>,
    ) -> BTreeMap<String, Value> {
        self.find_entries(PARAMETERS, logical_id, pattern)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Section plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn section(&self, name: &str) -> Option<&Map<String, Value>> {
        self.doc.get(name)?.as_object()
    }

    fn resources_of_type(&self, type_name: &str) -> Vec<(&String, &Value)> {
        self.section(RESOURCES)
            .map(|map| {
                map.iter()
                    .filter(|(_, resource)| {
                        type_name == "*"
                            || resource.get("Type").and_then(Value::as_str) == Some(type_name)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn named_entries(&self, section: &str, logical_id: &str) -> Vec<(&String, &Value)> {
        self.section(section)
            .map(|map| {
                map.iter()
                    .filter(|(id, _)| logical_id == "*" || id.as_str() == logical_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn try_has_entry(
        &self,
        section: &'static str,
        logical_id: &str,
        pattern: Pattern,
    ) -> Result<(), AssertionError> {
        let pattern = lift(pattern);
        let scan = scan_entries(self.named_entries(section, logical_id), Some(&pattern));
        scan.require_match(section, logical_id)
    }

    fn find_entries(
        &self,
        section: &'static str,
        logical_id: &str,
        pattern: Option<Pattern>,
    ) -> BTreeMap<String, Value> {
        let pattern = pattern.map(lift);
        scan_entries(self.named_entries(section, logical_id), pattern.as_ref()).matched
    }
}

impl FromStr for Template {
    type Err = AssertionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let doc: Value =
            serde_json::from_str(s).map_err(|e| AssertionError::InvalidTemplate {
                reason: e.to_string(),
            })?;
        Self::from_value(doc)
    }
}

/// Default-policy lift: object-shaped patterns become `object_like`,
/// explicit matchers and non-object literals pass through.
fn lift(pattern: Pattern) -> Pattern {
    match pattern {
        Pattern::Object(_) | Pattern::Literal(Value::Object(_)) => Match::object_like(pattern),
        other => other,
    }
}

/// Nest a properties pattern under the resource's `Properties` key.
fn properties_pattern(properties: Pattern) -> Pattern {
    let mut entries = BTreeMap::new();
    entries.insert("Properties".to_string(), lift(properties));
    Match::object_like(Pattern::Object(entries))
}

struct Scan {
    matched: BTreeMap<String, Value>,
    closest: Option<ClosestMatch>,
    candidates: usize,
}

impl Scan {
    fn require_match(self, section: &'static str, query: &str) -> Result<(), AssertionError> {
        if self.matched.is_empty() {
            Err(AssertionError::NoneMatch {
                section,
                query: query.to_string(),
                candidates: self.candidates,
                closest: self.closest,
            })
        } else {
            Ok(())
        }
    }
}

/// Run the pattern against every candidate. Matching entries flush their
/// captures; for misses the candidate with the fewest failures is kept as
/// the closest match.
fn scan_entries(entries: Vec<(&String, &Value)>, pattern: Option<&Pattern>) -> Scan {
    let mut scan = Scan {
        matched: BTreeMap::new(),
        closest: None,
        candidates: 0,
    };
    for (id, value) in entries {
        scan.candidates += 1;
        let Some(pattern) = pattern else {
            scan.matched.insert(id.clone(), value.clone());
            continue;
        };
        let mut result = pattern.test(value);
        if result.has_failed() {
            let failures = result.to_human_strings();
            let closer = scan
                .closest
                .as_ref()
                .map_or(true, |c| failures.len() < c.failures.len());
            if closer {
                scan.closest = Some(ClosestMatch {
                    logical_id: id.clone(),
                    failures,
                });
            }
        } else {
            result.finished();
            scan.matched.insert(id.clone(), value.clone());
        }
    }
    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sift::pattern;

    #[test]
    fn test_from_value_requires_object() {
        let err = Template::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, AssertionError::InvalidTemplate { .. }));
        assert!(err.to_string().contains("got array"));
    }

    #[test]
    fn test_from_value_requires_object_sections() {
        let err = Template::from_value(json!({ "Resources": [1] })).unwrap_err();
        assert!(err.to_string().contains("\"Resources\""));
    }

    #[test]
    fn test_from_str_reports_parse_errors() {
        let err = "{ nope".parse::<Template>().unwrap_err();
        assert!(matches!(err, AssertionError::InvalidTemplate { .. }));
    }

    #[test]
    fn test_lift_wraps_objects_only() {
        assert!(lift(pattern!({ "a": 1 })).is_matcher());
        assert!(lift(Pattern::from(json!({ "a": 1 }))).is_matcher());
        assert!(!lift(pattern!([1, 2])).is_matcher());
        assert!(!lift(pattern!("Flob")).is_matcher());
        // Explicit matchers pass through unchanged.
        let exact = Match::object_equals(pattern!({ "a": 1 }));
        assert!(matches!(
            lift(exact),
            Pattern::Matcher(sift::Matcher::ObjectEquals(_))
        ));
    }

    #[test]
    fn test_lifted_object_ignores_extra_keys() {
        let lifted = lift(pattern!({ "a": 1 }));
        assert!(!lifted.test(&json!({ "a": 1, "b": 2 })).has_failed());
    }

    #[test]
    fn test_resources_of_type_filters_on_type_field() {
        let template = Template::from_value(json!({
            "Resources": {
                "Queue": { "Type": "AWS::SQS::Queue" },
                "Topic": { "Type": "AWS::SNS::Topic" },
            }
        }))
        .unwrap();
        assert_eq!(template.resources_of_type("AWS::SQS::Queue").len(), 1);
        assert_eq!(template.resources_of_type("*").len(), 2);
        assert_eq!(template.resources_of_type("AWS::EC2::Instance").len(), 0);
    }

    #[test]
    fn test_missing_section_yields_no_candidates() {
        let template = Template::from_value(json!({})).unwrap();
        assert!(template.find_resources("*", None).is_empty());
        assert!(template.find_outputs("*", None).is_empty());
    }
}
