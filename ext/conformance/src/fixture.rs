//! Conformance fixture runner
//!
//! Loads YAML fixtures and runs them against the config grammar. A fixture
//! pairs one pattern document with a list of targets and expected verdicts:
//!
//! ```yaml
//! name: object_like ignores extra fields
//! pattern:
//!   $object_like:
//!     Wobble: Flob
//! cases:
//!   - name: extra fields pass
//!     target: { Wobble: Flob, Bob: Cat }
//!     expect: pass
//!   - name: missing field fails
//!     target: { Bob: Cat }
//!     expect: fail
//!     failures:
//!       - 'missing field "Wobble"'
//! ```
//!
//! The pattern compiles once per fixture, so captures accumulate across
//! passing cases exactly as they do across resources in a template scan.

use serde::Deserialize;
use serde_json::Value;
use sift::value::value_eq;
use sift::{CompiledPattern, PatternConfig, PatternError};
use std::collections::BTreeMap;

/// A complete conformance fixture.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Pattern document in the config grammar.
    pub pattern: Value,
    pub cases: Vec<TestCase>,
}

/// One target and its expected verdict.
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub target: Value,
    pub expect: Expect,
    /// Substrings that must each appear in some rendered failure.
    #[serde(default)]
    pub failures: Vec<String>,
    /// Expected capture stores after this case, oldest entry first.
    /// Checking drains the shared cursor, so list these on a fixture's
    /// final case only. Empty lists are rejected; to assert "captured
    /// nothing", omit the entry.
    #[serde(default)]
    pub captures: BTreeMap<String, Vec<Value>>,
}

/// Expected verdict for a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expect {
    Pass,
    Fail,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    /// Every way the case deviated from its expectation; empty means the
    /// case passed.
    pub problems: Vec<String>,
}

impl CaseResult {
    /// Whether the case met every expectation.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

impl Fixture {
    /// Parse a fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML parse error.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    ///
    /// # Errors
    ///
    /// Returns the first YAML parse error.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Compile the fixture's pattern document.
    ///
    /// # Errors
    ///
    /// Returns the compile error from the config grammar.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        PatternConfig::new(self.pattern.clone()).compile()
    }

    /// Run all cases against one compiled pattern and return results.
    ///
    /// # Errors
    ///
    /// Returns the pattern's compile error, if any.
    pub fn run(&self) -> Result<Vec<CaseResult>, PatternError> {
        let compiled = self.compile()?;
        Ok(self.cases.iter().map(|case| case.run(&compiled)).collect())
    }

    /// Run all cases and panic on the first discrepancy.
    ///
    /// # Panics
    ///
    /// Panics when the pattern fails to compile or any case deviates from
    /// its expectation.
    pub fn run_and_assert(&self) {
        let results = self.run().unwrap_or_else(|e| {
            panic!("fixture '{}': pattern failed to compile: {e}", self.name);
        });
        for result in results {
            assert!(
                result.passed(),
                "fixture '{}' case '{}' failed:\n  {}",
                self.name,
                result.case_name,
                result.problems.join("\n  ")
            );
        }
    }
}

impl TestCase {
    fn run(&self, compiled: &CompiledPattern) -> CaseResult {
        let mut problems = Vec::new();
        let mut result = compiled.test(&self.target);
        let rendered = result.to_human_strings();

        match self.expect {
            Expect::Pass if result.has_failed() => {
                problems.push(format!(
                    "expected a match, got {} failure(s):",
                    result.fail_count()
                ));
                problems.extend(rendered.iter().map(|line| format!("  {line}")));
            }
            Expect::Fail if !result.has_failed() => {
                problems.push("expected a failure, but the pattern matched".to_string());
            }
            _ => {}
        }

        for needle in &self.failures {
            if !rendered.iter().any(|line| line.contains(needle)) {
                problems.push(format!("no failure contains {needle:?}; got {rendered:?}"));
            }
        }

        if !result.has_failed() {
            result.finished();
        }

        self.check_captures(compiled, &mut problems);

        CaseResult {
            case_name: self.name.clone(),
            problems,
        }
    }

    /// Drain each named capture's cursor and compare against the expected
    /// store.
    fn check_captures(&self, compiled: &CompiledPattern, problems: &mut Vec<String>) {
        for (name, expected) in &self.captures {
            let Some(capture) = compiled.capture(name) else {
                problems.push(format!("pattern declares no capture named {name:?}"));
                continue;
            };
            if expected.is_empty() {
                problems.push(format!(
                    "capture {name:?}: expectations must list at least one value"
                ));
                continue;
            }
            if capture.is_empty() {
                problems.push(format!(
                    "capture {name:?}: expected {expected:?}, got nothing"
                ));
                continue;
            }
            let mut actual = vec![capture.value()];
            while capture.next() {
                actual.push(capture.value());
            }
            let store_matches = actual.len() == expected.len()
                && actual.iter().zip(expected).all(|(a, e)| value_eq(a, e));
            if !store_matches {
                problems.push(format!(
                    "capture {name:?}: expected {expected:?}, got {actual:?}"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OBJECT_LIKE_FIXTURE: &str = r#"
name: object_like ignores extra fields
pattern:
  $object_like:
    Wobble: Flob
cases:
  - name: extra fields pass
    target: { Wobble: Flob, Bob: Cat }
    expect: pass
  - name: missing field fails
    target: { Bob: Cat }
    expect: fail
    failures:
      - 'missing field "Wobble"'
"#;

    #[test]
    fn test_fixture_parses_and_passes() {
        let fixture = Fixture::from_yaml(OBJECT_LIKE_FIXTURE).unwrap();
        assert_eq!(fixture.cases.len(), 2);
        fixture.run_and_assert();
    }

    #[test]
    fn test_wrong_verdict_is_reported() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong verdict
pattern: Flob
cases:
  - name: should fail but passes
    target: Flob
    expect: fail
"#,
        )
        .unwrap();

        let results = fixture.run().unwrap();
        assert!(!results[0].passed());
        assert!(results[0].problems[0].contains("expected a failure"));
    }

    #[test]
    fn test_missing_failure_substring_is_reported() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong substring
pattern: Flob
cases:
  - name: mismatch with unexpected message
    target: Cat
    expect: fail
    failures:
      - 'no such message'
"#,
        )
        .unwrap();

        let results = fixture.run().unwrap();
        assert!(!results[0].passed());
        assert!(results[0].problems[0].contains("no failure contains"));
    }

    #[test]
    fn test_captures_accumulate_across_cases() {
        let fixture = Fixture::from_yaml(
            r#"
name: capture accumulation
pattern:
  $object_like:
    Fred:
      $capture: fred
cases:
  - name: first match
    target: { Fred: Flob }
    expect: pass
  - name: second match
    target: { Fred: Quib }
    expect: pass
    captures:
      fred: [Flob, Quib]
"#,
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn test_failed_cases_do_not_feed_captures() {
        let fixture = Fixture::from_yaml(
            r#"
name: capture isolation
pattern:
  $object_like:
    Fred:
      $capture: fred
    Keep: delivered
cases:
  - name: match feeds the store
    target: { Fred: Flob, Keep: delivered }
    expect: pass
  - name: mismatch is discarded
    target: { Fred: Poison, Keep: dropped }
    expect: fail
    captures:
      fred: [Flob]
"#,
        )
        .unwrap();
        fixture.run_and_assert();
    }

    #[test]
    fn test_multi_document_files() {
        let yaml = format!("{OBJECT_LIKE_FIXTURE}\n---\nname: second\npattern: 1\ncases: []\n");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[1].name, "second");
    }

    #[test]
    fn test_compile_error_surfaces_fixture_name() {
        let fixture = Fixture::from_yaml(
            r#"
name: bad directive
pattern:
  $wobble: 1
cases: []
"#,
        )
        .unwrap();
        assert!(fixture.run().is_err());
    }

    #[test]
    fn test_unknown_capture_expectation_is_reported() {
        let fixture = Fixture::from_yaml(OBJECT_LIKE_FIXTURE).unwrap();
        let compiled = fixture.compile().unwrap();
        let case = TestCase {
            name: "probe".to_string(),
            target: json!({ "Wobble": "Flob" }),
            expect: Expect::Pass,
            failures: Vec::new(),
            captures: [("ghost".to_string(), vec![json!(1)])].into(),
        };
        let result = case.run(&compiled);
        assert!(result.problems[0].contains("no capture named"));
    }
}
