//! Assertion failures, rendered for humans.
//!
//! The matching engine reports failures as data; this crate is the
//! boundary where a non-empty [`MatchResult`](sift::MatchResult) becomes a
//! caller-visible error. Every variant carries the full rendered failure
//! list so the user debugging a failing test sees every mismatch, not
//! just the first.

/// The candidate that came closest to matching, when nothing matched.
///
/// "Closest" means fewest recorded failures; ties go to the first
/// candidate in logical-ID order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosestMatch {
    /// Logical ID of the nearest candidate.
    pub logical_id: String,
    /// Its rendered failures, one per mismatch.
    pub failures: Vec<String>,
}

/// Errors from template parsing and failed assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionError {
    /// The template document is not shaped like a template.
    InvalidTemplate {
        /// What was wrong with it.
        reason: String,
    },
    /// A whole-template match failed.
    TemplateMismatch {
        /// Rendered failures, one per mismatch.
        failures: Vec<String>,
    },
    /// No entry in a section matched the pattern.
    NoneMatch {
        /// The template section searched (`"Resources"`, `"Outputs"`, ...).
        section: &'static str,
        /// The resource type or logical ID queried.
        query: String,
        /// How many candidates were checked.
        candidates: usize,
        /// The nearest miss, if any candidate existed.
        closest: Option<ClosestMatch>,
    },
    /// A count assertion found a different number of entries.
    CountMismatch {
        /// The template section counted.
        section: &'static str,
        /// The resource type or logical ID queried.
        query: String,
        /// Expected entry count.
        expected: usize,
        /// Actual entry count.
        actual: usize,
    },
}

impl std::fmt::Display for AssertionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTemplate { reason } => {
                write!(f, "invalid template: {reason}")
            }
            Self::TemplateMismatch { failures } => {
                write!(f, "template does not match pattern:")?;
                for line in failures {
                    write!(f, "\n  {line}")?;
                }
                Ok(())
            }
            Self::NoneMatch {
                section,
                query,
                candidates,
                closest,
            } => {
                write!(
                    f,
                    "no {section} entry matched \"{query}\" ({candidates} candidates checked)"
                )?;
                if let Some(closest) = closest {
                    write!(f, "\nclosest match \"{}\":", closest.logical_id)?;
                    for line in &closest.failures {
                        write!(f, "\n  {line}")?;
                    }
                }
                Ok(())
            }
            Self::CountMismatch {
                section,
                query,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "expected {expected} {section} entries matching \"{query}\", found {actual}"
                )
            }
        }
    }
}

impl std::error::Error for AssertionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_match_renders_closest_candidate() {
        let err = AssertionError::NoneMatch {
            section: "Resources",
            query: "AWS::Lambda::Function".to_string(),
            candidates: 2,
            closest: Some(ClosestMatch {
                logical_id: "MyFunction".to_string(),
                failures: vec![r#"/Properties/Runtime: expected "nodejs18.x" but received "python3.12""#.to_string()],
            }),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("no Resources entry matched \"AWS::Lambda::Function\""));
        assert!(rendered.contains("closest match \"MyFunction\""));
        assert!(rendered.contains("/Properties/Runtime"));
    }

    #[test]
    fn test_count_mismatch_renders_both_counts() {
        let err = AssertionError::CountMismatch {
            section: "Resources",
            query: "AWS::SQS::Queue".to_string(),
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "expected 2 Resources entries matching \"AWS::SQS::Queue\", found 3"
        );
    }
}
