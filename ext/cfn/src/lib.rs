//! sift-cfn: CloudFormation template assertions
//!
//! Section-aware assertions over synthesized CloudFormation templates,
//! built on the `sift` matcher engine.
//!
//! # Architecture
//!
//! ```text
//! template JSON (string or Value)
//!         ↓ parse / from_value
//! Template  — section lookup, type filtering, '*' wildcards
//!         ↓ has_* / find_* / *_count_is
//! sift Pattern::test — failures as data, captures flushed per match
//! ```
//!
//! Object-shaped patterns are lifted to `object_like` by default: extra
//! keys in the template never fail an assertion unless the pattern opts
//! into exactness. `find_*` methods return the matching entries and never
//! fail; `has_*` methods panic with every rendered mismatch (use the
//! `try_has_*` twins to handle the error yourself).
//!
//! # Example
//!
//! ```
//! use sift::{pattern, Match};
//! use sift_cfn::Template;
//!
//! let template: Template = r#"{
//!     "Resources": {
//!         "Queue": {
//!             "Type": "AWS::SQS::Queue",
//!             "Properties": { "QueueName": "jobs", "VisibilityTimeout": 120 }
//!         }
//!     }
//! }"#.parse().unwrap();
//!
//! template.has_resource_properties("AWS::SQS::Queue", pattern!({
//!     "QueueName": "jobs",
//! }));
//! template.resource_count_is("AWS::SQS::Queue", 1);
//! ```

mod error;
mod template;

pub use error::{AssertionError, ClosestMatch};
pub use template::Template;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{AssertionError, ClosestMatch, Template};
    pub use sift::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_compiles() {
        // Basic smoke test that dependencies are wired correctly
        let template = Template::from_value(serde_json::json!({}));
        assert!(template.is_ok());
    }
}
