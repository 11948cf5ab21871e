//! Compile benchmarks — config document → pattern construction.
//!
//! Measures the one-time cost of compiling declarative pattern documents,
//! including regex compilation and deep/wide scaling.

use serde_json::{json, Map, Value};
use sift::PatternConfig;

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Directive compilation
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn compile_literal(bencher: divan::Bencher) {
    let config = PatternConfig::new(json!({ "Fred": "Flob", "Bob": [1, 2, 3] }));

    bencher.bench_local(|| config.compile());
}

#[divan::bench]
fn compile_object_like(bencher: divan::Bencher) {
    let config = PatternConfig::new(json!({
        "$object_like": { "Fred": "Flob", "Bob": { "$any_value": null } }
    }));

    bencher.bench_local(|| config.compile());
}

#[divan::bench]
fn compile_regex_simple(bencher: divan::Bencher) {
    let config = PatternConfig::new(json!({ "$string_like_regexp": r"^user-\d+$" }));

    bencher.bench_local(|| config.compile());
}

#[divan::bench]
fn compile_regex_complex(bencher: divan::Bencher) {
    let config = PatternConfig::new(json!({
        "$string_like_regexp":
            r"^arn:aws:iam::\d{12}:role/[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$"
    }));

    bencher.bench_local(|| config.compile());
}

#[divan::bench]
fn compile_captures(bencher: divan::Bencher) {
    let config = PatternConfig::new(json!({
        "$object_like": {
            "VpcId": { "$capture": "vpc" },
            "SubnetId": { "$capture": "subnet" },
            "RoleArn": { "$capture": { "name": "role", "pattern": { "$string_like_regexp": "^arn:" } } },
        }
    }));

    bencher.bench_local(|| config.compile());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: document width and depth
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [10, 100, 500])]
fn compile_wide_object(bencher: divan::Bencher, width: usize) {
    let map: Map<String, Value> = (0..width)
        .map(|i| (format!("key_{i:04}"), json!(format!("value_{i}"))))
        .collect();
    let config = PatternConfig::new(Value::Object(map));

    bencher.bench_local(|| config.compile());
}

#[divan::bench(args = [4, 16, 30])]
fn compile_nested_depth(bencher: divan::Bencher, depth: usize) {
    let mut document = json!("leaf");
    for _ in 0..depth {
        document = json!({ "$object_like": { "child": document } });
    }
    let config = PatternConfig::new(document);

    bencher.bench_local(|| config.compile());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parse + compile from source text
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn from_json_and_compile(bencher: divan::Bencher) {
    let text = r#"{
        "$object_like": {
            "Handler": "index.handler",
            "Runtime": { "$string_like_regexp": "^nodejs" },
            "Timeout": { "$any_value": null },
            "Layers": { "$array_with": ["arn:aws:lambda:us-east-1:111:layer:base:3"] }
        }
    }"#;

    bencher.bench_local(|| PatternConfig::from_json(text).and_then(|c| c.compile()));
}
