//! Matching benchmarks — the hot path.
//!
//! Measures: literal deep equality, object_like partial matching,
//! array_with subsequence scans, regex matching, serialized-JSON parsing,
//! capture flushing, and failure rendering.

use serde_json::{json, Map, Value};
use sift::{pattern, Capture, Match, Pattern};

fn main() {
    divan::main();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Test fixtures
// ═══════════════════════════════════════════════════════════════════════════════

fn wide_object(width: usize) -> Value {
    let map: Map<String, Value> = (0..width)
        .map(|i| (format!("key_{i:04}"), json!(format!("value_{i}"))))
        .collect();
    Value::Object(map)
}

fn long_array(len: usize) -> Value {
    Value::Array((0..len).map(|i| json!(format!("item_{i}"))).collect())
}

fn deep_pattern(depth: usize) -> Pattern {
    let mut pattern = pattern!("leaf");
    for _ in 0..depth {
        let mut entries = std::collections::BTreeMap::new();
        entries.insert("child".to_string(), pattern);
        pattern = Pattern::Object(entries);
    }
    pattern
}

fn deep_target(depth: usize) -> Value {
    let mut value = json!("leaf");
    for _ in 0..depth {
        value = json!({ "child": value });
    }
    value
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: literal deep equality
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn exact_match_hit(bencher: divan::Bencher) {
    let target = wide_object(20);
    let pattern = Pattern::from(target.clone());

    bencher.bench_local(|| pattern.test(&target));
}

#[divan::bench]
fn exact_match_miss(bencher: divan::Bencher) {
    let target = wide_object(20);
    let mut other = wide_object(20);
    if let Value::Object(map) = &mut other {
        map.insert("key_0010".to_string(), json!("mutated"));
    }
    let pattern = Pattern::from(other);

    bencher.bench_local(|| pattern.test(&target));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: object_like partial matching
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [20, 100, 500])]
fn object_like_three_of_n(bencher: divan::Bencher, width: usize) {
    let target = wide_object(width);
    let pattern = Match::object_like(pattern!({
        "key_0000": "value_0",
        "key_0001": "value_1",
        "key_0002": "value_2",
    }));

    bencher.bench_local(|| pattern.test(&target));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: nesting depth
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [1, 4, 8, 16])]
fn nested_object_hit(bencher: divan::Bencher, depth: usize) {
    let pattern = deep_pattern(depth);
    let target = deep_target(depth);

    bencher.bench_local(|| pattern.test(&target));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scaling: array_with subsequence scan
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench(args = [10, 100, 1000])]
fn array_with_match_at_end(bencher: divan::Bencher, len: usize) {
    let target = long_array(len);
    let pattern = Match::array_with(pattern!([format!("item_{}", len - 1)]));

    // Worst case: the only match is the last element → full scan
    bencher.bench_local(|| pattern.test(&target));
}

#[divan::bench(args = [10, 100, 1000])]
fn array_with_miss(bencher: divan::Bencher, len: usize) {
    let target = long_array(len);
    let pattern = Match::array_with(pattern!(["no_such_item"]));

    bencher.bench_local(|| pattern.test(&target));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: regex matching
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn regex_match_hit(bencher: divan::Bencher) {
    let pattern = Match::string_like_regexp(r"^arn:aws:iam::\d{12}:role/[\w+=,.@-]+$");
    let target = json!("arn:aws:iam::123456789012:role/service-role/MyRole-ABCDEF");

    bencher.bench_local(|| pattern.test(&target));
}

#[divan::bench]
fn regex_match_miss(bencher: divan::Bencher) {
    let pattern = Match::string_like_regexp(r"^arn:aws:iam::\d{12}:role/[\w+=,.@-]+$");
    let target = json!("not-an-arn");

    bencher.bench_local(|| pattern.test(&target));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Core scenario: serialized JSON (parse per test)
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn serialized_json_hit(bencher: divan::Bencher) {
    let pattern = Match::serialized_json(Match::object_like(pattern!({
        "Statement": Match::array_with(pattern!([
            Match::object_like(pattern!({ "Action": "sts:AssumeRole" }))
        ])),
    })));
    let target = json!(
        r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":"sts:AssumeRole","Principal":{"Service":"lambda.amazonaws.com"}}]}"#
    );

    bencher.bench_local(|| pattern.test(&target));
}

// ═══════════════════════════════════════════════════════════════════════════════
// Capture recording and flushing
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn capture_flush(bencher: divan::Bencher) {
    let target = json!({ "Fred": "Flob", "Bob": "Cat" });

    bencher.bench_local(|| {
        let fred = Capture::new();
        let pattern = Match::object_like(pattern!({ "Fred": (&fred) }));
        let mut result = pattern.test(&target);
        result.finished();
        fred.value()
    });
}

// ═══════════════════════════════════════════════════════════════════════════════
// Failure rendering
// ═══════════════════════════════════════════════════════════════════════════════

#[divan::bench]
fn render_failures(bencher: divan::Bencher) {
    let pattern = deep_pattern(8);
    let target = deep_target(7); // one level short → failure deep in the tree
    let result = pattern.test(&target);

    bencher.bench_local(|| result.to_human_strings());
}
