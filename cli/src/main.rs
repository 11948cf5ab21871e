//! sift CLI — driving adapter for the sift matching engine.
//!
//! Subcommands:
//! - `match <pattern> <target>` — test a pattern document against a target
//! - `check <pattern>` — validate a pattern document compiles
//! - `resources <template> <type> [--pattern <file>]` — list matching resources
//! - `count <template> <type>` — count resources of a type

use std::process;

use sift::{CompiledPattern, Pattern, PatternConfig, Value};
use sift_cfn::Template;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "match" => cmd_match(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "resources" => cmd_resources(&args[2..]),
        "count" => cmd_count(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        return Err("match requires a pattern file and a target file".into());
    }

    let compiled = load_pattern(&args[0])?;
    let target = load_document(&args[1])?;

    let mut result = compiled.test(&target);
    if result.has_failed() {
        println!("no match:");
        for line in result.to_human_strings() {
            println!("  {line}");
        }
        process::exit(1);
    }
    result.finished();

    println!("match");
    print_captures(&compiled);
    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a pattern file path".into());
    }

    let compiled = load_pattern(&args[0])?;

    println!("Pattern valid");
    let names: Vec<&str> = compiled.captures().map(|(name, _)| name).collect();
    if !names.is_empty() {
        println!("captures: {}", names.join(", "));
    }
    Ok(())
}

fn cmd_resources(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        return Err("resources requires a template file and a type (\"*\" for all)".into());
    }

    let template = load_template(&args[0])?;
    let pattern = parse_pattern_flag(&args[2..])?;

    let found = template.find_resources(&args[1], pattern);
    if found.is_empty() {
        println!("(no matching resources)");
        process::exit(1);
    }
    for (logical_id, definition) in &found {
        println!("{logical_id}: {definition}");
    }
    Ok(())
}

fn cmd_count(args: &[String]) -> Result<(), String> {
    if args.len() < 2 {
        return Err("count requires a template file and a type (\"*\" for all)".into());
    }

    let template = load_template(&args[0])?;
    println!("{}", template.find_resources(&args[1], None).len());
    Ok(())
}

fn print_captures(compiled: &CompiledPattern) {
    for (name, capture) in compiled.captures() {
        if capture.is_empty() {
            continue;
        }
        let mut values = vec![capture.value()];
        while capture.next() {
            values.push(capture.value());
        }
        for value in values {
            println!("{name} = {value}");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Document loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_document(path: &str) -> Result<Value, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

fn load_pattern(path: &str) -> Result<CompiledPattern, String> {
    let document = load_document(path)?;
    PatternConfig::new(document)
        .compile()
        .map_err(|e| format!("pattern invalid: {e}"))
}

fn load_template(path: &str) -> Result<Template, String> {
    // YAML templates must spell intrinsics in the long form (Ref:, Fn::*);
    // the !Ref short-tag form is not plain YAML.
    let document = load_document(path)?;
    Template::from_value(document).map_err(|e| format!("template invalid: {e}"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_pattern_flag(args: &[String]) -> Result<Option<Pattern>, String> {
    let mut pattern = None;
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--pattern" {
            let path = args
                .get(i + 1)
                .ok_or("--pattern requires a file path")?;
            pattern = Some(load_pattern(path)?.pattern().clone());
            i += 2;
        } else {
            return Err(format!("unexpected argument \"{}\"", args[i]));
        }
    }

    Ok(pattern)
}

fn print_usage() {
    eprintln!(
        "Usage: sift <command> [options]

Commands:
  match <pattern> <target>                        Test a pattern against a target document
  check <pattern>                                 Validate a pattern document
  resources <template> <type> [--pattern <file>]  List resources matching a type and pattern
  count <template> <type>                         Count resources of a type
  help                                            Show this help

Files may be JSON or YAML. Pattern files use the $-directive grammar
($object_like, $array_with, $capture, ...); \"*\" matches every resource type."
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sift-cli-test-{}-{name}", process::id()));
        fs::write(&path, content).expect("write temp file");
        path
    }

    #[test]
    fn parse_pattern_flag_empty() {
        assert!(parse_pattern_flag(&[]).unwrap().is_none());
    }

    #[test]
    fn parse_pattern_flag_rejects_unknown_arguments() {
        let args: Vec<String> = vec!["--frobnicate".into()];
        assert!(parse_pattern_flag(&args).is_err());
    }

    #[test]
    fn parse_pattern_flag_requires_a_path() {
        let args: Vec<String> = vec!["--pattern".into()];
        assert!(parse_pattern_flag(&args).is_err());
    }

    #[test]
    fn load_yaml_pattern_document() {
        let path = write_temp("pattern.yaml", "$object_like:\n  Wobble: Flob\n");
        let compiled = load_pattern(path.to_str().unwrap()).unwrap();

        let hit = compiled.test(&json!({ "Wobble": "Flob", "Bob": 1 }));
        assert!(!hit.has_failed());

        fs::remove_file(path).ok();
    }

    #[test]
    fn load_json_template_document() {
        let path = write_temp(
            "template.json",
            r#"{ "Resources": { "Q": { "Type": "AWS::SQS::Queue" } } }"#,
        );
        let template = load_template(path.to_str().unwrap()).unwrap();
        assert_eq!(template.find_resources("AWS::SQS::Queue", None).len(), 1);

        fs::remove_file(path).ok();
    }

    #[test]
    fn load_rejects_missing_files() {
        assert!(load_document("/nonexistent/sift-pattern.json").is_err());
    }

    #[test]
    fn load_rejects_invalid_patterns() {
        let path = write_temp("bad-pattern.yaml", "$wobble: 1\n");
        let err = load_pattern(path.to_str().unwrap()).unwrap_err();
        assert!(err.contains("pattern invalid"));

        fs::remove_file(path).ok();
    }
}
