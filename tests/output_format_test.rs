//! Tests for the machine-readable output formats.
//!
//! These tests verify that the JSON, SARIF and clang renderings of a
//! real run carry every diagnostic with its location and fix-it.

use std::path::PathBuf;

use mrbcheck::check::{CheckResult, Runner};
use mrbcheck::config::Config;
use mrbcheck::host::collect_fact_files;
use mrbcheck::report::{self, JsonReport, SarifReport, Summary};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Run the checker over testdata/facts with the test config.
fn run_check() -> (CheckResult, PathBuf) {
    let testdata = testdata_path();
    let config_path = testdata.join("mrbcheck.yaml");
    let config = Config::parse_file(&config_path).expect("should parse config");

    let facts_dir = testdata.join("facts");
    let files = collect_fact_files(&facts_dir, &config).expect("should collect facts");
    let result = Runner::new(&config).run(&files).expect("check should succeed");
    (result, config_path)
}

fn run_and_get_json() -> JsonReport {
    let (result, config_path) = run_check();
    let summary = Summary::new(&result, false);
    report::json_report(
        &testdata_path().join("facts").to_string_lossy(),
        config_path.to_str(),
        &result,
        &summary,
    )
}

#[test]
fn test_json_report_structure() {
    let report = run_and_get_json();

    assert!(!report.version.is_empty(), "version should not be empty");
    assert!(!report.path.is_empty(), "path should not be empty");
    assert!(report.config.is_some(), "config should be recorded");
    assert_eq!(report.files_scanned, 4);
    assert_eq!(report.errors, 28);
    assert_eq!(report.warnings, 2);
    assert!(!report.passed, "errors should fail the run");
}

#[test]
fn test_json_diagnostics_format() {
    let report = run_and_get_json();

    assert_eq!(report.diagnostics.len(), 30);
    for d in &report.diagnostics {
        assert!(!d.rule.is_empty(), "rule should not be empty");
        assert!(!d.file.is_empty(), "file should not be empty");
        assert!(!d.message.is_empty(), "message should not be empty");
        assert!(d.line > 0 && d.column > 0, "location should be 1-indexed");
        assert!(
            d.severity == "error" || d.severity == "warning",
            "severity should be error/warning, got {}",
            d.severity
        );
    }

    let with_fix = report.diagnostics.iter().filter(|d| d.fix_it.is_some()).count();
    // 15 + 1 + 2 argument_type fixes, 2 idiom fixes
    assert_eq!(with_fix, 20);
}

#[test]
fn test_json_breakdown_format() {
    let report = run_and_get_json();

    let total: usize = report.breakdown.iter().map(|e| e.count).sum();
    assert_eq!(total, report.diagnostics.len());

    let names: Vec<&str> = report.breakdown.iter().map(|e| e.rule.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted, "breakdown should be sorted by rule");
    assert!(names.contains(&"preferred_idiom"));
}

#[test]
fn test_json_serialization() {
    let report = run_and_get_json();

    let json = serde_json::to_string_pretty(&report).expect("should serialize to JSON");
    let parsed: JsonReport = serde_json::from_str(&json).expect("should deserialize from JSON");

    assert_eq!(parsed.errors, report.errors);
    assert_eq!(parsed.diagnostics.len(), report.diagnostics.len());
    assert_eq!(parsed.breakdown.len(), report.breakdown.len());
}

#[test]
fn test_sarif_report() {
    let (result, _) = run_check();
    let sarif = report::sarif_report(&testdata_path().join("facts"), &result);

    assert_eq!(sarif.version, "2.1.0");
    assert_eq!(sarif.runs.len(), 1);

    let run = &sarif.runs[0];
    assert_eq!(run.tool.driver.name, "mrbcheck");
    assert_eq!(run.results.len(), result.diagnostics.len());
    // Only rules that fired are listed.
    assert_eq!(run.tool.driver.rules.len(), 6);
    assert!(run.tool.driver.rules.iter().all(|r| r.id != "misplaced_skip_modifier"));

    let idiom = run
        .results
        .iter()
        .find(|r| r.rule_id == "preferred_idiom")
        .expect("should report idiom");
    assert_eq!(idiom.level, "warning");
    assert_eq!(idiom.fixes.len(), 1);

    let json = serde_json::to_string(&sarif).expect("should serialize");
    let parsed: SarifReport = serde_json::from_str(&json).expect("should deserialize");
    assert_eq!(parsed.runs[0].results.len(), run.results.len());
}

#[test]
fn test_clang_lines() {
    let (result, _) = run_check();

    let lines: Vec<String> = result.diagnostics.iter().map(report::format_clang).collect();
    assert!(lines.iter().any(|l| l.starts_with(
        "test.c:28:19: error: Invalid format specifier: 'g' [invalid_format_specifier]"
    )));
    assert!(lines.iter().any(|l| l.contains("fix-it:\"test.c\":{63:3-63:18}:\"mrb_intern_lit\"")));
}
