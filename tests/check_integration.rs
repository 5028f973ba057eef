//! Integration tests for the full checking pipeline.
//!
//! These tests run the checker over the fact files in testdata/facts,
//! which mirror the call sites of a small mruby extension.

use std::path::PathBuf;

use mrbcheck::check::{CheckResult, DiagnosticRule, Runner, Severity};
use mrbcheck::config::{self, Config};
use mrbcheck::host::collect_fact_files;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn load_config() -> Config {
    let config_path = testdata_path().join("mrbcheck.yaml");
    let config = Config::parse_file(&config_path).expect("should parse config");
    config::validate(&config).expect("config should be valid");
    config
}

/// Check a single fact file under testdata/facts.
fn check_file(name: &str) -> CheckResult {
    let config = load_config();
    let runner = Runner::new(&config);
    runner
        .run(&[testdata_path().join("facts").join(name)])
        .expect("check should succeed")
}

fn messages(result: &CheckResult, rule: DiagnosticRule) -> Vec<&str> {
    result
        .diagnostics
        .iter()
        .filter(|d| d.rule == rule)
        .map(|d| d.message.as_str())
        .collect()
}

#[test]
fn test_get_args_diagnostics() {
    let result = check_file("get_args.json");

    // Every watched call except the non-extern-C one.
    assert_eq!(result.calls_checked, 24);

    assert_eq!(
        messages(&result, DiagnosticRule::InvalidFormatSpecifier),
        vec!["Invalid format specifier: 'g'"]
    );
    assert_eq!(
        messages(&result, DiagnosticRule::OptionalOrdering),
        vec!["'?' format specifier must come after '|' format specifier."]
    );
    assert_eq!(
        messages(&result, DiagnosticRule::ArgumentCount),
        vec![
            "Wrong number of arguments passed to variadic mruby C API. Expected: 2, Actual: 3",
            "Wrong number of arguments passed to variadic mruby C API. Expected: 22, Actual: 2",
        ]
    );
    assert_eq!(
        messages(&result, DiagnosticRule::NonPointerArgument),
        vec!["Variadic argument of `mrb_get_args` must be a pointer."]
    );

    let type_errors = messages(&result, DiagnosticRule::ArgumentType);
    assert_eq!(type_errors.len(), 15);
    assert!(type_errors
        .iter()
        .all(|m| m.starts_with("Wrong argument passed to variadic mruby C API.")));

    assert_eq!(result.diagnostics.len(), 20);
    assert!(result
        .diagnostics
        .iter()
        .all(|d| d.severity == Severity::Error));
}

#[test]
fn test_get_args_clean_calls() {
    let result = check_file("get_args.json");

    // Lines 21, 22 and 25 hold the all-codes, "zs" and "|" calls.
    for line in [21, 22, 25] {
        assert!(
            result.diagnostics.iter().all(|d| d.line() != line),
            "unexpected diagnostic on line {}",
            line
        );
    }
    // Non-extern-C and non-literal descriptor calls are left alone.
    assert!(result.diagnostics.iter().all(|d| d.line() < 54));
}

#[test]
fn test_get_args_fix_its() {
    let result = check_file("get_args.json");

    let fix_for = |line: usize| {
        result
            .diagnostics
            .iter()
            .find(|d| d.line() == line && d.rule == DiagnosticRule::ArgumentType)
            .and_then(|d| d.fix_it.as_ref())
            .map(|f| f.replacement.clone())
    };

    // mrb_get_args(M, "o", &b)
    assert_eq!(fix_for(29), Some("mrb_value *".to_string()));
    // mrb_get_args(M, "z", &f)
    assert_eq!(fix_for(36), Some("char **".to_string()));
    // mrb_get_args(M, "s", &c, &f): only the length is wrong
    assert_eq!(fix_for(43), Some("mrb_int *".to_string()));
}

#[test]
fn test_literal_idioms() {
    let result = check_file("literals.yaml");

    assert_eq!(result.calls_checked, 6);
    assert_eq!(
        messages(&result, DiagnosticRule::PreferredIdiom),
        vec![
            "`mrb_intern_lit` is preferred when getting symbol from string literal.",
            "`mrb_str_new_lit` is preferred when creating string object from literal.",
        ]
    );
    assert_eq!(result.count(Severity::Warning), 2);
    assert!(!result.has_errors());

    let fixes: Vec<_> = result
        .diagnostics
        .iter()
        .filter_map(|d| d.fix_it.as_ref())
        .map(|f| (f.span.line, f.replacement.as_str()))
        .collect();
    assert_eq!(fixes, vec![(63, "mrb_intern_lit"), (71, "mrb_str_new_lit")]);
}

#[test]
fn test_funcall_counts() {
    let result = check_file("funcall.yaml");

    assert_eq!(result.calls_checked, 4);
    assert_eq!(
        messages(&result, DiagnosticRule::ArgumentCount),
        vec![
            "Wrong number of arguments passed to variadic mruby C API. Expected: 4, Actual: 5",
            "Wrong number of arguments passed to variadic mruby C API. Expected: 6, Actual: 4",
        ]
    );
    assert_eq!(
        messages(&result, DiagnosticRule::ArgumentType),
        vec!["Wrong argument passed to variadic mruby C API. Expected `mrb_value`, found `mrb_int`."]
    );
}

#[test]
fn test_message_templates() {
    let result = check_file("messages.yaml");

    // mrb_class_get is not watched.
    assert_eq!(result.calls_checked, 5);
    assert_eq!(
        messages(&result, DiagnosticRule::ArgumentCount),
        vec![
            "Wrong number of arguments passed to variadic mruby C API. Expected: 3, Actual: 4",
            "Wrong number of arguments passed to variadic mruby C API. Expected: 3, Actual: 4",
            "Wrong number of arguments passed to variadic mruby C API. Expected: 6, Actual: 5",
        ]
    );

    let type_lines: Vec<usize> = result
        .diagnostics
        .iter()
        .filter(|d| d.rule == DiagnosticRule::ArgumentType)
        .map(|d| d.line())
        .collect();
    // The literal 2 passed to mrb_raisef, then `i` passed to mrb_bug.
    assert_eq!(type_lines, vec![88, 89]);
}

#[test]
fn test_directory_run_honors_excluded_paths() {
    let config = load_config();
    let facts_dir = testdata_path().join("facts");
    let files = collect_fact_files(&facts_dir, &config).expect("should collect facts");

    assert_eq!(files.len(), 4);
    assert!(files
        .iter()
        .all(|p| !p.to_string_lossy().contains("vendor")));

    let result = Runner::new(&config).run(&files).expect("check should succeed");
    assert_eq!(result.scanned, 4);
    assert_eq!(result.calls_checked, 24 + 6 + 4 + 5);
    assert_eq!(result.count(Severity::Error), 20 + 3 + 5);
    assert_eq!(result.count(Severity::Warning), 2);

    // Without the exclusion the vendored file is checked too.
    let all = collect_fact_files(&facts_dir, &Config::default()).expect("should collect facts");
    assert_eq!(all.len(), 5);
}

#[test]
fn test_rule_severity_overrides() {
    let mut config = load_config();
    config
        .rules
        .insert("preferred_idiom".to_string(), config::RuleSetting::Error);
    config
        .rules
        .insert("argument_type".to_string(), config::RuleSetting::Off);

    let runner = Runner::new(&config);
    let result = runner
        .run(&[
            testdata_path().join("facts/literals.yaml"),
            testdata_path().join("facts/funcall.yaml"),
        ])
        .expect("check should succeed");

    assert_eq!(result.count_rule(DiagnosticRule::ArgumentType), 0);
    assert_eq!(result.count_rule(DiagnosticRule::PreferredIdiom), 2);
    assert_eq!(result.count(Severity::Warning), 0);
    assert_eq!(result.count(Severity::Error), 4);
}
