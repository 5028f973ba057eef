//! Output formatting for mrbcheck results.
//!
//! Supports four output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//! - Clang: `file:line:col: severity: message` lines with parseable fix-its

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::check::{CheckResult, Diagnostic, DiagnosticRule, FixIt, Severity};
use crate::host::Span;

/// Pass/fail outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub passed: bool,
}

impl Summary {
    /// Errors always fail the run; warnings fail it only when denied.
    pub fn new(result: &CheckResult, deny_warnings: bool) -> Self {
        let errors = result.count(Severity::Error);
        let warnings = result.count(Severity::Warning);
        Self {
            errors,
            warnings,
            passed: errors == 0 && !(deny_warnings && warnings > 0),
        }
    }
}

/// Diagnostic counts per rule, sorted by rule name.
fn breakdown(result: &CheckResult) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for d in &result.diagnostics {
        *counts.entry(d.rule.as_str()).or_insert(0) += 1;
    }
    counts
}

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub passed: bool,
    pub files_scanned: usize,
    pub calls_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub breakdown: Vec<BreakdownEntry>,
}

/// One diagnostic in the JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_it: Option<JsonFixIt>,
}

/// Suggested replacement in the JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonFixIt {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub replacement: String,
}

/// Diagnostic count for one rule.
#[derive(Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub rule: String,
    pub count: usize,
}

/// Build the JSON report structure.
pub fn json_report(
    path: &str,
    config_path: Option<&str>,
    result: &CheckResult,
    summary: &Summary,
) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        config: config_path.map(str::to_string),
        passed: summary.passed,
        files_scanned: result.scanned,
        calls_checked: result.calls_checked,
        errors: summary.errors,
        warnings: summary.warnings,
        diagnostics: result.diagnostics.iter().map(diagnostic_to_json).collect(),
        breakdown: breakdown(result)
            .into_iter()
            .map(|(rule, count)| BreakdownEntry {
                rule: rule.to_string(),
                count,
            })
            .collect(),
    }
}

/// Write results in JSON format.
pub fn write_json(
    path: &str,
    config_path: Option<&str>,
    result: &CheckResult,
    summary: &Summary,
) -> anyhow::Result<()> {
    let report = json_report(path, config_path, result, summary);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn diagnostic_to_json(d: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        rule: d.rule.as_str().to_string(),
        severity: d.severity.to_string(),
        file: d.file.clone(),
        line: d.span.line,
        column: d.span.column,
        message: d.message.clone(),
        fix_it: d.fix_it.as_ref().map(|f| {
            let (end_line, end_column) = span_end(&f.span);
            JsonFixIt {
                line: f.span.line,
                column: f.span.column,
                end_line,
                end_column,
                replacement: f.replacement.clone(),
            }
        }),
    }
}

fn span_end(span: &Span) -> (usize, usize) {
    (
        span.end_line.unwrap_or(span.line),
        span.end_column.unwrap_or(span.column),
    )
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "mrbcheck";
const INFO_URI: &str = "https://github.com/mruby/mruby";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "fullDescription", skip_serializing_if = "Option::is_none")]
    pub full_description: Option<SarifMessage>,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<SarifFix>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
    #[serde(rename = "startColumn")]
    pub start_column: usize,
    #[serde(rename = "endLine", skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(rename = "endColumn", skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifFix {
    pub description: SarifMessage,
    #[serde(rename = "artifactChanges")]
    pub artifact_changes: Vec<SarifArtifactChange>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifactChange {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub replacements: Vec<SarifReplacement>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifReplacement {
    #[serde(rename = "deletedRegion")]
    pub deleted_region: SarifRegion,
    #[serde(rename = "insertedContent")]
    pub inserted_content: SarifMessage,
}

/// Rule metadata for SARIF output.
struct RuleInfo {
    name: &'static str,
    short_description: &'static str,
    full_description: &'static str,
}

fn get_rule_info(rule: DiagnosticRule) -> RuleInfo {
    match rule {
        DiagnosticRule::InvalidFormatSpecifier => RuleInfo {
            name: "InvalidFormatSpecifier",
            short_description: "Unknown character in an mrb_get_args descriptor",
            full_description: "The descriptor string passed to mrb_get_args contains a character that is not a format specifier, so its argument contract cannot be determined.",
        },
        DiagnosticRule::OptionalOrdering => RuleInfo {
            name: "OptionalOrdering",
            short_description: "'?' used before '|' in an mrb_get_args descriptor",
            full_description: "The '?' specifier reports whether an optional argument was given and is only meaningful after the '|' optional marker.",
        },
        DiagnosticRule::MisplacedSkipModifier => RuleInfo {
            name: "MisplacedSkipModifier",
            short_description: "'!' does not follow a specifier it can modify",
            full_description: "The '!' modifier applies to the immediately preceding specifier and is only accepted after S, A, H, z, &, a, s and *.",
        },
        DiagnosticRule::ArgumentCount => RuleInfo {
            name: "ArgumentCount",
            short_description: "Wrong number of arguments passed to a variadic mruby C API",
            full_description: "The number of trailing arguments differs from what the descriptor, explicit count, or message template requires.",
        },
        DiagnosticRule::NonPointerArgument => RuleInfo {
            name: "NonPointerArgument",
            short_description: "Non-pointer argument passed to mrb_get_args",
            full_description: "Every trailing argument of mrb_get_args receives a value and must be the address of a variable.",
        },
        DiagnosticRule::ArgumentType => RuleInfo {
            name: "ArgumentType",
            short_description: "Wrong argument type passed to a variadic mruby C API",
            full_description: "A trailing argument's type does not match the type its specifier or the API requires.",
        },
        DiagnosticRule::PreferredIdiom => RuleInfo {
            name: "PreferredIdiom",
            short_description: "A literal-specialized mruby API is available",
            full_description: "A string literal is passed to a function that has a variant taking literals directly, which avoids a strlen at runtime.",
        },
    }
}

fn map_severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }

    Path::new(file_path)
        .strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.to_string())
}

fn sarif_region(span: &Span) -> SarifRegion {
    SarifRegion {
        start_line: span.line.max(1),
        start_column: span.column.max(1),
        end_line: span.end_line,
        end_column: span.end_column,
    }
}

fn sarif_fix(uri: &str, fix: &FixIt) -> SarifFix {
    SarifFix {
        description: SarifMessage {
            text: format!("Replace with `{}`", fix.replacement),
        },
        artifact_changes: vec![SarifArtifactChange {
            artifact_location: SarifArtifact {
                uri: uri.to_string(),
            },
            replacements: vec![SarifReplacement {
                deleted_region: sarif_region(&fix.span),
                inserted_content: SarifMessage {
                    text: fix.replacement.clone(),
                },
            }],
        }],
    }
}

/// Build the SARIF report structure.
pub fn sarif_report(base_path: &Path, result: &CheckResult) -> SarifReport {
    let rules: Vec<SarifRule> = DiagnosticRule::ALL
        .iter()
        .filter(|rule| result.diagnostics.iter().any(|d| d.rule == **rule))
        .map(|rule| {
            let info = get_rule_info(*rule);
            SarifRule {
                id: rule.as_str().to_string(),
                name: info.name.to_string(),
                short_description: SarifMessage {
                    text: info.short_description.to_string(),
                },
                full_description: Some(SarifMessage {
                    text: info.full_description.to_string(),
                }),
                default_config: SarifRuleConfig {
                    level: map_severity_to_level(&rule.default_severity()).to_string(),
                },
            }
        })
        .collect();

    let results: Vec<SarifResult> = result
        .diagnostics
        .iter()
        .map(|d| {
            let uri = make_relative_path(&d.file, base_path);
            SarifResult {
                rule_id: d.rule.as_str().to_string(),
                level: map_severity_to_level(&d.severity).to_string(),
                message: SarifMessage {
                    text: d.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifact { uri: uri.clone() },
                        region: sarif_region(&d.span),
                    },
                }],
                fixes: d.fix_it.iter().map(|f| sarif_fix(&uri, f)).collect(),
            }
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: INFO_URI.to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(base_path: &Path, result: &CheckResult) -> anyhow::Result<()> {
    let report = sarif_report(base_path, result);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Clang Format
// =============================================================================

/// Render one diagnostic the way a compiler prints it, followed by a
/// machine-parseable fix-it line when there is one.
pub fn format_clang(d: &Diagnostic) -> String {
    let mut out = format!(
        "{}:{}:{}: {}: {} [{}]",
        d.file, d.span.line, d.span.column, d.severity, d.message, d.rule
    );
    if let Some(fix) = &d.fix_it {
        let (end_line, end_column) = span_end(&fix.span);
        out.push_str(&format!(
            "\nfix-it:{:?}:{{{}:{}-{}:{}}}:{:?}",
            d.file, fix.span.line, fix.span.column, end_line, end_column, fix.replacement
        ));
    }
    out
}

/// Write results in clang diagnostic format.
pub fn write_clang(result: &CheckResult, summary: &Summary) {
    for d in &result.diagnostics {
        println!("{}", format_clang(d));
    }
    if summary.errors + summary.warnings > 0 {
        println!(
            "{} warning{} and {} error{} generated.",
            summary.warnings,
            plural(summary.warnings),
            summary.errors,
            plural(summary.errors)
        );
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_path: Option<&str>, result: &CheckResult, summary: &Summary) {
    // Header
    println!();
    print!("  ");
    print!("{}", "mrbcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // Scan info
    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:   ".dimmed());
    println!("{}", config_path.unwrap_or("(built-in defaults)"));
    println!();

    write_result_summary(result, summary);
    println!();

    if !result.diagnostics.is_empty() {
        write_diagnostics(&result.diagnostics);
        println!();
        write_breakdown(result);
        println!();
    }
}

fn write_result_summary(result: &CheckResult, summary: &Summary) {
    if summary.passed {
        print!("  {}", "✓ PASS".green());
    } else {
        print!("  {}", "✗ FAIL".red());
    }

    print!(
        "  {} file{}, {} call{} checked",
        result.scanned,
        plural(result.scanned),
        result.calls_checked,
        plural(result.calls_checked)
    );

    print!("  ");
    if summary.errors > 0 {
        print!("{}", format!("{} error{}", summary.errors, plural(summary.errors)).red());
    } else {
        print!("{}", "0 errors".green());
    }
    print!(", ");
    if summary.warnings > 0 {
        print!(
            "{}",
            format!("{} warning{}", summary.warnings, plural(summary.warnings)).yellow()
        );
    } else {
        print!("{}", "0 warnings".green());
    }
    println!();
}

fn write_diagnostics(diagnostics: &[Diagnostic]) {
    println!("  {} ({}):", "Diagnostics".bold(), diagnostics.len());
    println!();

    for d in diagnostics {
        write_severity_tag(&d.severity);
        print!("   ");
        print!("{:<26}", d.rule.as_str().dimmed());
        print!("{}", d.file.blue());
        print!("{}", format!(":{}", d.span).dimmed());
        println!();

        // Message on next line, indented
        println!("            {}", d.message);
        if let Some(fix) = &d.fix_it {
            println!(
                "            {}",
                format!("fix-it: replace {} with `{}`", fix.span, fix.replacement).dimmed()
            );
        }
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
    }
}

fn write_breakdown(result: &CheckResult) {
    println!("  {}", "Breakdown:".bold());

    // Sort rules by count descending
    let mut rules: Vec<(&str, usize)> = breakdown(result).into_iter().collect();
    rules.sort_by(|a, b| b.1.cmp(&a.1));

    for (rule, count) in rules {
        println!(
            "    {:<26} {:>3} diagnostic{}",
            rule,
            count,
            plural(count)
        );
    }
}
