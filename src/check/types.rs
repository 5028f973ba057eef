//! Core types for check results.

use serde::{Deserialize, Serialize};

use crate::host::Span;

/// Severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule names for the kinds of problems the checker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticRule {
    /// A descriptor character outside the known vocabulary.
    InvalidFormatSpecifier,
    /// `?` appearing before `|` in a descriptor.
    OptionalOrdering,
    /// `!` not following a code it can modify.
    MisplacedSkipModifier,
    /// Expected and actual argument counts differ.
    ArgumentCount,
    /// A `mrb_get_args` trailing argument that is not a pointer.
    NonPointerArgument,
    /// A trailing argument of the wrong symbolic type.
    ArgumentType,
    /// A literal-specialized entry point exists for this call.
    PreferredIdiom,
}

impl DiagnosticRule {
    /// All rules, in reporting order.
    pub const ALL: &'static [DiagnosticRule] = &[
        DiagnosticRule::InvalidFormatSpecifier,
        DiagnosticRule::OptionalOrdering,
        DiagnosticRule::MisplacedSkipModifier,
        DiagnosticRule::ArgumentCount,
        DiagnosticRule::NonPointerArgument,
        DiagnosticRule::ArgumentType,
        DiagnosticRule::PreferredIdiom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticRule::InvalidFormatSpecifier => "invalid_format_specifier",
            DiagnosticRule::OptionalOrdering => "optional_ordering",
            DiagnosticRule::MisplacedSkipModifier => "misplaced_skip_modifier",
            DiagnosticRule::ArgumentCount => "argument_count",
            DiagnosticRule::NonPointerArgument => "non_pointer_argument",
            DiagnosticRule::ArgumentType => "argument_type",
            DiagnosticRule::PreferredIdiom => "preferred_idiom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == s)
    }

    /// Severity used when the configuration doesn't override it.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticRule::PreferredIdiom => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for DiagnosticRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A suggested literal source replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixIt {
    /// Source range to replace.
    pub span: Span,
    /// Replacement text.
    pub replacement: String,
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: DiagnosticRule,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_it: Option<FixIt>,
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        self.span.line
    }
}

/// Results of checking a set of fact files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    /// Number of fact files checked
    pub scanned: usize,
    /// Number of calls that matched a watched entry point
    pub calls_checked: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: CheckResult) {
        self.diagnostics.extend(other.diagnostics);
        self.scanned += other.scanned;
        self.calls_checked += other.calls_checked;
    }

    /// Check if there are any error-severity diagnostics.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Number of diagnostics for the given rule.
    pub fn count_rule(&self, rule: DiagnosticRule) -> usize {
        self.diagnostics.iter().filter(|d| d.rule == rule).count()
    }
}
