//! Uniform construction and reporting of diagnostics.

use std::collections::HashMap;

use crate::config::RuleSetting;
use crate::host::Span;

use super::{Diagnostic, DiagnosticRule, FixIt, Severity};

/// Effective severity of every rule, resolved once from the configuration.
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// `None` means the rule is turned off.
    severities: HashMap<DiagnosticRule, Option<Severity>>,
}

impl RuleSet {
    /// Every rule at its default severity.
    pub fn new() -> Self {
        let severities = DiagnosticRule::ALL
            .iter()
            .map(|r| (*r, Some(r.default_severity())))
            .collect();
        Self { severities }
    }

    /// Apply a configured setting to one rule.
    pub fn set(&mut self, rule: DiagnosticRule, setting: RuleSetting) {
        let severity = match setting {
            RuleSetting::Error => Some(Severity::Error),
            RuleSetting::Warning => Some(Severity::Warning),
            RuleSetting::Off => None,
        };
        self.severities.insert(rule, severity);
    }

    /// Severity to report `rule` with, or `None` if it is off.
    pub fn severity(&self, rule: DiagnosticRule) -> Option<Severity> {
        self.severities
            .get(&rule)
            .copied()
            .unwrap_or(Some(rule.default_severity()))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only destination for diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Builds diagnostics for one file and hands them to the sink.
pub struct Emitter<'a> {
    rules: &'a RuleSet,
    file: &'a str,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> Emitter<'a> {
    pub fn new(rules: &'a RuleSet, file: &'a str, sink: &'a mut dyn DiagnosticSink) -> Self {
        Self { rules, file, sink }
    }

    /// Report a diagnostic without a fix-it.
    pub fn emit(&mut self, rule: DiagnosticRule, span: Span, message: impl Into<String>) {
        self.report(rule, span, message.into(), None);
    }

    /// Report a diagnostic suggesting `replacement` for `fix_span`.
    pub fn emit_with_fix(
        &mut self,
        rule: DiagnosticRule,
        span: Span,
        message: impl Into<String>,
        fix_span: Span,
        replacement: impl Into<String>,
    ) {
        let fix_it = FixIt {
            span: fix_span,
            replacement: replacement.into(),
        };
        self.report(rule, span, message.into(), Some(fix_it));
    }

    fn report(&mut self, rule: DiagnosticRule, span: Span, message: String, fix_it: Option<FixIt>) {
        let Some(severity) = self.rules.severity(rule) else {
            tracing::trace!(rule = %rule, "rule is off, dropping diagnostic");
            return;
        };
        self.sink.report(Diagnostic {
            rule,
            severity,
            message,
            file: self.file.to_string(),
            span,
            fix_it,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_uses_default_severity() {
        let rules = RuleSet::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let mut emitter = Emitter::new(&rules, "ext.c", &mut sink);
        emitter.emit(DiagnosticRule::ArgumentCount, Span::at(3, 5), "count");
        emitter.emit_with_fix(
            DiagnosticRule::PreferredIdiom,
            Span::at(4, 5),
            "idiom",
            Span::range(4, 5, 4, 20),
            "mrb_intern_lit",
        );

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].severity, Severity::Error);
        assert_eq!(sink[0].file, "ext.c");
        assert!(sink[0].fix_it.is_none());
        assert_eq!(sink[1].severity, Severity::Warning);
        assert_eq!(sink[1].fix_it.as_ref().unwrap().replacement, "mrb_intern_lit");
    }

    #[test]
    fn test_rule_overrides() {
        let mut rules = RuleSet::new();
        rules.set(DiagnosticRule::ArgumentType, RuleSetting::Off);
        rules.set(DiagnosticRule::PreferredIdiom, RuleSetting::Error);

        let mut sink: Vec<Diagnostic> = Vec::new();
        let mut emitter = Emitter::new(&rules, "ext.c", &mut sink);
        emitter.emit(DiagnosticRule::ArgumentType, Span::at(1, 1), "dropped");
        emitter.emit(DiagnosticRule::PreferredIdiom, Span::at(2, 1), "kept");

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].message, "kept");
        assert_eq!(sink[0].severity, Severity::Error);
    }
}
