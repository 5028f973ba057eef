//! Per-call dispatch from a matched entry point to its checks.

use crate::config::Config;
use crate::host::CallExpression;

use super::arity::check_variadic_values;
use super::classify::classify;
use super::emitter::{DiagnosticSink, Emitter, RuleSet};
use super::entry_points::{ContractKind, EntryPointTable};
use super::idiom::check_preferred_idiom;
use super::matcher::check_get_args;
use super::{CheckResult, Diagnostic};

/// Checks call expressions against the watched entry points.
///
/// Holds the entry-point table and rule severities, both fixed at
/// construction and shared read-only by every check.
#[derive(Debug, Clone, Default)]
pub struct Checker {
    table: EntryPointTable,
    rules: RuleSet,
}

impl Checker {
    /// Build a checker from a validated configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            table: EntryPointTable::with_extra(&config.entry_points),
            rules: config.rule_set(),
        }
    }

    /// Check one call, reporting into `emitter`.
    ///
    /// Returns whether the call matched a watched entry point.
    pub fn check_call<C: CallExpression>(&self, call: &C, emitter: &mut Emitter<'_>) -> bool {
        let Some(site) = classify(&self.table, call) else {
            return false;
        };
        tracing::trace!(
            callee = site.name(),
            kind = site.spec.kind.as_str(),
            line = site.span().line,
            "checking call"
        );

        match &site.spec.kind {
            ContractKind::GetArgs { .. } => check_get_args(&site, emitter),
            ContractKind::ExplicitCountFuncall { .. } | ContractKind::MessageTemplate => {
                check_variadic_values(&site, emitter)
            }
            ContractKind::PreferSymbolLiteral { .. } | ContractKind::PreferStringLiteral { .. } => {
                check_preferred_idiom(&site, emitter)
            }
        }
        true
    }

    /// Check every call of one translation unit, in order.
    pub fn check_calls<C: CallExpression>(&self, file: &str, calls: &[C]) -> CheckResult {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut calls_checked = 0;
        {
            let sink: &mut dyn DiagnosticSink = &mut diagnostics;
            let mut emitter = Emitter::new(&self.rules, file, sink);
            for call in calls {
                if self.check_call(call, &mut emitter) {
                    calls_checked += 1;
                }
            }
        }

        CheckResult {
            diagnostics,
            scanned: 1,
            calls_checked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{DiagnosticRule, Severity};
    use crate::config::RuleSetting;
    use crate::host::{CallFacts, CalleeFacts, ExprFacts, Span};
    use std::borrow::Cow;
    use std::collections::BTreeMap;

    fn state() -> ExprFacts {
        ExprFacts::pointer_to("mrb_state", Span::at(1, 10))
    }

    #[test]
    fn test_dispatch_and_counts() {
        let calls = vec![
            CallFacts::new(
                "mrb_get_args",
                vec![
                    state(),
                    ExprFacts::string_literal("o", Span::at(1, 13)),
                    ExprFacts::pointer_to("mrb_value", Span::at(1, 18)),
                ],
                Span::at(1, 1),
            ),
            CallFacts::new("printf", vec![], Span::at(2, 1)),
            CallFacts {
                callee: None,
                args: vec![],
                span: Span::at(3, 1),
            },
            CallFacts::new(
                "mrb_intern_cstr",
                vec![state(), ExprFacts::string_literal("x", Span::at(4, 20))],
                Span::at(4, 1),
            ),
        ];
        let result = Checker::default().check_calls("unit.c", &calls);
        assert_eq!(result.calls_checked, 2);
        assert_eq!(result.scanned, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, DiagnosticRule::PreferredIdiom);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_idiom_entry_point_skips_contract_checks() {
        // A trailing non-value argument would trip the value check if the
        // idiom linter didn't own this call.
        let calls = vec![CallFacts::new(
            "mrb_intern_cstr",
            vec![
                state(),
                ExprFacts::string_literal("x", Span::at(1, 20)),
                ExprFacts::value("int", Span::at(1, 25)),
            ],
            Span::at(1, 1),
        )];
        let result = Checker::default().check_calls("unit.c", &calls);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, DiagnosticRule::PreferredIdiom);
    }

    #[test]
    fn test_config_rows_and_rules() {
        let mut rules = BTreeMap::new();
        rules.insert("preferred_idiom".to_string(), RuleSetting::Error);
        let config = Config {
            rules,
            entry_points: vec![crate::check::EntryPointSpec {
                name: Cow::Owned("ext_raisef".to_string()),
                fixed_params: 2,
                kind: ContractKind::MessageTemplate,
            }],
            ..Default::default()
        };
        let checker = Checker::new(&config);

        let calls = vec![
            CallFacts {
                callee: Some(CalleeFacts::extern_c("ext_raisef")),
                args: vec![state(), ExprFacts::string_literal("%S", Span::at(1, 13))],
                span: Span::at(1, 1),
            },
            CallFacts::new(
                "mrb_str_new_cstr",
                vec![state(), ExprFacts::string_literal("x", Span::at(2, 20))],
                Span::at(2, 1),
            ),
        ];
        let result = checker.check_calls("unit.c", &calls);
        let rules: Vec<_> = result.diagnostics.iter().map(|d| d.rule).collect();
        assert_eq!(
            rules,
            vec![DiagnosticRule::ArgumentCount, DiagnosticRule::PreferredIdiom]
        );
        assert_eq!(result.diagnostics[1].severity, Severity::Error);
    }
}
