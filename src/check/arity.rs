//! Argument-count checks for entry points whose variadic count is
//! statically knowable, plus the `mrb_value` check on their trailing
//! arguments.

use std::fmt::Display;

use crate::host::{CallExpression, Expression};

use super::classify::CallSite;
use super::emitter::Emitter;
use super::entry_points::{ContractKind, BOXED_VALUE_TYPE, PLACEHOLDER_TOKEN};
use super::DiagnosticRule;

/// Message for a count mismatch. Both numbers include the fixed parameters.
pub fn argument_count_message(expected: impl Display, actual: usize) -> String {
    format!(
        "Wrong number of arguments passed to variadic mruby C API. Expected: {}, Actual: {}",
        expected, actual
    )
}

/// Count non-overlapping occurrences of the placeholder token.
pub fn count_placeholders(template: &str) -> usize {
    template.matches(PLACEHOLDER_TOKEN).count()
}

/// Check an explicit-count or message-template call.
///
/// The count check runs first and is skipped when the relevant argument
/// isn't a literal. Every trailing argument is then checked against
/// `mrb_value` regardless of the count outcome.
pub fn check_variadic_values<C: CallExpression>(site: &CallSite<'_, C>, emitter: &mut Emitter<'_>) {
    let actual = site.args().len();
    let fixed = site.fixed_params;

    match &site.spec.kind {
        ContractKind::ExplicitCountFuncall { count_arg } => {
            if let Some(count) = site.arg(*count_arg).and_then(|a| a.integer_literal()) {
                // A count too large to add to the fixed parameters can never match.
                let expected = i128::from(count) + fixed as i128;
                if expected != actual as i128 {
                    emitter.emit(
                        DiagnosticRule::ArgumentCount,
                        site.span(),
                        argument_count_message(expected, actual),
                    );
                }
            }
        }
        ContractKind::MessageTemplate => {
            let template = fixed
                .checked_sub(1)
                .and_then(|i| site.arg(i))
                .and_then(|a| a.string_literal());
            if let Some(template) = template {
                let expected = count_placeholders(template) + fixed;
                if expected != actual {
                    emitter.emit(
                        DiagnosticRule::ArgumentCount,
                        site.span(),
                        argument_count_message(expected, actual),
                    );
                }
            }
        }
        _ => return,
    }

    for arg in site.trailing() {
        if arg.type_name() != BOXED_VALUE_TYPE {
            emitter.emit_with_fix(
                DiagnosticRule::ArgumentType,
                arg.span(),
                format!(
                    "Wrong argument passed to variadic mruby C API. Expected `{}`, found `{}`.",
                    BOXED_VALUE_TYPE,
                    arg.type_name()
                ),
                arg.span(),
                BOXED_VALUE_TYPE,
            );
        }
    }
}
