//! `mrb_get_args` checking: descriptor compilation, arity, and the
//! slot-by-slot walk over the call's pointer arguments.

use crate::host::{CallExpression, Expression};

use super::arity::argument_count_message;
use super::classify::CallSite;
use super::emitter::Emitter;
use super::entry_points::ContractKind;
use super::format_spec::{self, skippable_codes, ArgumentSlot, FormatError};
use super::DiagnosticRule;

/// Check a call whose trailing arguments are described by a descriptor.
///
/// A non-literal descriptor is skipped. A syntax failure reports one
/// diagnostic and nothing else for the call; so does a count mismatch.
pub fn check_get_args<C: CallExpression>(site: &CallSite<'_, C>, emitter: &mut Emitter<'_>) {
    let ContractKind::GetArgs { format_arg } = &site.spec.kind else {
        return;
    };
    let Some(descriptor_arg) = site.arg(*format_arg) else {
        return;
    };
    let Some(descriptor) = descriptor_arg.string_literal() else {
        tracing::trace!(callee = site.name(), "descriptor is not a literal, skipping");
        return;
    };

    let compiled = match format_spec::compile(descriptor) {
        Ok(compiled) => compiled,
        Err(err) => {
            let rule = match err {
                FormatError::InvalidSpecifier(_) => DiagnosticRule::InvalidFormatSpecifier,
                FormatError::OptionalOrdering => DiagnosticRule::OptionalOrdering,
            };
            emitter.emit(rule, descriptor_arg.span(), err.to_string());
            return;
        }
    };

    for _ in &compiled.misplaced_skips {
        emitter.emit(
            DiagnosticRule::MisplacedSkipModifier,
            descriptor_arg.span(),
            misplaced_skip_message(),
        );
    }

    let expected = compiled.required_args() + site.fixed_params;
    let actual = site.args().len();
    if expected != actual {
        emitter.emit(
            DiagnosticRule::ArgumentCount,
            site.span(),
            argument_count_message(expected, actual),
        );
        return;
    }

    match_slots(site.name(), &compiled.slots, site.trailing(), emitter);
}

fn misplaced_skip_message() -> String {
    let codes: Vec<String> = skippable_codes()
        .iter()
        .map(|c| format!("'{}'", c))
        .collect();
    format!(
        "'!' format specifier must follow one of {}.",
        codes.join(", ")
    )
}

/// Walk `slots` against `args` one-to-one.
///
/// Stops at the first argument that is not a pointer; type mismatches are
/// all collected. Callers guarantee the lengths agree.
pub fn match_slots<E: Expression>(
    callee: &str,
    slots: &[ArgumentSlot],
    args: &[E],
    emitter: &mut Emitter<'_>,
) {
    debug_assert_eq!(slots.len(), args.len());

    let mut cursor = 0;
    while cursor < slots.len() && cursor < args.len() {
        let slot = &slots[cursor];
        let arg = &args[cursor];
        cursor += 1;

        if !arg.is_pointer() {
            emitter.emit(
                DiagnosticRule::NonPointerArgument,
                arg.span(),
                format!("Variadic argument of `{}` must be a pointer.", callee),
            );
            return;
        }

        if slot.skip_type_check || slot.expected.accepts(arg) {
            continue;
        }

        emitter.emit_with_fix(
            DiagnosticRule::ArgumentType,
            arg.span(),
            format!(
                "Wrong argument passed to variadic mruby C API. Expected pointer of: {} ('{}'), found `{}`.",
                slot.expected.label(),
                slot.code,
                arg.type_name()
            ),
            arg.span(),
            slot.expected.pointer_label(),
        );
    }
}
