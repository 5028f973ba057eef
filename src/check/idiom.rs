//! Recommends literal-specialized entry points when a string literal is
//! passed to their general counterpart.

use crate::host::{CallExpression, Expression};

use super::classify::CallSite;
use super::emitter::Emitter;
use super::entry_points::ContractKind;
use super::DiagnosticRule;

pub fn check_preferred_idiom<C: CallExpression>(site: &CallSite<'_, C>, emitter: &mut Emitter<'_>) {
    let (literal_arg, replacement, purpose) = match &site.spec.kind {
        ContractKind::PreferSymbolLiteral {
            literal_arg,
            replacement,
        } => (*literal_arg, replacement, "getting symbol from string literal"),
        ContractKind::PreferStringLiteral {
            literal_arg,
            replacement,
        } => (*literal_arg, replacement, "creating string object from literal"),
        _ => return,
    };

    let is_literal = site
        .arg(literal_arg)
        .map(|a| a.string_literal().is_some())
        .unwrap_or(false);
    if !is_literal {
        return;
    }

    emitter.emit_with_fix(
        DiagnosticRule::PreferredIdiom,
        site.span(),
        format!("`{}` is preferred when {}.", replacement, purpose),
        site.callee_span(),
        replacement.to_string(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::classify::classify;
    use crate::check::emitter::RuleSet;
    use crate::check::entry_points::EntryPointTable;
    use crate::check::{Diagnostic, Severity};
    use crate::host::{CallFacts, ExprFacts, Span};

    fn run(call: &CallFacts) -> Vec<Diagnostic> {
        let table = EntryPointTable::builtin();
        let rules = RuleSet::new();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let site = classify(&table, call).unwrap();
        let mut emitter = Emitter::new(&rules, "test.c", &mut sink);
        check_preferred_idiom(&site, &mut emitter);
        sink
    }

    fn call(callee: &str, arg: ExprFacts) -> CallFacts {
        let mut call = CallFacts::new(
            callee,
            vec![ExprFacts::pointer_to("mrb_state", Span::at(5, 19)), arg],
            Span::at(5, 3),
        );
        if let Some(c) = call.callee.as_mut() {
            c.span = Some(Span::range(5, 3, 5, 18));
        }
        call
    }

    #[test]
    fn test_intern_cstr_with_literal() {
        let diags = run(&call(
            "mrb_intern_cstr",
            ExprFacts::string_literal("test", Span::at(5, 22)),
        ));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(
            diags[0].message,
            "`mrb_intern_lit` is preferred when getting symbol from string literal."
        );
        let fix = diags[0].fix_it.as_ref().unwrap();
        assert_eq!(fix.replacement, "mrb_intern_lit");
        assert_eq!(fix.span, Span::range(5, 3, 5, 18));
    }

    #[test]
    fn test_str_new_cstr_with_literal() {
        let diags = run(&call(
            "mrb_str_new_cstr",
            ExprFacts::string_literal("test", Span::at(5, 22)),
        ));
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "`mrb_str_new_lit` is preferred when creating string object from literal."
        );
    }

    #[test]
    fn test_computed_strings_are_fine() {
        let var = ExprFacts::pointer_to("const char", Span::at(5, 22)).with_text("str");
        assert!(run(&call("mrb_intern_cstr", var.clone())).is_empty());
        assert!(run(&call("mrb_str_new_cstr", var)).is_empty());
    }
}
