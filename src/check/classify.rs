//! Decides whether a call is one of the watched entry points.

use crate::host::{CallExpression, Span};

use super::entry_points::{EntryPointSpec, EntryPointTable};

/// A call matched to a watched entry point.
///
/// Built fresh per visited call and dropped once that call is checked.
pub struct CallSite<'a, C: CallExpression> {
    pub spec: &'a EntryPointSpec,
    pub call: &'a C,
    /// Fixed-parameter boundary: the declaration's count when the frontend
    /// reports one, otherwise the table's.
    pub fixed_params: usize,
}

impl<'a, C: CallExpression> CallSite<'a, C> {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// All actual arguments, fixed parameters included.
    pub fn args(&self) -> &'a [C::Arg] {
        self.call.args()
    }

    /// The argument at `index`, if the call has that many.
    pub fn arg(&self, index: usize) -> Option<&'a C::Arg> {
        self.call.args().get(index)
    }

    /// The trailing (variadic) arguments after the fixed parameters.
    pub fn trailing(&self) -> &'a [C::Arg] {
        self.call.args().get(self.fixed_params..).unwrap_or(&[])
    }

    pub fn span(&self) -> Span {
        self.call.span()
    }

    /// Location of the callee name, falling back to the call.
    pub fn callee_span(&self) -> Span {
        self.call
            .callee()
            .and_then(|c| c.span)
            .unwrap_or_else(|| self.call.span())
    }
}

/// Match `call` against the table.
///
/// Indirect calls, callees without C linkage, and unknown names are not
/// applicable and yield `None`.
pub fn classify<'a, C: CallExpression>(
    table: &'a EntryPointTable,
    call: &'a C,
) -> Option<CallSite<'a, C>> {
    let callee = call.callee()?;
    if !callee.extern_c {
        return None;
    }
    let spec = table.get(callee.name)?;
    Some(CallSite {
        spec,
        call,
        fixed_params: callee.fixed_params.unwrap_or(spec.fixed_params),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CallFacts, CalleeFacts, ExprFacts};

    fn call(callee: Option<CalleeFacts>, argc: usize) -> CallFacts {
        let args = (0..argc)
            .map(|i| ExprFacts::value("mrb_value", Span::at(1, i + 1)))
            .collect();
        CallFacts {
            callee,
            args,
            span: Span::at(1, 1),
        }
    }

    #[test]
    fn test_classify_known_extern_c() {
        let table = EntryPointTable::builtin();
        let c = call(Some(CalleeFacts::extern_c("mrb_funcall")), 6);
        let site = classify(&table, &c).unwrap();
        assert_eq!(site.name(), "mrb_funcall");
        assert_eq!(site.fixed_params, 4);
        assert_eq!(site.trailing().len(), 2);
    }

    #[test]
    fn test_classify_ignores_indirect_and_unknown() {
        let table = EntryPointTable::builtin();
        assert!(classify(&table, &call(None, 2)).is_none());
        assert!(classify(&table, &call(Some(CalleeFacts::extern_c("printf")), 2)).is_none());
    }

    #[test]
    fn test_classify_requires_c_linkage() {
        let table = EntryPointTable::builtin();
        let mut callee = CalleeFacts::extern_c("mrb_get_args");
        callee.extern_c = false;
        assert!(classify(&table, &call(Some(callee), 2)).is_none());
    }

    #[test]
    fn test_declared_params_override_table() {
        let table = EntryPointTable::builtin();
        let mut callee = CalleeFacts::extern_c("mrb_no_method_error");
        callee.params = Some(5);
        let c = call(Some(callee), 5);
        let site = classify(&table, &c).unwrap();
        assert_eq!(site.fixed_params, 5);
        assert!(site.trailing().is_empty());
    }

    #[test]
    fn test_short_call_has_no_trailing() {
        let table = EntryPointTable::builtin();
        let c = call(Some(CalleeFacts::extern_c("mrb_funcall")), 2);
        let site = classify(&table, &c).unwrap();
        assert!(site.trailing().is_empty());
        assert!(site.arg(3).is_none());
    }
}
