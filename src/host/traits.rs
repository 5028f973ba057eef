//! The narrow interface the checks need from a compiler frontend.

use super::Span;

/// Static facts about one argument expression.
///
/// Type names are symbolic spellings (`mrb_value`, `const char *`) compared
/// by plain string equality; no type equivalence is computed.
pub trait Expression {
    /// Whether the expression's static type is a pointer type.
    fn is_pointer(&self) -> bool;

    /// Symbolic name of the expression's static type.
    fn type_name(&self) -> &str;

    /// Symbolic name of the pointee type, or `None` for non-pointers.
    fn pointee_type_name(&self) -> Option<&str>;

    /// Source location of the expression.
    fn span(&self) -> Span;

    /// The value of the expression iff it is spelled as a string literal.
    fn string_literal(&self) -> Option<&str>;

    /// The value of the expression iff it is spelled as an integer literal.
    fn integer_literal(&self) -> Option<i64>;

    /// Whether the pointee is itself a pointer (e.g. `void **`).
    fn pointee_is_pointer(&self) -> bool {
        self.pointee_type_name()
            .map(|t| t.trim_end().ends_with('*'))
            .unwrap_or(false)
    }
}

/// The resolved callee of a direct call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Callee<'a> {
    pub name: &'a str,
    /// Whether the declaration has C language linkage.
    pub extern_c: bool,
    /// Fixed parameter count from the declaration, when known.
    pub fixed_params: Option<usize>,
    /// Location of the callee name, used for fix-its that rename the call.
    pub span: Option<Span>,
}

/// Static facts about one call expression.
pub trait CallExpression {
    type Arg: Expression;

    /// The resolved callee declaration, or `None` for indirect calls.
    fn callee(&self) -> Option<Callee<'_>>;

    /// All actual arguments in order, fixed parameters included.
    fn args(&self) -> &[Self::Arg];

    /// Source location of the whole call.
    fn span(&self) -> Span;
}
