//! Serialized call-site facts produced by a compiler frontend.
//!
//! A frontend (typically a compiler plugin) dumps, for every call
//! expression in a translation unit, the handful of facts the checks need:
//! the resolved callee, the static type of each argument, and literal
//! values where an argument is spelled as a literal.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::traits::{CallExpression, Callee, Expression};

/// Source location span with line/column positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start line (1-indexed).
    pub line: usize,
    /// Start column (1-indexed).
    #[serde(default = "default_column")]
    pub column: usize,
    /// End line (1-indexed). Defaults to the start line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    /// End column (1-indexed, exclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

fn default_column() -> usize {
    1
}

impl Span {
    /// A span covering a single position.
    pub fn at(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// A span from `(line, column)` to `(end_line, end_column)`.
    pub fn range(line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            line,
            column,
            end_line: Some(end_line),
            end_column: Some(end_column),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Literal value of an argument that is spelled as a literal.
///
/// Written as a single-key map in fact files, `{ string: "o|i" }` or
/// `{ integer: 2 }`, in both YAML and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Literal {
    String(String),
    Integer(i64),
}

/// Facts about one argument expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExprFacts {
    /// Source text of the expression, used for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Symbolic name of the expression's static type (e.g. `mrb_value *`).
    #[serde(rename = "type")]
    pub ty: String,
    /// Symbolic name of the pointee type. Present iff the type is a pointer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointee: Option<String>,
    pub span: Span,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map"
    )]
    pub literal: Option<Literal>,
}

impl ExprFacts {
    /// A non-pointer expression of the given type.
    pub fn value(ty: &str, span: Span) -> Self {
        Self {
            text: None,
            ty: ty.to_string(),
            pointee: None,
            span,
            literal: None,
        }
    }

    /// A pointer expression whose pointee has the given type
    /// (e.g. `&v` where `v` is an `mrb_value`).
    pub fn pointer_to(pointee: &str, span: Span) -> Self {
        let ty = if pointee.ends_with('*') {
            format!("{}*", pointee)
        } else {
            format!("{} *", pointee)
        };
        Self {
            text: None,
            ty,
            pointee: Some(pointee.to_string()),
            span,
            literal: None,
        }
    }

    /// A string literal (`char[N]` decays to `char *`).
    pub fn string_literal(value: &str, span: Span) -> Self {
        Self {
            text: Some(format!("{:?}", value)),
            ty: "char *".to_string(),
            pointee: Some("char".to_string()),
            span,
            literal: Some(Literal::String(value.to_string())),
        }
    }

    /// An integer literal.
    pub fn integer_literal(value: i64, span: Span) -> Self {
        Self {
            text: Some(value.to_string()),
            ty: "int".to_string(),
            pointee: None,
            span,
            literal: Some(Literal::Integer(value)),
        }
    }

    /// Attach the source text of the expression.
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

impl Expression for ExprFacts {
    fn is_pointer(&self) -> bool {
        self.pointee.is_some()
    }

    fn type_name(&self) -> &str {
        &self.ty
    }

    fn pointee_type_name(&self) -> Option<&str> {
        self.pointee.as_deref()
    }

    fn span(&self) -> Span {
        self.span
    }

    fn string_literal(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::String(s)) => Some(s),
            _ => None,
        }
    }

    fn integer_literal(&self) -> Option<i64> {
        match self.literal {
            Some(Literal::Integer(n)) => Some(n),
            _ => None,
        }
    }
}

/// Facts about the resolved callee declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalleeFacts {
    pub name: String,
    /// Whether the declaration has C language linkage.
    #[serde(default = "default_extern_c")]
    pub extern_c: bool,
    /// Number of fixed parameters in the declaration, if the frontend knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<usize>,
    /// Location of the callee name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

fn default_extern_c() -> bool {
    true
}

impl CalleeFacts {
    /// An extern "C" callee with unknown parameter count.
    pub fn extern_c(name: &str) -> Self {
        Self {
            name: name.to_string(),
            extern_c: true,
            params: None,
            span: None,
        }
    }
}

/// Facts about one call expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFacts {
    /// The resolved callee; absent for indirect calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee: Option<CalleeFacts>,
    #[serde(default)]
    pub args: Vec<ExprFacts>,
    pub span: Span,
}

impl CallFacts {
    /// A direct call to an extern "C" function.
    pub fn new(callee: &str, args: Vec<ExprFacts>, span: Span) -> Self {
        Self {
            callee: Some(CalleeFacts::extern_c(callee)),
            args,
            span,
        }
    }
}

impl CallExpression for CallFacts {
    type Arg = ExprFacts;

    fn callee(&self) -> Option<Callee<'_>> {
        self.callee.as_ref().map(|c| Callee {
            name: &c.name,
            extern_c: c.extern_c,
            fixed_params: c.params,
            span: c.span,
        })
    }

    fn args(&self) -> &[ExprFacts] {
        &self.args
    }

    fn span(&self) -> Span {
        self.span
    }
}

/// All call facts for one translation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactFile {
    /// The source file the facts were extracted from.
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub calls: Vec<CallFacts>,
}
