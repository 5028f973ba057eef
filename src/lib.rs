//! mrbcheck - static checker for variadic mruby C API calls.
//!
//! mruby's C API has several variadic functions whose argument contract
//! lives in a value rather than in the prototype: the `mrb_get_args`
//! descriptor string, the explicit count passed to `mrb_funcall`, and the
//! `%S` placeholders of `mrb_raisef`-style message templates. The C
//! compiler cannot see these contracts. mrbcheck can.
//!
//! # Architecture
//!
//! - `host`: call-site facts (types, literals, spans) loaded from YAML/JSON
//!   fact files dumped by a compiler frontend, behind the `CallExpression`
//!   and `Expression` traits
//! - `check`: entry point table, call classification, descriptor compiler,
//!   argument matcher, arity validator, idiom linter and diagnostic emitter
//! - `config`: rule severities, excluded paths and extra entry points
//! - `report`: output formatting (pretty, JSON, SARIF, clang)
//! - `cli`: the `check`, `explain` and `init` commands
//!
//! # Adding an Entry Point
//!
//! Wrappers around the watched functions can be listed under
//! `entry_points` in `mrbcheck.yaml` with one of the contract kinds in
//! [`check::ContractKind`].

pub mod check;
pub mod cli;
pub mod config;
pub mod host;
pub mod report;

pub use check::{
    compile, CheckResult, Checker, CompiledFormat, ContractKind, Diagnostic, DiagnosticRule,
    EntryPointSpec, EntryPointTable, FormatError, Runner, Severity,
};
pub use config::Config;
pub use host::{CallExpression, CallFacts, Expression, ExprFacts, FactFile};
