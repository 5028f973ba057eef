//! Contract checks for variadic mruby C API call sites.

mod arity;
mod checker;
mod classify;
mod emitter;
mod entry_points;
mod format_spec;
mod idiom;
mod matcher;
mod runner;
mod types;

pub use arity::{argument_count_message, check_variadic_values, count_placeholders};
pub use checker::Checker;
pub use classify::{classify, CallSite};
pub use emitter::{DiagnosticSink, Emitter, RuleSet};
pub use entry_points::{
    builtin, builtin_names, ContractKind, EntryPointSpec, EntryPointTable, BOXED_VALUE_TYPE,
    PLACEHOLDER_TOKEN,
};
pub use format_spec::{
    compile, skippable_codes, tokenize, ArgumentSlot, CompiledFormat, ExpectedType, FormatError,
    FormatToken, SlotPosition,
};
pub use idiom::check_preferred_idiom;
pub use matcher::{check_get_args, match_slots};
pub use runner::Runner;
pub use types::{CheckResult, Diagnostic, DiagnosticRule, FixIt, Severity};
