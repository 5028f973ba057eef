//! The table of watched mruby C API entry points.
//!
//! Each row names a variadic (or literal-sensitive) function and the
//! contract its call sites are checked against. Adding a watched entry
//! point means adding a row here or in the configuration file.

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// The boxed value type every untyped variadic argument must have.
pub const BOXED_VALUE_TYPE: &str = "mrb_value";

/// The placeholder counted in message templates.
pub const PLACEHOLDER_TOKEN: &str = "%S";

/// How a call's trailing arguments are checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContractKind {
    /// A descriptor string literal describes pointer arguments.
    GetArgs {
        #[serde(default = "default_literal_arg")]
        format_arg: usize,
    },
    /// An integer argument states how many `mrb_value`s follow.
    ExplicitCountFuncall { count_arg: usize },
    /// The last fixed argument is a template; each placeholder takes one `mrb_value`.
    MessageTemplate,
    /// A string literal argument should use the symbol-literal entry point.
    PreferSymbolLiteral {
        #[serde(default = "default_literal_arg")]
        literal_arg: usize,
        replacement: Cow<'static, str>,
    },
    /// A string literal argument should use the string-literal entry point.
    PreferStringLiteral {
        #[serde(default = "default_literal_arg")]
        literal_arg: usize,
        replacement: Cow<'static, str>,
    },
}

fn default_literal_arg() -> usize {
    1
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::GetArgs { .. } => "get_args",
            ContractKind::ExplicitCountFuncall { .. } => "explicit_count_funcall",
            ContractKind::MessageTemplate => "message_template",
            ContractKind::PreferSymbolLiteral { .. } => "prefer_symbol_literal",
            ContractKind::PreferStringLiteral { .. } => "prefer_string_literal",
        }
    }

    /// The fixed argument position this contract reads, if any.
    pub fn argument_index(&self, fixed_params: usize) -> Option<usize> {
        match self {
            ContractKind::GetArgs { format_arg } => Some(*format_arg),
            ContractKind::ExplicitCountFuncall { count_arg } => Some(*count_arg),
            ContractKind::MessageTemplate => fixed_params.checked_sub(1),
            ContractKind::PreferSymbolLiteral { literal_arg, .. }
            | ContractKind::PreferStringLiteral { literal_arg, .. } => Some(*literal_arg),
        }
    }
}

/// One watched entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointSpec {
    pub name: Cow<'static, str>,
    /// Number of non-variadic parameters preceding the trailing arguments.
    pub fixed_params: usize,
    #[serde(flatten)]
    pub kind: ContractKind,
}

static BUILTIN_ENTRY_POINTS: phf::Map<&'static str, EntryPointSpec> = phf_map! {
    "mrb_get_args" => EntryPointSpec {
        name: Cow::Borrowed("mrb_get_args"),
        fixed_params: 2,
        kind: ContractKind::GetArgs { format_arg: 1 },
    },
    "mrb_funcall" => EntryPointSpec {
        name: Cow::Borrowed("mrb_funcall"),
        fixed_params: 4,
        kind: ContractKind::ExplicitCountFuncall { count_arg: 3 },
    },
    "mrb_funcall_id" => EntryPointSpec {
        name: Cow::Borrowed("mrb_funcall_id"),
        fixed_params: 4,
        kind: ContractKind::ExplicitCountFuncall { count_arg: 3 },
    },
    "mrb_raisef" => EntryPointSpec {
        name: Cow::Borrowed("mrb_raisef"),
        fixed_params: 3,
        kind: ContractKind::MessageTemplate,
    },
    "mrb_name_error" => EntryPointSpec {
        name: Cow::Borrowed("mrb_name_error"),
        fixed_params: 3,
        kind: ContractKind::MessageTemplate,
    },
    "mrb_no_method_error" => EntryPointSpec {
        name: Cow::Borrowed("mrb_no_method_error"),
        fixed_params: 4,
        kind: ContractKind::MessageTemplate,
    },
    "mrb_warn" => EntryPointSpec {
        name: Cow::Borrowed("mrb_warn"),
        fixed_params: 2,
        kind: ContractKind::MessageTemplate,
    },
    "mrb_bug" => EntryPointSpec {
        name: Cow::Borrowed("mrb_bug"),
        fixed_params: 2,
        kind: ContractKind::MessageTemplate,
    },
    "mrb_format" => EntryPointSpec {
        name: Cow::Borrowed("mrb_format"),
        fixed_params: 2,
        kind: ContractKind::MessageTemplate,
    },
    "mrb_intern_cstr" => EntryPointSpec {
        name: Cow::Borrowed("mrb_intern_cstr"),
        fixed_params: 2,
        kind: ContractKind::PreferSymbolLiteral {
            literal_arg: 1,
            replacement: Cow::Borrowed("mrb_intern_lit"),
        },
    },
    "mrb_str_new_cstr" => EntryPointSpec {
        name: Cow::Borrowed("mrb_str_new_cstr"),
        fixed_params: 2,
        kind: ContractKind::PreferStringLiteral {
            literal_arg: 1,
            replacement: Cow::Borrowed("mrb_str_new_lit"),
        },
    },
};

/// Returns the built-in row for `name`, if any.
pub fn builtin(name: &str) -> Option<&'static EntryPointSpec> {
    BUILTIN_ENTRY_POINTS.get(name)
}

/// Names of all built-in entry points, sorted.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTIN_ENTRY_POINTS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Lookup table from callee name to its contract.
///
/// Built once per checker and read-only afterwards.
#[derive(Debug, Clone)]
pub struct EntryPointTable {
    entries: HashMap<String, EntryPointSpec>,
}

impl EntryPointTable {
    /// The built-in rows only.
    pub fn builtin() -> Self {
        let entries = BUILTIN_ENTRY_POINTS
            .entries()
            .map(|(name, spec)| (name.to_string(), spec.clone()))
            .collect();
        Self { entries }
    }

    /// The built-in rows plus `extra`, where a row in `extra` replaces a
    /// built-in row of the same name.
    pub fn with_extra(extra: &[EntryPointSpec]) -> Self {
        let mut table = Self::builtin();
        for spec in extra {
            table.entries.insert(spec.name.to_string(), spec.clone());
        }
        table
    }

    pub fn get(&self, name: &str) -> Option<&EntryPointSpec> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EntryPointTable {
    fn default() -> Self {
        Self::builtin()
    }
}
