//! Compiler for `mrb_get_args` descriptor strings.
//!
//! A descriptor such as `"oz|i"` is compiled, left to right, into the
//! ordered list of pointer arguments the call must supply. Each code maps
//! to one slot, or to two for pair codes like `s` (buffer and length).
//!
//! ```text
//!            value/pair code, '!'          value/pair code, '!', '?'
//!               ┌────────┐                      ┌────────┐
//!               ▼        │          '|'         ▼        │
//!   ──▶ ┌──────────┐─────┘ ─────────────▶ ┌──────────┐───┘
//!       │ Required │                      │ Optional │
//!       └──────────┘                      └──────────┘
//!            │ '?', unknown                    │ '|', unknown
//!            ▼                                 ▼
//!       ┌──────────────────────────────────────────┐
//!       │ Halted (FormatError)                     │
//!       └──────────────────────────────────────────┘
//! ```

use phf::phf_map;
use thiserror::Error;

use crate::host::Expression;

/// Type expected behind the pointer filling a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// Exactly this spelling.
    Exact(&'static str),
    /// Any of these spellings; the first is the canonical one.
    OneOf(&'static [&'static str]),
    /// Any pointer type, displayed as the given label.
    AnyPointer(&'static str),
}

impl ExpectedType {
    /// The spelling shown in messages and fix-its.
    pub fn label(&self) -> &'static str {
        match self {
            ExpectedType::Exact(name) => name,
            ExpectedType::OneOf(names) => names.first().copied().unwrap_or(""),
            ExpectedType::AnyPointer(label) => label,
        }
    }

    /// Spelling of a pointer to the expected type, as written at the call.
    pub fn pointer_label(&self) -> String {
        let label = self.label();
        if label.ends_with('*') {
            format!("{}*", label)
        } else {
            format!("{} *", label)
        }
    }

    /// Whether the pointee of `arg` satisfies this expectation.
    pub fn accepts<E: Expression>(&self, arg: &E) -> bool {
        match self {
            ExpectedType::Exact(name) => arg.pointee_type_name() == Some(*name),
            ExpectedType::OneOf(names) => arg
                .pointee_type_name()
                .map(|t| names.contains(&t))
                .unwrap_or(false),
            ExpectedType::AnyPointer(_) => arg.pointee_is_pointer(),
        }
    }
}

const MRB_VALUE: ExpectedType = ExpectedType::Exact("mrb_value");
const MRB_BOOL: ExpectedType = ExpectedType::Exact("mrb_bool");
const MRB_FLOAT: ExpectedType = ExpectedType::Exact("mrb_float");
const MRB_INT: ExpectedType = ExpectedType::Exact("mrb_int");
const MRB_SYM: ExpectedType = ExpectedType::Exact("mrb_sym");
const MRB_VALUE_PTR: ExpectedType = ExpectedType::Exact("mrb_value *");
const C_STRING: ExpectedType = ExpectedType::OneOf(&["char *", "const char *"]);
const DATA_PTR: ExpectedType = ExpectedType::AnyPointer("void *");
const DATA_TYPE: ExpectedType =
    ExpectedType::OneOf(&["struct mrb_data_type", "const struct mrb_data_type"]);

/// Classification of one descriptor character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatToken {
    /// Fills one slot.
    Value(ExpectedType),
    /// Fills two consecutive slots.
    Pair(ExpectedType, ExpectedType),
    /// `|`: every following slot is optional.
    OptionalMarker,
    /// `?`: a boolean slot, only legal after `|`.
    PostOptional,
    /// `!`: skip the type check of the preceding code.
    SkipModifier,
    /// Outside the vocabulary.
    Invalid(char),
}

/// Codes `!` may follow, in the order messages list them.
const SKIPPABLE_CODES: &[char] = &['S', 'A', 'H', 'z', '&', 'a', 's', '*'];

static FORMAT_CODES: phf::Map<char, FormatToken> = phf_map! {
    'o' => FormatToken::Value(MRB_VALUE),
    'C' => FormatToken::Value(MRB_VALUE),
    'S' => FormatToken::Value(MRB_VALUE),
    'A' => FormatToken::Value(MRB_VALUE),
    'H' => FormatToken::Value(MRB_VALUE),
    '&' => FormatToken::Value(MRB_VALUE),
    'b' => FormatToken::Value(MRB_BOOL),
    'z' => FormatToken::Value(C_STRING),
    'f' => FormatToken::Value(MRB_FLOAT),
    'i' => FormatToken::Value(MRB_INT),
    'n' => FormatToken::Value(MRB_SYM),
    'd' => FormatToken::Pair(DATA_PTR, DATA_TYPE),
    '*' => FormatToken::Pair(MRB_VALUE_PTR, MRB_INT),
    's' => FormatToken::Pair(C_STRING, MRB_INT),
    'a' => FormatToken::Pair(MRB_VALUE_PTR, MRB_INT),
    '?' => FormatToken::PostOptional,
    '|' => FormatToken::OptionalMarker,
    '!' => FormatToken::SkipModifier,
};

/// Classify one descriptor character.
pub fn tokenize(c: char) -> FormatToken {
    FORMAT_CODES
        .get(&c)
        .copied()
        .unwrap_or(FormatToken::Invalid(c))
}

/// Codes `!` may follow.
pub fn skippable_codes() -> &'static [char] {
    SKIPPABLE_CODES
}

/// Where a slot sits relative to its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPosition {
    Single,
    PairFirst,
    PairSecond,
}

impl SlotPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotPosition::Single => "single",
            SlotPosition::PairFirst => "pair (1st)",
            SlotPosition::PairSecond => "pair (2nd)",
        }
    }
}

/// One expected trailing argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSlot {
    /// The descriptor code that produced this slot.
    pub code: char,
    pub expected: ExpectedType,
    pub position: SlotPosition,
    /// Whether the slot lies right of `|`.
    pub optional: bool,
    /// Set by `!`; the pointee type comparison is bypassed.
    pub skip_type_check: bool,
}

/// A successfully compiled descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFormat {
    pub slots: Vec<ArgumentSlot>,
    /// Character offsets of `!` modifiers that follow no eligible code.
    pub misplaced_skips: Vec<usize>,
}

impl CompiledFormat {
    /// Number of trailing arguments the descriptor requires.
    pub fn required_args(&self) -> usize {
        self.slots.len()
    }
}

/// Descriptor syntax failures. Compilation stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid format specifier: '{0}'")]
    InvalidSpecifier(char),
    #[error("'?' format specifier must come after '|' format specifier.")]
    OptionalOrdering,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Required,
    Optional,
}

/// Compile a descriptor into its ordered slot list.
pub fn compile(descriptor: &str) -> Result<CompiledFormat, FormatError> {
    let mut compiled = CompiledFormat::default();
    let mut state = State::Required;
    // Slots of the code immediately before the cursor, and whether `!` may modify them.
    let mut previous: Option<(usize, bool)> = None;

    for (offset, c) in descriptor.chars().enumerate() {
        let optional = state == State::Optional;
        let start = compiled.slots.len();

        match tokenize(c) {
            FormatToken::Value(expected) => {
                compiled.slots.push(ArgumentSlot {
                    code: c,
                    expected,
                    position: SlotPosition::Single,
                    optional,
                    skip_type_check: false,
                });
                previous = Some((start, is_skippable(c)));
            }
            FormatToken::Pair(first, second) => {
                for (expected, position) in [
                    (first, SlotPosition::PairFirst),
                    (second, SlotPosition::PairSecond),
                ] {
                    compiled.slots.push(ArgumentSlot {
                        code: c,
                        expected,
                        position,
                        optional,
                        skip_type_check: false,
                    });
                }
                previous = Some((start, is_skippable(c)));
            }
            FormatToken::PostOptional => {
                if state != State::Optional {
                    return Err(FormatError::OptionalOrdering);
                }
                compiled.slots.push(ArgumentSlot {
                    code: c,
                    expected: MRB_BOOL,
                    position: SlotPosition::Single,
                    optional,
                    skip_type_check: false,
                });
                previous = Some((start, false));
            }
            FormatToken::OptionalMarker => {
                if state == State::Optional {
                    return Err(FormatError::InvalidSpecifier(c));
                }
                state = State::Optional;
                previous = None;
            }
            FormatToken::SkipModifier => {
                match previous {
                    Some((first_slot, true)) => {
                        for slot in &mut compiled.slots[first_slot..] {
                            slot.skip_type_check = true;
                        }
                    }
                    _ => compiled.misplaced_skips.push(offset),
                }
                previous = None;
            }
            FormatToken::Invalid(c) => return Err(FormatError::InvalidSpecifier(c)),
        }
    }

    Ok(compiled)
}

fn is_skippable(c: char) -> bool {
    SKIPPABLE_CODES.contains(&c)
}
