//! Host frontend interface and the fact-file frontend.
//!
//! The checks in [`crate::check`] never look at C source. They consume a
//! small set of static facts about each call expression through the
//! [`CallExpression`] and [`Expression`] traits. This module defines those
//! traits and one implementation of them: fact files dumped by a compiler
//! plugin as YAML or JSON.
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Compiler plugin │────▶│ Fact files   │────▶│ FactFile      │
//! └─────────────────┘     │ (.yaml/.json)│     │ (CallFacts,   │
//!                         └──────────────┘     │  ExprFacts)   │
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                                              ┌───────────────┐
//!                                              │ check::Checker│
//!                                              └───────────────┘
//! ```

mod facts;
mod loader;
mod traits;

pub use facts::{CallFacts, CalleeFacts, ExprFacts, FactFile, Literal, Span};
pub use loader::{collect_fact_files, load_fact_file, FACT_FILE_EXTENSIONS};
pub use traits::{CallExpression, Callee, Expression};
