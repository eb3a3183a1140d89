// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # Strata Statement Compiler
//!
//! Turns a parsed Strata statement into an ordered, contradiction-free gadget
//! sequence for a downstream circuit generator.
//!
//! ## Architecture
//!
//! ```text
//! StatementTree (strata-ast)
//!     ↓
//! visitor    - subject resolution, predicate → gadget construction
//!     ↓
//! optimizer  - implications, contradictions, substitutions to a fixpoint
//!     ↓
//! compile    - validation rules, premises, proven-gadget removal
//!     ↓
//! codegen    - textual IR with witness/instance slot tables
//! ```
//!
//! Witness values never leave the [`data`] layer through diagnostics or IR
//! text; they are only reachable through the witness slot table.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strata_compiler::{compile, codegen, CompileArgs, JsonAccessor};
//!
//! let args = CompileArgs::builder("age", tree)
//!     .witness("pass", JsonAccessor::new(passport))
//!     .build();
//!
//! match compile(&args) {
//!     Ok(compilation) => println!("{}", codegen::render(&compilation.statement).text),
//!     Err(failure) => eprintln!("{}", failure.format()),
//! }
//! ```

pub mod codegen;
pub mod compile;
pub mod data;
pub mod error;
pub mod gadgets;
pub mod optimizer;
pub mod statement;
pub mod visitor;

pub use compile::{compile, CompileArgs, CompileArgsBuilder, CompileFailure, Compilation};
pub use data::{
    AccessError, Classification, DataType, FieldType, JsonAccessor, Literal, Reference, Schema,
    SharedAccessor, Subject, ValueAccessor, Variable,
};
pub use error::{CompileError, CompileResult, DiagnosticFormatter, Diagnostics, ErrorKind, Severity};
pub use gadgets::{AnyGadget, Gadget, GadgetKind};
pub use optimizer::{Optimizer, OptimizerConfig};
pub use statement::Statement;
pub use visitor::{DataContext, StatementVisitor};

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
