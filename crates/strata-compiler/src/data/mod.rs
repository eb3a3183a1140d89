//! Variable and value model, plus structured data resolution.
//!
//! # Pipeline Position
//!
//! ```text
//! Syntax → Visitor → [Subject::get_variable] → Variable → Gadgets → Optimizer
//! ```
//!
//! Subjects bind an alias to a [`Schema`] and a [`ValueAccessor`]; resolving an
//! identifier against a subject yields a [`Variable`] carrying the literal, the
//! position it was written at and a [`Reference`] for diagnostics.

pub mod accessor;
pub mod schema;
pub mod subject;
pub mod value;
pub mod variable;

pub use accessor::{AccessError, JsonAccessor, SchemaAccessor, SharedAccessor, ValueAccessor};
pub use schema::{FieldType, Schema};
pub use subject::Subject;
pub use value::{DataType, Literal, LiteralError, OpaqueValue};
pub use variable::{Classification, Reference, Variable};
