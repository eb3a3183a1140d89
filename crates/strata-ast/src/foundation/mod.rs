//! Foundation types shared by the parser contract and the compiler.

pub mod selector;
pub mod span;

pub use selector::{Segment, Selector};
pub use span::{Position, SourceId, SourceMap, SourceText, Span};
