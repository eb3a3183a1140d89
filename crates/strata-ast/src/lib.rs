// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AST types for Strata statements
//!
//! This crate contains the syntax tree produced by the parser and the
//! foundation types (spans, source map, selectors) shared with the compiler.

pub mod ast;
pub mod foundation;

pub use foundation::{Position, Segment, Selector, SourceId, SourceMap, SourceText, Span};

pub use ast::*;
