//! Source location tracking for diagnostics.
//!
//! The parser only knows the text of the statement it is reading, so every
//! syntax node carries a [`Span`] relative to that text. Once the compiler has
//! registered the statement in a [`SourceMap`], it pins spans to the statement's
//! [`SourceId`], producing an absolute [`Position`] that can be rendered back to
//! the original source from any diagnostic.
//!
//! # Examples
//!
//! ```
//! # use strata_ast::foundation::span::*;
//! let mut map = SourceMap::new();
//! let source = map.add_source("age.zkstrata", "WITNESS pass\nPROOF FOR pass.age > 18".to_string());
//! let position = Span::new(8, 12, 1).pin(source);
//!
//! assert_eq!(map.source_name(&position), "age.zkstrata");
//! assert_eq!(map.snippet(&position), "pass");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range inside a single statement, as produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of start position
    pub start: u32,
    /// Byte offset of end position (exclusive)
    pub end: u32,
    /// Cached line number (1-based) for the start position
    pub start_line: u16,
}

/// Index of a statement registered in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u16);

/// Absolute source location: a span pinned to the statement it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub source: SourceId,
    pub span: Span,
}

/// Collection of all statement sources taking part in one compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    sources: Vec<SourceText>,
}

/// A single statement text with line indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceText {
    /// Name of the statement (usually the file it was read from)
    pub name: String,
    /// Full statement text
    pub text: String,
    /// Byte offsets of each line start, with an EOF sentinel
    pub line_starts: Vec<u32>,
}

impl Span {
    /// Create a new span.
    pub fn new(start: u32, end: u32, start_line: u16) -> Self {
        Self {
            start,
            end,
            start_line,
        }
    }

    /// Pin this span to a registered source, making it absolute.
    pub fn pin(self, source: SourceId) -> Position {
        Position { source, span: self }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}@{}..{}",
            self.source.0, self.span.start, self.span.end
        )
    }
}

impl SourceMap {
    /// Create an empty source map.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Register a statement and return its ID.
    ///
    /// The line index is computed automatically.
    pub fn add_source(&mut self, name: impl Into<String>, text: String) -> SourceId {
        let id = self.sources.len();
        assert!(id < u16::MAX as usize, "too many statement sources");

        self.sources.push(SourceText::new(name.into(), text));
        SourceId(id as u16)
    }

    /// Get the source for a position.
    pub fn source(&self, position: &Position) -> &SourceText {
        &self.sources[position.source.0 as usize]
    }

    /// Get the statement name for a position.
    pub fn source_name(&self, position: &Position) -> &str {
        &self.source(position).name
    }

    /// Get the source snippet for a position.
    pub fn snippet(&self, position: &Position) -> &str {
        let source = self.source(position);
        source
            .text
            .get(position.span.start as usize..position.span.end as usize)
            .unwrap_or("")
    }

    /// Get the (line, column) for a position's start, both 1-based.
    pub fn line_col(&self, position: &Position) -> (u32, u32) {
        self.source(position).line_col(position.span.start)
    }

    /// Get the number of registered sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl SourceText {
    /// Create a new source with precomputed line starts.
    pub fn new(name: String, text: String) -> Self {
        let line_starts = compute_line_starts(&text);
        Self {
            name,
            text,
            line_starts,
        }
    }

    /// Get (line, column) for a byte offset.
    ///
    /// Both line and column are 1-based. Offsets beyond EOF clamp to EOF.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset.min(self.text.len() as u32);

        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.max(1) - 1,
        };

        let line = (line_idx + 1) as u32;
        let col = (offset - self.line_starts[line_idx]) + 1;

        (line, col)
    }

    /// Get the text of a specific line (1-based), without its line break.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        if line == 0 || line as usize >= self.line_starts.len() {
            return None;
        }

        let line_idx = (line - 1) as usize;
        let start = self.line_starts[line_idx] as usize;
        let end = self.line_starts[line_idx + 1] as usize;
        Some(self.text[start..end].trim_end_matches(['\n', '\r']))
    }
}

/// Compute byte offsets of line starts in source text.
///
/// `line_starts[0]` is always 0 and the last entry is the EOF sentinel.
fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut line_starts = vec![0];

    for (idx, ch) in text.char_indices() {
        if ch == '\n' {
            line_starts.push((idx + 1) as u32);
        }
    }

    if line_starts.last() != Some(&(text.len() as u32)) {
        line_starts.push(text.len() as u32);
    }

    line_starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_pinning() {
        let position = Span::new(10, 20, 1).pin(SourceId(3));
        assert_eq!(position.source, SourceId(3));
        assert_eq!(position.span.end - position.span.start, 10);
        assert_eq!(position.to_string(), "#3@10..20");
    }

    #[test]
    fn test_compute_line_starts() {
        assert_eq!(compute_line_starts("line 1\nline 2\nline 3"), vec![0, 7, 14, 20]);
        assert_eq!(compute_line_starts("line 1\nline 2\n"), vec![0, 7, 14]);
    }

    #[test]
    fn test_line_col_and_text() {
        let source = SourceText::new("s".into(), "hello\nworld\n".into());
        assert_eq!(source.line_col(0), (1, 1));
        assert_eq!(source.line_col(6), (2, 1));
        assert_eq!(source.line_text(1), Some("hello"));
        assert_eq!(source.line_text(2), Some("world"));
        assert_eq!(source.line_text(3), None);
    }

    #[test]
    fn test_offset_beyond_eof_clamps() {
        let source = SourceText::new("s".into(), "hello\nworld\n".into());
        assert_eq!(source.line_col(40), (3, 1));

        let mut map = SourceMap::new();
        let id = map.add_source("s", "short".to_string());
        assert_eq!(map.snippet(&Span::new(3, 30, 1).pin(id)), "");
    }

    #[test]
    fn test_source_map_pinning() {
        let mut map = SourceMap::new();
        let first = map.add_source("a", "WITNESS a".to_string());
        let second = map.add_source("b", "INSTANCE b".to_string());
        assert_eq!(map.source_count(), 2);

        let position = Span::new(9, 10, 1).pin(second);
        assert_eq!(map.snippet(&position), "b");
        assert_eq!(map.line_col(&position), (1, 10));
        assert_ne!(first, second);
    }
}
