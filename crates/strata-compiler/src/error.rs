//! Compile-time error reporting and diagnostics.
//!
//! # Design
//!
//! - `CompileError`: single diagnostic with labelled positions
//! - `ErrorKind`: categorizes the fault; `ErrorKind::Internal` marks compiler bugs
//! - `Severity`: error, warning, or note
//! - `Diagnostics`: sink for non-fatal diagnostics collected during a compile
//! - `DiagnosticFormatter`: formats diagnostics with source snippets
//!
//! Labels may carry the [`Reference`] of a variable (alias, selector, declared
//! type) but never its value: witness data must not end up in anything a human
//! reads.
//!
//! # Examples
//!
//! ```
//! # use strata_compiler::error::*;
//! # use strata_ast::{SourceId, Span};
//! let position = Span::new(8, 12, 1).pin(SourceId(0));
//! let error = CompileError::new(
//!     ErrorKind::DuplicateAlias,
//!     position,
//!     "Alias `pass` is already defined.".to_string(),
//! );
//! assert!(!error.is_internal());
//! ```

use crate::data::{Reference, Variable};
use std::fmt;
use strata_ast::{Position, SourceMap};

/// Compilation diagnostic with source positions and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Category of this error
    pub kind: ErrorKind,
    /// Severity level
    pub severity: Severity,
    /// Primary error message
    pub message: String,
    /// Labelled positions, primary first
    pub labels: Vec<Label>,
    /// Additional notes or hints
    pub notes: Vec<String>,
}

/// Category of compilation error.
///
/// # Invariant
///
/// The discriminant values must match the ERROR_KIND_NAMES array indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    // Subject resolution
    /// Alias declared twice in one statement
    DuplicateAlias = 0,
    /// `private` or `public` used as a top-level alias
    ReservedAlias = 1,
    /// Schema name matches neither supplied nor built-in schemas
    UndefinedSchema = 2,
    /// Identifier references an alias no subject declares
    UndeclaredAlias = 3,
    /// Witness data supplied, but not for this subject
    MissingWitnessData = 4,
    /// Instance subject without instance data
    MissingInstanceData = 5,

    // Data access
    /// Selector does not lead to a value
    MissingEntry = 6,
    /// Value or variable has the wrong type or classification
    TypeMismatch = 7,
    /// Witness data would become publicly visible
    WitnessExposure = 8,

    // Gadget checks
    /// Value outside the range a gadget accepts
    InvalidValue = 9,
    /// Set literal lists an element twice
    DuplicateElement = 10,
    /// Gadgets assert an unsatisfiable condition
    Contradiction = 11,

    // Lints
    /// Declared subject never referenced
    UnusedSubject = 12,

    // Generic
    /// Internal compiler error (bug in compiler)
    Internal = 13,
}

/// Human-readable names for error kinds.
///
/// Index matches ErrorKind discriminant.
const ERROR_KIND_NAMES: &[&str] = &[
    "duplicate alias",         // 0: DuplicateAlias
    "reserved keyword",        // 1: ReservedAlias
    "undefined schema",        // 2: UndefinedSchema
    "undeclared alias",        // 3: UndeclaredAlias
    "missing witness data",    // 4: MissingWitnessData
    "missing instance data",   // 5: MissingInstanceData
    "missing entry",           // 6: MissingEntry
    "type mismatch",           // 7: TypeMismatch
    "witness exposure",        // 8: WitnessExposure
    "invalid value",           // 9: InvalidValue
    "duplicate element",       // 10: DuplicateElement
    "contradiction",           // 11: Contradiction
    "unused subject",          // 12: UnusedSubject
    "internal compiler error", // 13: Internal
];

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Warning (statement is valid but suspicious)
    Warning,
    /// Error (compilation cannot proceed)
    Error,
}

/// Labelled position in a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Source location, if the labelled item was written in a statement
    pub position: Option<Position>,
    /// Label text
    pub message: String,
    /// Data reference of the labelled variable, if any
    pub reference: Option<Reference>,
}

impl CompileError {
    /// Creates a new error diagnostic at a position.
    pub fn new(kind: ErrorKind, position: Position, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, message).with_label(position, String::new())
    }

    /// Creates an error diagnostic without a source position.
    pub fn unpositioned(kind: ErrorKind, message: String) -> Self {
        Self::with_severity(kind, Severity::Error, message)
    }

    /// Creates an internal compiler error.
    ///
    /// Internal errors are never the user's fault and always abort the compile.
    pub fn internal(message: String) -> Self {
        Self::with_severity(ErrorKind::Internal, Severity::Error, message)
            .with_note("this is a bug in the compiler, please report it".to_string())
    }

    /// Creates a new warning diagnostic.
    pub fn warning(kind: ErrorKind, position: Position, message: String) -> Self {
        Self::with_severity(kind, Severity::Warning, message).with_label(position, String::new())
    }

    fn with_severity(kind: ErrorKind, severity: Severity, message: String) -> Self {
        Self {
            kind,
            severity,
            message,
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Adds a labelled position.
    pub fn with_label(mut self, position: Position, message: String) -> Self {
        self.labels.push(Label {
            position: Some(position),
            message,
            reference: None,
        });
        self
    }

    /// Adds a label pointing at a variable.
    ///
    /// Records where the variable was written and what data it refers to,
    /// never the value it holds.
    pub fn with_variable(mut self, variable: &Variable, message: impl Into<String>) -> Self {
        self.labels.push(Label {
            position: variable.position(),
            message: message.into(),
            reference: variable.reference().cloned(),
        });
        self
    }

    /// Adds a note or hint.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// Primary position of this diagnostic, if any label has one.
    pub fn position(&self) -> Option<Position> {
        self.labels.iter().find_map(|label| label.position)
    }

    pub fn is_internal(&self) -> bool {
        self.kind == ErrorKind::Internal
    }
}

impl ErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn name(self) -> &'static str {
        ERROR_KIND_NAMES[self as usize]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.severity,
            self.kind.name(),
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Sink for non-fatal diagnostics produced while compiling a statement.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<CompileError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: CompileError) {
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompileError> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompileError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Formats diagnostics with source code context.
///
/// Produces messages with statement name and line/column, the source line,
/// a caret underline and one entry per secondary label.
pub struct DiagnosticFormatter<'a> {
    sources: &'a SourceMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(sources: &'a SourceMap) -> Self {
        Self { sources }
    }

    /// Formats a diagnostic as a string with source context.
    pub fn format(&self, error: &CompileError) -> String {
        let mut output = format!(
            "{}: {}: {}\n",
            error.severity,
            error.kind.name(),
            error.message
        );

        if let Some(position) = error.position() {
            self.push_snippet(&mut output, &position);
        }

        // Labels without text only mark the primary position.
        for label in error.labels.iter().filter(|l| !l.message.is_empty()) {
            output.push_str(&format!("   = note: {}", label.message));
            if let Some(reference) = &label.reference {
                output.push_str(&format!(" ({})", reference));
            }
            output.push('\n');

            if let Some(position) = &label.position {
                let (line, col) = self.sources.line_col(position);
                output.push_str(&format!(
                    "     at {}:{}:{}\n",
                    self.sources.source_name(position),
                    line,
                    col
                ));
            }
        }

        for note in &error.notes {
            output.push_str(&format!("   = help: {}\n", note));
        }

        output
    }

    fn push_snippet(&self, output: &mut String, position: &Position) {
        let (line, col) = self.sources.line_col(position);
        output.push_str(&format!(
            "  --> {}:{}:{}\n",
            self.sources.source_name(position),
            line,
            col
        ));

        let source = self.sources.source(position);
        if let Some(source_line) = source.line_text(line) {
            output.push_str("   |\n");
            output.push_str(&format!("{:3} | {}\n", line, source_line));

            let start_col = col as usize;
            let span_len = position.span.end.saturating_sub(position.span.start) as usize;
            let end_col = (start_col + span_len).min(source_line.len() + 1);
            let underline = " ".repeat(start_col.saturating_sub(1))
                + &"^".repeat(end_col.saturating_sub(start_col).max(1));
            output.push_str(&format!("    | {}\n", underline));
        }
    }

    /// Formats multiple diagnostics, separated by blank lines.
    pub fn format_all<'e>(&self, errors: impl IntoIterator<Item = &'e CompileError>) -> String {
        errors
            .into_iter()
            .map(|e| self.format(e))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
