//! Statement-level syntax: subject declarations and the statement root.

use serde::{Deserialize, Serialize};

use crate::ast::predicate::Predicate;
use crate::foundation::Span;

/// A parsed statement, as handed over by the parser.
///
/// Holds the statement name and full text so diagnostics can point back into
/// it, the subjects in declaration order and the predicates in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTree {
    /// Name of the statement source (usually its file name)
    pub source: String,
    /// Full statement text
    pub statement: String,
    #[serde(default)]
    pub subjects: Vec<SubjectDecl>,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}

/// Whether a subject is privately known (witness) or publicly known (instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Witness,
    Instance,
}

/// A name with the span it was written at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// `WITNESS pass COMPLIANT WITH passport_ch`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDecl {
    pub alias: Ident,
    pub schema: Ident,
    pub visibility: Visibility,
}

impl StatementTree {
    pub fn new(source: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            statement: statement.into(),
            subjects: Vec::new(),
            predicates: Vec::new(),
        }
    }

    pub fn with_subject(mut self, subject: SubjectDecl) -> Self {
        self.subjects.push(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl SubjectDecl {
    pub fn witness(alias: Ident, schema: Ident) -> Self {
        Self {
            alias,
            schema,
            visibility: Visibility::Witness,
        }
    }

    pub fn instance(alias: Ident, schema: Ident) -> Self {
        Self {
            alias,
            schema,
            visibility: Visibility::Instance,
        }
    }

    pub fn is_witness(&self) -> bool {
        self.visibility == Visibility::Witness
    }
}
