//! Provenance-carrying variables.
//!
//! A [`Variable`] wraps a resolved [`Literal`] together with where it was
//! written and which data it was read from. Identity is the classification and
//! the literal alone: two variables read at different positions, or through
//! different references, denote the same quantity as long as both agree.
//!
//! Witness literals are never formatted. `Debug` and `Display` of a witness
//! variable show its reference instead.

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigInt;
use strata_ast::{Position, Selector};

use super::value::{DataType, Literal};

/// Whether a variable is privately or publicly known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Classification {
    Witness,
    Instance,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Witness => write!(f, "witness"),
            Classification::Instance => write!(f, "instance"),
        }
    }
}

/// Where a variable's value was read from. Used for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub ty: DataType,
    pub alias: String,
    pub selector: Selector,
}

impl Reference {
    pub fn new(ty: DataType, alias: impl Into<String>, selector: Selector) -> Self {
        Self {
            ty,
            alias: alias.into(),
            selector,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.alias, self.selector, self.ty)
    }
}

#[derive(Clone)]
pub struct Variable {
    classification: Classification,
    literal: Literal,
    position: Option<Position>,
    reference: Option<Reference>,
}

impl Variable {
    pub fn new(
        classification: Classification,
        literal: Literal,
        position: Option<Position>,
        reference: Option<Reference>,
    ) -> Self {
        Self {
            classification,
            literal,
            position,
            reference,
        }
    }

    pub fn witness(literal: Literal, position: Position, reference: Reference) -> Self {
        Self::new(Classification::Witness, literal, Some(position), Some(reference))
    }

    pub fn instance(literal: Literal, position: Position, reference: Option<Reference>) -> Self {
        Self::new(Classification::Instance, literal, Some(position), reference)
    }

    /// Instance constant introduced by the compiler, with no source position.
    pub fn constant(literal: Literal) -> Self {
        Self::new(Classification::Instance, literal, None, None)
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn is_witness(&self) -> bool {
        self.classification == Classification::Witness
    }

    pub fn is_instance(&self) -> bool {
        self.classification == Classification::Instance
    }

    pub fn data_type(&self) -> DataType {
        self.literal.data_type()
    }

    pub fn value(&self) -> &Literal {
        &self.literal
    }

    /// Concrete integer value of an instance variable.
    ///
    /// Witness variables never expose their integer, even when known.
    pub fn instance_integer(&self) -> Option<&BigInt> {
        if self.is_instance() {
            self.literal.as_integer()
        } else {
            None
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// Short description safe for diagnostics.
    pub fn describe(&self) -> String {
        match (&self.reference, self.classification) {
            (Some(reference), _) => format!("{}.{}", reference.alias, reference.selector),
            (None, Classification::Witness) => "<witness>".to_string(),
            (None, Classification::Instance) => self.literal.to_string(),
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.classification == other.classification && self.literal == other.literal
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.classification.hash(state);
        self.literal.hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.classification {
            Classification::Witness => write!(f, "Witness({})", self.describe()),
            Classification::Instance => write!(f, "Instance({})", self.literal),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
