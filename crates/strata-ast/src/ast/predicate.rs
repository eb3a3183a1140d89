//! Predicate syntax.
//!
//! Every predicate variant exposes its logical arguments through
//! [`Predicate::fields`], an ordered list of `(name, element)` pairs. The
//! compiler resolves each element and hands the named result to the gadget
//! registered for the predicate's [`PredicateKind`]; no runtime introspection
//! of the syntax structs takes place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::operand::{Operand, OperandTree};
use crate::foundation::Span;

/// Discriminant of a predicate, used as registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    Equality,
    Inequality,
    BoundsCheck,
    SetMembership,
    MimcHash,
    MerkleTree,
}

impl PredicateKind {
    pub const ALL: [PredicateKind; 6] = [
        PredicateKind::Equality,
        PredicateKind::Inequality,
        PredicateKind::BoundsCheck,
        PredicateKind::SetMembership,
        PredicateKind::MimcHash,
        PredicateKind::MerkleTree,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PredicateKind::Equality => "equality",
            PredicateKind::Inequality => "inequality",
            PredicateKind::BoundsCheck => "bounds check",
            PredicateKind::SetMembership => "set membership",
            PredicateKind::MimcHash => "mimc hash",
            PredicateKind::MerkleTree => "merkle tree",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum Predicate {
    /// `left == right`
    Equality(Equality),
    /// `left != right`
    Inequality(Inequality),
    /// `min < value < max`, either bound optional
    BoundsCheck(BoundsCheck),
    /// `member IN (a, b, c)`
    SetMembership(SetMembership),
    /// `image IS MIMC HASH OF preimage`
    MimcHash(MimcHash),
    /// `root IS MERKLE ROOT OF ((a, b), c)`
    MerkleTree(MerkleTree),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equality {
    pub left: Operand,
    pub right: Operand,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inequality {
    pub left: Operand,
    pub right: Operand,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundsCheck {
    pub value: Operand,
    #[serde(default)]
    pub min: Option<Operand>,
    #[serde(default)]
    pub max: Option<Operand>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMembership {
    pub member: Operand,
    pub set: Vec<Operand>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimcHash {
    pub preimage: Operand,
    pub image: Operand,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTree {
    pub root: Operand,
    pub tree: OperandTree,
    pub span: Span,
}

/// A logical predicate argument before resolution.
#[derive(Debug, Clone, Copy)]
pub enum PredicateElement<'a> {
    Operand(&'a Operand),
    /// Optional argument the statement left out
    Absent,
    List(&'a [Operand]),
    Tree(&'a OperandTree),
}

impl Predicate {
    pub fn kind(&self) -> PredicateKind {
        match self {
            Predicate::Equality(_) => PredicateKind::Equality,
            Predicate::Inequality(_) => PredicateKind::Inequality,
            Predicate::BoundsCheck(_) => PredicateKind::BoundsCheck,
            Predicate::SetMembership(_) => PredicateKind::SetMembership,
            Predicate::MimcHash(_) => PredicateKind::MimcHash,
            Predicate::MerkleTree(_) => PredicateKind::MerkleTree,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Predicate::Equality(p) => p.span,
            Predicate::Inequality(p) => p.span,
            Predicate::BoundsCheck(p) => p.span,
            Predicate::SetMembership(p) => p.span,
            Predicate::MimcHash(p) => p.span,
            Predicate::MerkleTree(p) => p.span,
        }
    }

    /// Named logical arguments in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, PredicateElement<'_>)> {
        use PredicateElement as E;

        match self {
            Predicate::Equality(p) => vec![("left", E::Operand(&p.left)), ("right", E::Operand(&p.right))],
            Predicate::Inequality(p) => vec![("left", E::Operand(&p.left)), ("right", E::Operand(&p.right))],
            Predicate::BoundsCheck(p) => vec![
                ("value", E::Operand(&p.value)),
                ("min", p.min.as_ref().map_or(E::Absent, E::Operand)),
                ("max", p.max.as_ref().map_or(E::Absent, E::Operand)),
            ],
            Predicate::SetMembership(p) => vec![("member", E::Operand(&p.member)), ("set", E::List(&p.set))],
            Predicate::MimcHash(p) => vec![("preimage", E::Operand(&p.preimage)), ("image", E::Operand(&p.image))],
            Predicate::MerkleTree(p) => vec![("root", E::Operand(&p.root)), ("tree", E::Tree(&p.tree))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 4, 1)
    }

    #[test]
    fn test_bounds_fields_mark_absent_bounds() {
        let predicate = Predicate::BoundsCheck(BoundsCheck {
            value: Operand::identifier("pass", "age", span()),
            min: Some(Operand::integer(18, span())),
            max: None,
            span: span(),
        });

        let fields = predicate.fields();
        let names: Vec<_> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["value", "min", "max"]);
        assert!(matches!(fields[1].1, PredicateElement::Operand(_)));
        assert!(matches!(fields[2].1, PredicateElement::Absent));
        assert_eq!(predicate.kind(), PredicateKind::BoundsCheck);
    }

    #[test]
    fn test_predicate_json_is_tagged() {
        let predicate = Predicate::Equality(Equality {
            left: Operand::identifier("pass", "firstName", span()),
            right: Operand::string("Alice", span()),
            span: span(),
        });

        let json = serde_json::to_value(&predicate).unwrap();
        assert_eq!(json["predicate"], "equality");

        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, predicate);
    }
}
