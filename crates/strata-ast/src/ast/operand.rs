//! Predicate arguments: identifiers, literals and literal trees.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::foundation::{Selector, Span};

/// A single predicate argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Reference into a subject's data, e.g. `pass.age`
    Identifier(Identifier),
    /// Value written directly in the statement
    Literal(LiteralExpr),
}

/// `alias.selector`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub subject: String,
    pub selector: Selector,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralExpr {
    pub kind: LiteralKind,
    pub span: Span,
}

/// Literal forms the parser recognises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    /// Decimal integer; kept signed so out-of-range values can be reported
    Integer(#[serde(with = "decimal")] BigInt),
    String(String),
    /// Hex byte literal including its `0x` prefix
    Hex(String),
    Boolean(bool),
}

/// Binary tree of operands, used for Merkle tree arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandTree {
    pub root: TreeNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Leaf(Operand),
    Branch {
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl Operand {
    pub fn identifier(subject: impl Into<String>, selector: impl Into<Selector>, span: Span) -> Self {
        Operand::Identifier(Identifier {
            subject: subject.into(),
            selector: selector.into(),
            span,
        })
    }

    pub fn integer(value: impl Into<BigInt>, span: Span) -> Self {
        Self::literal(LiteralKind::Integer(value.into()), span)
    }

    pub fn string(value: impl Into<String>, span: Span) -> Self {
        Self::literal(LiteralKind::String(value.into()), span)
    }

    pub fn hex(value: impl Into<String>, span: Span) -> Self {
        Self::literal(LiteralKind::Hex(value.into()), span)
    }

    pub fn literal(kind: LiteralKind, span: Span) -> Self {
        Operand::Literal(LiteralExpr { kind, span })
    }

    pub fn span(&self) -> Span {
        match self {
            Operand::Identifier(identifier) => identifier.span,
            Operand::Literal(literal) => literal.span,
        }
    }
}

impl TreeNode {
    pub fn leaf(operand: Operand) -> Self {
        TreeNode::Leaf(operand)
    }

    pub fn branch(left: TreeNode, right: TreeNode) -> Self {
        TreeNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Integers travel as decimal strings so arbitrarily large values survive JSON.
mod decimal {
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<BigInt>()
            .map_err(|_| de::Error::custom(format!("invalid integer literal '{}'", text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_integer_survives_json() {
        let value: BigInt = "115792089237316195423570985008687907853269984665640564039457584007913129639936"
            .parse()
            .unwrap();
        let operand = Operand::integer(value.clone(), Span::new(0, 1, 1));

        let json = serde_json::to_string(&operand).unwrap();
        let back: Operand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, operand);
    }

    #[test]
    fn test_invalid_integer_is_rejected() {
        let json = r#"{"literal":{"kind":{"integer":"12a"},"span":{"start":0,"end":3,"start_line":1}}}"#;
        let err = serde_json::from_str::<Operand>(json).unwrap_err();
        assert!(err.to_string().contains("invalid integer literal"));
    }
}
