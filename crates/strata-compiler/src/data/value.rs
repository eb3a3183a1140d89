//! Resolved values and their declared types.

use std::fmt;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use strata_ast::{LiteralKind, Selector};
use thiserror::Error;

/// Declared type of a schema field or literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Arbitrary precision signed integer
    Integer,
    /// UTF-8 text
    Text,
    /// Raw bytes, written as `0x…`
    Bytes,
    Boolean,
}

impl DataType {
    pub fn name(self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Text => "text",
            DataType::Bytes => "bytes",
            DataType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Integer(BigInt),
    Text(String),
    Bytes(Vec<u8>),
    Boolean(bool),
    /// Witness value the compiler is not allowed to see.
    ///
    /// Identified by where it was read from, so two reads of the same field
    /// denote the same quantity.
    Opaque(OpaqueValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpaqueValue {
    pub ty: DataType,
    pub alias: String,
    pub selector: Selector,
}

/// Reasons a syntax literal cannot become a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("hex literal must start with `0x`")]
    MissingHexPrefix,

    #[error("invalid hex literal: {0}")]
    InvalidHex(String),
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::Integer(_) => DataType::Integer,
            Literal::Text(_) => DataType::Text,
            Literal::Bytes(_) => DataType::Bytes,
            Literal::Boolean(_) => DataType::Boolean,
            Literal::Opaque(opaque) => opaque.ty,
        }
    }

    pub fn opaque(ty: DataType, alias: impl Into<String>, selector: Selector) -> Self {
        Literal::Opaque(OpaqueValue {
            ty,
            alias: alias.into(),
            selector,
        })
    }

    /// Concrete integer payload, if any.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Literal::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Literal::Opaque(_))
    }

    /// Parses a literal written in a statement.
    pub fn from_syntax(kind: &LiteralKind) -> Result<Self, LiteralError> {
        Ok(match kind {
            LiteralKind::Integer(value) => Literal::Integer(value.clone()),
            LiteralKind::String(value) => Literal::Text(value.clone()),
            LiteralKind::Boolean(value) => Literal::Boolean(*value),
            LiteralKind::Hex(text) => Literal::Bytes(parse_hex(text)?),
        })
    }
}

pub(crate) fn parse_hex(text: &str) -> Result<Vec<u8>, LiteralError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or(LiteralError::MissingHexPrefix)?;
    hex::decode(digits).map_err(|e| LiteralError::InvalidHex(e.to_string()))
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Text(value) => write!(f, "{:?}", value),
            Literal::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Literal::Boolean(value) => write!(f, "{}", value),
            Literal::Opaque(opaque) => write!(f, "<{}.{}>", opaque.alias, opaque.selector),
        }
    }
}
