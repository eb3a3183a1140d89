//! Value accessors: where subject data comes from.
//!
//! An accessor answers one question: what literal of a given type sits at a
//! selector. [`JsonAccessor`] reads real data, [`SchemaAccessor`] stands in
//! for witness data the compiler never gets to see.

use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use serde_json::Value;
use strata_ast::{Segment, Selector};
use thiserror::Error;

use super::schema::Schema;
use super::value::{parse_hex, DataType, Literal};

/// Accessor failures.
///
/// Messages name selectors and types but never the value found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("missing entry `{selector}`")]
    MissingEntry { selector: Selector },

    #[error("type mismatch at `{selector}`: expected {expected}, found {found}")]
    TypeMismatch {
        selector: Selector,
        expected: DataType,
        found: &'static str,
    },

    #[error("type mismatch at `{selector}`: expected a scalar, found {found}")]
    NotScalar {
        selector: Selector,
        found: &'static str,
    },

    #[error("invalid value at `{selector}`: {reason}")]
    InvalidValue { selector: Selector, reason: String },
}

/// Source of subject data.
pub trait ValueAccessor: Send + Sync + fmt::Debug {
    /// Literal of type `ty` at `selector`.
    fn get(&self, selector: &Selector, ty: DataType) -> Result<Literal, AccessError>;

    /// Whether any value is stored at `selector`.
    fn contains(&self, selector: &Selector) -> bool;
}

pub type SharedAccessor = Arc<dyn ValueAccessor>;

/// Accessor over a JSON document.
///
/// Integers may be JSON numbers or decimal strings, bytes are `0x…` strings.
#[derive(Clone)]
pub struct JsonAccessor {
    root: Value,
}

impl JsonAccessor {
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    fn navigate(&self, selector: &Selector) -> Option<&Value> {
        selector.steps().try_fold(&self.root, |current, step| match (current, step) {
            (Value::Object(map), Segment::Field(name)) => map.get(name),
            (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
            (Value::Array(items), Segment::Index(index)) => items.get(index),
            _ => None,
        })
    }
}

impl fmt::Debug for JsonAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonAccessor").finish_non_exhaustive()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ValueAccessor for JsonAccessor {
    fn get(&self, selector: &Selector, ty: DataType) -> Result<Literal, AccessError> {
        let value = match self.navigate(selector) {
            Some(Value::Null) | None => {
                return Err(AccessError::MissingEntry {
                    selector: selector.clone(),
                })
            }
            Some(value) => value,
        };

        let mismatch = || AccessError::TypeMismatch {
            selector: selector.clone(),
            expected: ty,
            found: json_kind(value),
        };
        let invalid = |reason: String| AccessError::InvalidValue {
            selector: selector.clone(),
            reason,
        };

        match (ty, value) {
            (DataType::Integer, Value::Number(number)) => {
                if let Some(n) = number.as_i64() {
                    Ok(Literal::Integer(BigInt::from(n)))
                } else if let Some(n) = number.as_u64() {
                    Ok(Literal::Integer(BigInt::from(n)))
                } else {
                    Err(invalid("not an integer".to_string()))
                }
            }
            (DataType::Integer, Value::String(text)) => text
                .parse::<BigInt>()
                .map(Literal::Integer)
                .map_err(|_| mismatch()),
            (DataType::Text, Value::String(text)) => Ok(Literal::Text(text.clone())),
            // Subject data may be witness data: the decode error would quote it.
            (DataType::Bytes, Value::String(text)) => parse_hex(text)
                .map(Literal::Bytes)
                .map_err(|_| invalid("not a 0x-prefixed hex string".to_string())),
            (DataType::Boolean, Value::Bool(flag)) => Ok(Literal::Boolean(*flag)),
            _ => Err(mismatch()),
        }
    }

    fn contains(&self, selector: &Selector) -> bool {
        !matches!(self.navigate(selector), None | Some(Value::Null))
    }
}

/// Synthetic witness accessor derived from a schema.
///
/// Every field the schema declares is present, as an opaque literal that
/// identifies itself by alias and selector.
#[derive(Debug, Clone)]
pub struct SchemaAccessor {
    alias: String,
    schema: Arc<Schema>,
}

impl SchemaAccessor {
    pub fn new(alias: impl Into<String>, schema: Arc<Schema>) -> Self {
        Self {
            alias: alias.into(),
            schema,
        }
    }
}

impl ValueAccessor for SchemaAccessor {
    fn get(&self, selector: &Selector, ty: DataType) -> Result<Literal, AccessError> {
        let declared = self.schema.field_type(selector)?;
        if declared != ty {
            return Err(AccessError::TypeMismatch {
                selector: selector.clone(),
                expected: ty,
                found: declared.name(),
            });
        }
        Ok(Literal::opaque(declared, self.alias.clone(), selector.clone()))
    }

    fn contains(&self, selector: &Selector) -> bool {
        self.schema.field_type(selector).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn accessor() -> JsonAccessor {
        JsonAccessor::new(json!({
            "firstName": "Alice",
            "dateOfBirth": 19900101,
            "serial": "0xdeadbeef",
            "balance": "340282366920938463463374607431768211456",
            "visas": [{"country": "CH"}, {"country": "DE"}],
            "expired": false,
            "nickname": null
        }))
    }

    #[test]
    fn test_json_reads_typed_values() {
        let a = accessor();
        assert_eq!(
            a.get(&Selector::from("firstName"), DataType::Text),
            Ok(Literal::Text("Alice".to_string()))
        );
        assert_eq!(
            a.get(&Selector::from("dateOfBirth"), DataType::Integer),
            Ok(Literal::Integer(BigInt::from(19900101)))
        );
        assert_eq!(
            a.get(&Selector::from("serial"), DataType::Bytes),
            Ok(Literal::Bytes(vec![0xde, 0xad, 0xbe, 0xef]))
        );
        assert_eq!(
            a.get(&Selector::from("expired"), DataType::Boolean),
            Ok(Literal::Boolean(false))
        );
        assert!(matches!(
            a.get(&Selector::from("balance"), DataType::Integer),
            Ok(Literal::Integer(_))
        ));
    }

    #[test]
    fn test_json_indexes_lists() {
        let a = accessor();
        assert_eq!(
            a.get(&Selector::from("visas.1.country"), DataType::Text),
            Ok(Literal::Text("DE".to_string()))
        );
        assert!(a.contains(&Selector::from("visas.0")));
        assert!(!a.contains(&Selector::from("visas.2")));
    }

    #[test]
    fn test_json_missing_entry() {
        let a = accessor();
        let err = a.get(&Selector::from("lastName"), DataType::Text).unwrap_err();
        assert!(matches!(err, AccessError::MissingEntry { .. }));
        assert!(err.to_string().contains("missing entry"));

        let null = a.get(&Selector::from("nickname"), DataType::Text).unwrap_err();
        assert!(matches!(null, AccessError::MissingEntry { .. }));
        assert!(!a.contains(&Selector::from("nickname")));
    }

    #[test]
    fn test_json_type_mismatch_hides_value() {
        let a = accessor();
        let err = a.get(&Selector::from("firstName"), DataType::Integer).unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
        assert!(!err.to_string().contains("Alice"));
    }

    #[test]
    fn test_json_invalid_hex_hides_value() {
        let a = JsonAccessor::new(json!({ "signature": "0xdeadbeQf" }));
        let err = a.get(&Selector::from("signature"), DataType::Bytes).unwrap_err();
        assert!(matches!(err, AccessError::InvalidValue { .. }));

        let message = err.to_string();
        assert!(message.contains("not a 0x-prefixed hex string"));
        assert!(!message.contains('Q'));
        assert!(!message.contains("deadbe"));
    }

    #[test]
    fn test_schema_accessor_yields_opaque_literals() {
        let schema = Arc::new(Schema::passport_ch());
        let a = SchemaAccessor::new("pass", schema);

        let literal = a.get(&Selector::from("dateOfBirth"), DataType::Integer).unwrap();
        assert!(literal.is_opaque());
        assert_eq!(literal.data_type(), DataType::Integer);
        assert!(a.contains(&Selector::from("firstName")));
        assert!(!a.contains(&Selector::from("shoeSize")));

        let err = a.get(&Selector::from("firstName"), DataType::Integer).unwrap_err();
        assert!(matches!(err, AccessError::TypeMismatch { .. }));
    }
}
