//! Schemas: named, typed field declarations.
//!
//! A schema fixes the declared type of every selector a subject may be
//! dereferenced with. It can also carry a validation rule, a statement that
//! every witness subject of the schema must satisfy; inside the rule the
//! subject is called `private` (or `public`).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_ast::{Selector, StatementTree};

use super::accessor::AccessError;
use super::value::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub fields: IndexMap<String, FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rule: Option<StatementTree>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Scalar(DataType),
    Object(IndexMap<String, FieldType>),
    /// Homogeneous list, indexed by numeric selector segments
    List(Box<FieldType>),
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            validation_rule: None,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldType) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn with_validation_rule(mut self, rule: StatementTree) -> Self {
        self.validation_rule = Some(rule);
        self
    }

    /// Declared type of the scalar at `selector`.
    pub fn field_type(&self, selector: &Selector) -> Result<DataType, AccessError> {
        let missing = || AccessError::MissingEntry {
            selector: selector.clone(),
        };

        let mut segments = selector.segments().iter();
        let first = segments.next().ok_or_else(missing)?;
        let mut current = self.fields.get(first).ok_or_else(missing)?;

        for segment in segments {
            current = match current {
                FieldType::Object(fields) => fields.get(segment).ok_or_else(missing)?,
                FieldType::List(element) if segment.parse::<usize>().is_ok() => element,
                _ => return Err(missing()),
            };
        }

        match current {
            FieldType::Scalar(ty) => Ok(*ty),
            FieldType::Object(_) => Err(AccessError::NotScalar {
                selector: selector.clone(),
                found: "object",
            }),
            FieldType::List(_) => Err(AccessError::NotScalar {
                selector: selector.clone(),
                found: "list",
            }),
        }
    }

    /// Swiss passport, available to every statement.
    pub fn passport_ch() -> Self {
        use DataType::*;
        use FieldType::Scalar;

        Schema::new("passport_ch")
            .with_field("firstName", Scalar(Text))
            .with_field("lastName", Scalar(Text))
            .with_field("nationality", Scalar(Text))
            .with_field("documentNumber", Scalar(Text))
            .with_field("dateOfBirth", Scalar(Integer))
            .with_field("dateOfExpiry", Scalar(Integer))
            .with_field("signature", Scalar(Bytes))
            .with_field(
                "issuer",
                FieldType::Object(IndexMap::from([
                    ("country".to_string(), Scalar(Text)),
                    ("authority".to_string(), Scalar(Text)),
                ])),
            )
    }
}

/// Schema from the built-in catalog.
pub fn builtin(name: &str) -> Option<Schema> {
    match name {
        "passport_ch" => Some(Schema::passport_ch()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_lookup() {
        let schema = Schema::passport_ch();
        assert_eq!(schema.field_type(&Selector::from("dateOfBirth")), Ok(DataType::Integer));
        assert_eq!(schema.field_type(&Selector::from("issuer.country")), Ok(DataType::Text));
        assert!(matches!(
            schema.field_type(&Selector::from("issuer.planet")),
            Err(AccessError::MissingEntry { .. })
        ));
        assert!(matches!(
            schema.field_type(&Selector::from("issuer")),
            Err(AccessError::NotScalar { found: "object", .. })
        ));
        assert!(schema.field_type(&Selector::from("")).is_err());
    }

    #[test]
    fn test_list_fields_take_numeric_segments() {
        let schema = Schema::new("visa_holder").with_field(
            "visas",
            FieldType::List(Box::new(FieldType::Scalar(DataType::Text))),
        );
        assert_eq!(schema.field_type(&Selector::from("visas.3")), Ok(DataType::Text));
        assert!(schema.field_type(&Selector::from("visas.first")).is_err());
    }

    #[test]
    fn test_schema_from_json() {
        let schema: Schema = serde_json::from_value(json!({
            "name": "bank_account",
            "fields": {
                "balance": {"scalar": "integer"},
                "owner": {"object": {"name": {"scalar": "text"}}}
            }
        }))
        .unwrap();

        assert_eq!(schema.name, "bank_account");
        assert_eq!(schema.field_type(&Selector::from("owner.name")), Ok(DataType::Text));
        assert!(schema.validation_rule.is_none());
    }

    #[test]
    fn test_builtin_catalog() {
        assert!(builtin("passport_ch").is_some());
        assert!(builtin("passport_de").is_none());
    }
}
