//! Subjects: aliases bound to a schema and a data source.

use std::fmt;
use std::sync::Arc;

use strata_ast::{Position, Selector};

use super::accessor::{AccessError, SchemaAccessor, SharedAccessor};
use super::schema::Schema;
use super::variable::{Classification, Reference, Variable};
use crate::error::{CompileError, CompileResult, ErrorKind};

#[derive(Clone)]
pub struct Subject {
    alias: String,
    schema: Arc<Schema>,
    classification: Classification,
    accessor: SharedAccessor,
    /// Public data published about a witness subject
    metadata: Option<SharedAccessor>,
    position: Position,
}

impl Subject {
    /// Witness subject; without an accessor its data is synthesized from the schema.
    pub fn witness(
        alias: impl Into<String>,
        schema: Arc<Schema>,
        accessor: Option<SharedAccessor>,
        metadata: Option<SharedAccessor>,
        position: Position,
    ) -> Self {
        let alias = alias.into();
        let accessor = accessor
            .unwrap_or_else(|| Arc::new(SchemaAccessor::new(alias.clone(), Arc::clone(&schema))));

        Self {
            alias,
            schema,
            classification: Classification::Witness,
            accessor,
            metadata,
            position,
        }
    }

    pub fn instance(
        alias: impl Into<String>,
        schema: Arc<Schema>,
        accessor: Option<SharedAccessor>,
        position: Position,
    ) -> CompileResult<Self> {
        let alias = alias.into();
        let accessor = accessor.ok_or_else(|| {
            CompileError::new(
                ErrorKind::MissingInstanceData,
                position,
                format!("Missing instance data for `{}`.", alias),
            )
        })?;

        Ok(Self {
            alias,
            schema,
            classification: Classification::Instance,
            accessor,
            metadata: None,
            position,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn is_witness(&self) -> bool {
        self.classification == Classification::Witness
    }

    /// Where the subject was declared.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Resolves `selector` to a variable of this subject's classification.
    ///
    /// Fails when the selector is not declared by the schema, when the data
    /// lacks it or holds the wrong type, and for witness subjects whose public
    /// metadata also holds the selector.
    pub fn get_variable(&self, selector: &Selector, position: Position) -> CompileResult<Variable> {
        if self.is_witness() {
            if let Some(metadata) = &self.metadata {
                if metadata.contains(selector) {
                    return Err(CompileError::new(
                        ErrorKind::WitnessExposure,
                        position,
                        format!(
                            "`{}.{}` is simultaneously declared as witness and instance data.",
                            self.alias, selector
                        ),
                    )
                    .with_label(self.position, "witness subject declared here".to_string()));
                }
            }
        }

        let access = |error: AccessError| self.access_error(error, position);
        let ty = self.schema.field_type(selector).map_err(access)?;
        let literal = self.accessor.get(selector, ty).map_err(access)?;
        let reference = Reference::new(ty, self.alias.clone(), selector.clone());

        Ok(Variable::new(
            self.classification,
            literal,
            Some(position),
            Some(reference),
        ))
    }

    fn access_error(&self, error: AccessError, position: Position) -> CompileError {
        let kind = match &error {
            AccessError::MissingEntry { .. } => ErrorKind::MissingEntry,
            AccessError::TypeMismatch { .. } | AccessError::NotScalar { .. } => {
                ErrorKind::TypeMismatch
            }
            AccessError::InvalidValue { .. } => ErrorKind::InvalidValue,
        };
        CompileError::new(
            kind,
            position,
            format!("Subject `{}` ({}): {}.", self.alias, self.schema.name, error),
        )
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("alias", &self.alias)
            .field("schema", &self.schema.name)
            .field("classification", &self.classification)
            .finish_non_exhaustive()
    }
}
