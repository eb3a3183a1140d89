//! Statement visitor: syntax in, compiled statement out.
//!
//! # Design
//!
//! The visitor drives one statement through semantic resolution:
//!
//! 1. resolve every subject declaration against the [`DataContext`]
//! 2. resolve each predicate's fields to variables and build its gadget
//!    through the gadget registry
//! 3. warn about subjects no predicate references and drop them
//! 4. append the gadgets of the validation rules of used witness subjects
//! 5. run the optimizer and package the [`Statement`]
//!
//! Validation rules are visited as nested statements: inside them the
//! reserved aliases `private` and `public` stand for the subject being
//! validated.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use strata_ast::{
    Ident, Operand, OperandTree, Predicate, PredicateElement, SourceId, SourceMap, StatementTree,
    SubjectDecl, TreeNode, Visibility,
};
use tracing::{debug, trace, warn};

use crate::data::{schema, Literal, Schema, SharedAccessor, Subject, Variable};
use crate::error::{CompileError, CompileResult, Diagnostics, ErrorKind};
use crate::gadgets::registry::{self, GadgetDescriptor, GADGETS};
use crate::gadgets::{AnyGadget, FieldMap, FieldValue, VariableTree};
use crate::optimizer::Optimizer;
use crate::statement::Statement;

/// Aliases that refer to the validated subject inside a validation rule.
pub const RESERVED_ALIASES: [&str; 2] = ["private", "public"];

/// Schemas and subject data available to a compile.
#[derive(Clone, Default)]
pub struct DataContext {
    schemas: IndexMap<String, Arc<Schema>>,
    witness: IndexMap<String, SharedAccessor>,
    instance: IndexMap<String, SharedAccessor>,
    rule_sources: HashMap<String, SourceId>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.schemas.insert(name.into(), Arc::new(schema));
        self
    }

    pub fn with_witness(mut self, alias: impl Into<String>, accessor: SharedAccessor) -> Self {
        self.witness.insert(alias.into(), accessor);
        self
    }

    pub fn with_instance(mut self, alias: impl Into<String>, accessor: SharedAccessor) -> Self {
        self.instance.insert(alias.into(), accessor);
        self
    }

    /// Supplied schema, falling back to the built-in catalog.
    pub fn schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas
            .get(name)
            .cloned()
            .or_else(|| schema::builtin(name).map(Arc::new))
    }

    /// Adds the text of every validation rule to `sources`.
    pub fn register_rules(&mut self, sources: &mut SourceMap) {
        for schema in self.schemas.values() {
            if let Some(rule) = &schema.validation_rule {
                let id = sources.add_source(rule.source.clone(), rule.statement.clone());
                self.rule_sources.insert(schema.name.clone(), id);
            }
        }
    }

    fn rule_source(&self, schema: &Schema) -> Option<SourceId> {
        self.rule_sources.get(&schema.name).copied()
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("witness", &self.witness.keys().collect::<Vec<_>>())
            .field("instance", &self.instance.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Result of visiting a statement.
#[derive(Debug)]
pub struct VisitOutput {
    pub statement: Statement,
    pub diagnostics: Diagnostics,
}

pub struct StatementVisitor<'a> {
    data: &'a DataContext,
    source: SourceId,
    registry: &'a [GadgetDescriptor],
    /// Alias the reserved aliases stand for, in a nested statement
    parent_alias: Option<String>,
    subjects: IndexMap<String, Subject>,
    used: HashSet<String>,
    diagnostics: Diagnostics,
}

impl<'a> StatementVisitor<'a> {
    pub fn new(data: &'a DataContext, source: SourceId) -> Self {
        Self {
            data,
            source,
            registry: &GADGETS,
            parent_alias: None,
            subjects: IndexMap::new(),
            used: HashSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Uses `registry` instead of the link-time gadget registry.
    pub fn with_registry(mut self, registry: &'a [GadgetDescriptor]) -> Self {
        self.registry = registry;
        self
    }

    /// Visits a nested statement where the reserved aliases mean `parent_alias`.
    pub fn nested(mut self, parent_alias: impl Into<String>) -> Self {
        self.parent_alias = Some(parent_alias.into());
        self
    }

    /// Visits a top-level statement and optimizes its gadgets.
    pub fn visit(mut self, tree: &StatementTree, optimizer: &Optimizer) -> CompileResult<VisitOutput> {
        let mut gadgets = self.collect(tree)?;
        gadgets.extend(self.apply_validation_rules()?);

        let gadgets = optimizer.optimize(gadgets)?;
        debug!(
            source = %tree.source,
            subjects = self.subjects.len(),
            gadgets = gadgets.len(),
            "statement visited"
        );

        Ok(VisitOutput {
            statement: Statement::new(self.subjects, gadgets),
            diagnostics: self.diagnostics,
        })
    }

    /// Resolves subjects and predicates without optimizing.
    fn collect(&mut self, tree: &StatementTree) -> CompileResult<Vec<AnyGadget>> {
        debug!(
            source = %tree.source,
            subjects = tree.subjects.len(),
            predicates = tree.predicates.len(),
            nested = self.parent_alias.is_some(),
            "visiting statement"
        );

        for decl in &tree.subjects {
            self.visit_subject(decl)?;
        }

        let gadgets = tree
            .predicates
            .iter()
            .map(|predicate| self.visit_predicate(predicate))
            .collect::<CompileResult<Vec<_>>>()?;

        self.drop_unused_subjects();
        Ok(gadgets)
    }

    fn visit_subject(&mut self, decl: &SubjectDecl) -> CompileResult<()> {
        let alias = self.declared_alias(&decl.alias)?;
        let position = decl.alias.span.pin(self.source);

        if let Some(existing) = self.subjects.get(&alias) {
            return Err(CompileError::new(
                ErrorKind::DuplicateAlias,
                position,
                format!("Alias `{}` is already defined.", alias),
            )
            .with_label(existing.position(), "first defined here".to_string()));
        }

        let schema = self.data.schema(&decl.schema.name).ok_or_else(|| {
            CompileError::new(
                ErrorKind::UndefinedSchema,
                decl.schema.span.pin(self.source),
                format!("Undefined schema `{}`.", decl.schema.name),
            )
        })?;

        let subject = match decl.visibility {
            Visibility::Witness => {
                let data = self.data.witness.get(&alias).cloned();
                if data.is_none() && !self.data.witness.is_empty() {
                    return Err(CompileError::new(
                        ErrorKind::MissingWitnessData,
                        position,
                        format!("Missing witness data for subject `{}`.", alias),
                    ));
                }
                let metadata = self.data.instance.get(&alias).cloned();
                Subject::witness(alias.clone(), schema, data, metadata, position)
            }
            Visibility::Instance => {
                let data = self.data.instance.get(&alias).cloned();
                Subject::instance(alias.clone(), schema, data, position)?
            }
        };

        trace!(alias = %alias, schema = %decl.schema.name, witness = subject.is_witness(), "subject resolved");
        self.subjects.insert(alias, subject);
        Ok(())
    }

    /// Alias a subject is declared under, remapping reserved aliases.
    fn declared_alias(&self, ident: &Ident) -> CompileResult<String> {
        if !RESERVED_ALIASES.contains(&ident.name.as_str()) {
            return Ok(ident.name.clone());
        }
        match &self.parent_alias {
            Some(parent) => Ok(parent.clone()),
            None => Err(CompileError::new(
                ErrorKind::ReservedAlias,
                ident.span.pin(self.source),
                format!("Reserved keyword `{}` used as alias.", ident.name),
            )
            .with_note(format!(
                "`{}` is only available inside schema validation rules",
                ident.name
            ))),
        }
    }

    fn referenced_alias(&self, name: &str) -> String {
        match &self.parent_alias {
            Some(parent) if RESERVED_ALIASES.contains(&name) => parent.clone(),
            _ => name.to_string(),
        }
    }

    fn visit_predicate(&mut self, predicate: &Predicate) -> CompileResult<AnyGadget> {
        let position = predicate.span().pin(self.source);

        let descriptor = registry::lookup(self.registry, predicate.kind()).ok_or_else(|| {
            CompileError::internal(format!("no gadget registered for {} predicates", predicate.kind()))
                .with_label(position, "predicate without gadget".to_string())
        })?;

        let mut fields = FieldMap::new(position);
        for (name, element) in predicate.fields() {
            let value = self.resolve_element(element)?;
            fields.insert(name, value);
        }

        let gadget = (descriptor.construct)(fields).map_err(|error| {
            if error.position().is_some() {
                error
            } else {
                error.with_label(position, "in this predicate".to_string())
            }
        })?;

        trace!(gadget = %gadget, kind = %descriptor.gadget, "gadget constructed");
        Ok(gadget)
    }

    fn resolve_element(&mut self, element: PredicateElement<'_>) -> CompileResult<FieldValue> {
        Ok(match element {
            PredicateElement::Operand(operand) => FieldValue::Variable(self.resolve_operand(operand)?),
            PredicateElement::Absent => FieldValue::Absent,
            PredicateElement::List(operands) => FieldValue::List(
                operands
                    .iter()
                    .map(|operand| self.resolve_operand(operand))
                    .collect::<CompileResult<_>>()?,
            ),
            PredicateElement::Tree(tree) => FieldValue::Tree(self.resolve_tree(tree)?),
        })
    }

    fn resolve_tree(&mut self, tree: &OperandTree) -> CompileResult<VariableTree> {
        self.resolve_node(&tree.root)
    }

    fn resolve_node(&mut self, node: &TreeNode) -> CompileResult<VariableTree> {
        match node {
            TreeNode::Leaf(operand) => Ok(VariableTree::Leaf(self.resolve_operand(operand)?)),
            TreeNode::Branch { left, right } => Ok(VariableTree::branch(
                self.resolve_node(left)?,
                self.resolve_node(right)?,
            )),
        }
    }

    fn resolve_operand(&mut self, operand: &Operand) -> CompileResult<Variable> {
        match operand {
            Operand::Identifier(identifier) => {
                let position = identifier.span.pin(self.source);
                let alias = self.referenced_alias(&identifier.subject);

                let subject = self.subjects.get(&alias).ok_or_else(|| {
                    CompileError::new(
                        ErrorKind::UndeclaredAlias,
                        position,
                        format!("Undeclared alias `{}`.", identifier.subject),
                    )
                })?;
                let variable = subject.get_variable(&identifier.selector, position)?;

                self.used.insert(alias);
                Ok(variable)
            }
            Operand::Literal(literal) => {
                let position = literal.span.pin(self.source);
                let value = Literal::from_syntax(&literal.kind).map_err(|error| {
                    CompileError::new(
                        ErrorKind::InvalidValue,
                        position,
                        format!("Invalid literal: {}.", error),
                    )
                })?;
                Ok(Variable::instance(value, position, None))
            }
        }
    }

    fn drop_unused_subjects(&mut self) {
        let unused: Vec<String> = self
            .subjects
            .keys()
            .filter(|alias| !self.used.contains(*alias))
            .cloned()
            .collect();

        for alias in unused {
            let Some(subject) = self.subjects.shift_remove(&alias) else {
                continue;
            };
            if self.parent_alias.as_deref() == Some(alias.as_str()) {
                continue;
            }
            warn!(alias = %alias, "subject declared but never used");
            self.diagnostics.push(CompileError::warning(
                ErrorKind::UnusedSubject,
                subject.position(),
                format!("Subject `{}` is declared but never used.", alias),
            ));
        }
    }

    /// Gadgets of the validation rules of every used witness subject.
    fn apply_validation_rules(&mut self) -> CompileResult<Vec<AnyGadget>> {
        let mut gadgets = Vec::new();

        for subject in self.subjects.values().filter(|s| s.is_witness()) {
            let schema = subject.schema();
            let Some(rule) = &schema.validation_rule else {
                continue;
            };
            let source = self.data.rule_source(schema).ok_or_else(|| {
                CompileError::internal(format!(
                    "validation rule of schema `{}` was not registered",
                    schema.name
                ))
            })?;

            debug!(alias = %subject.alias(), schema = %schema.name, "applying validation rule");
            let mut nested = StatementVisitor::new(self.data, source)
                .with_registry(self.registry)
                .nested(subject.alias());
            gadgets.extend(nested.collect(rule)?);
            self.diagnostics.extend(nested.diagnostics);
        }
        Ok(gadgets)
    }
}
