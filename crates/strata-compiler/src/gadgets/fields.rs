//! Named, resolved predicate fields handed to gadget constructors.

use indexmap::IndexMap;
use strata_ast::Position;

use crate::data::Variable;
use crate::error::{CompileError, CompileResult};

/// One resolved predicate argument.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Variable(Variable),
    /// Optional argument left out of the statement
    Absent,
    List(Vec<Variable>),
    Tree(VariableTree),
}

/// Binary tree of variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableTree {
    Leaf(Variable),
    Branch(Box<VariableTree>, Box<VariableTree>),
}

impl VariableTree {
    pub fn branch(left: VariableTree, right: VariableTree) -> Self {
        VariableTree::Branch(Box::new(left), Box::new(right))
    }

    /// Leaves from left to right.
    pub fn leaves(&self) -> Vec<&Variable> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Variable>) {
        match self {
            VariableTree::Leaf(variable) => leaves.push(variable),
            VariableTree::Branch(left, right) => {
                left.collect_leaves(leaves);
                right.collect_leaves(leaves);
            }
        }
    }
}

/// Fields of one predicate, keyed by field name.
///
/// The `take_*` accessors remove a field and check its shape. A missing
/// field or a field of the wrong shape means the predicate and the gadget
/// disagree about their contract, which is a compiler bug.
#[derive(Debug, Clone)]
pub struct FieldMap {
    position: Position,
    fields: IndexMap<&'static str, FieldValue>,
}

impl FieldMap {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            fields: IndexMap::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.fields.insert(name, value);
    }

    /// Position of the predicate the fields were resolved from.
    pub fn position(&self) -> Position {
        self.position
    }

    fn take(&mut self, name: &str) -> CompileResult<FieldValue> {
        self.fields.shift_remove(name).ok_or_else(|| {
            CompileError::internal(format!("field `{}` missing from predicate fields", name))
                .with_label(self.position, "while constructing a gadget for this predicate".to_string())
        })
    }

    fn shape_error(&self, name: &str, expected: &str) -> CompileError {
        CompileError::internal(format!("field `{}` is not {}", name, expected))
            .with_label(self.position, "while constructing a gadget for this predicate".to_string())
    }

    pub fn take_variable(&mut self, name: &str) -> CompileResult<Variable> {
        match self.take(name)? {
            FieldValue::Variable(variable) => Ok(variable),
            _ => Err(self.shape_error(name, "a single value")),
        }
    }

    /// A field that may be [`FieldValue::Absent`].
    pub fn take_optional(&mut self, name: &str) -> CompileResult<Option<Variable>> {
        match self.take(name)? {
            FieldValue::Variable(variable) => Ok(Some(variable)),
            FieldValue::Absent => Ok(None),
            _ => Err(self.shape_error(name, "an optional value")),
        }
    }

    pub fn take_list(&mut self, name: &str) -> CompileResult<Vec<Variable>> {
        match self.take(name)? {
            FieldValue::List(items) => Ok(items),
            _ => Err(self.shape_error(name, "a list")),
        }
    }

    pub fn take_tree(&mut self, name: &str) -> CompileResult<VariableTree> {
        match self.take(name)? {
            FieldValue::Tree(tree) => Ok(tree),
            _ => Err(self.shape_error(name, "a tree")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadgets::test_support::{int, pos, witness};

    #[test]
    fn test_missing_field_is_internal() {
        let mut fields = FieldMap::new(pos(0)).with("left", FieldValue::Variable(int(1)));
        assert!(fields.take_variable("left").is_ok());

        let err = fields.take_variable("right").unwrap_err();
        assert!(err.is_internal());
        assert!(err.message.contains("right"));
    }

    #[test]
    fn test_shape_mismatch_is_internal() {
        let mut fields = FieldMap::new(pos(0)).with("set", FieldValue::Variable(int(1)));
        assert!(fields.take_list("set").unwrap_err().is_internal());
    }

    #[test]
    fn test_optional_field() {
        let mut fields = FieldMap::new(pos(0))
            .with("min", FieldValue::Absent)
            .with("max", FieldValue::Variable(int(9)));
        assert_eq!(fields.take_optional("min").unwrap(), None);
        assert_eq!(fields.take_optional("max").unwrap(), Some(int(9)));
    }

    #[test]
    fn test_tree_leaves_in_order() {
        let tree = VariableTree::branch(
            VariableTree::branch(VariableTree::Leaf(witness("a")), VariableTree::Leaf(int(1))),
            VariableTree::Leaf(int(2)),
        );
        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(leaves[0], &witness("a"));
        assert_eq!(leaves[2], &int(2));
    }
}
