//! Syntax tree handed over by the Strata parser.
//!
//! These types are the parser's output contract. They carry spans relative to
//! the statement text and nothing else: no schema knowledge, no resolved data.

pub mod operand;
pub mod predicate;
pub mod statement;

pub use operand::{Identifier, LiteralExpr, LiteralKind, Operand, OperandTree, TreeNode};
pub use predicate::{
    BoundsCheck, Equality, Inequality, MerkleTree, MimcHash, Predicate, PredicateElement,
    PredicateKind, SetMembership,
};
pub use statement::{Ident, StatementTree, SubjectDecl, Visibility};
