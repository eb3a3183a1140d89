//! Gadgets: the instructions of the compiled statement.
//!
//! # Design
//!
//! Every gadget type implements [`Gadget`]: it is built from the named,
//! resolved fields of one predicate ([`Gadget::init_from`]), validates them
//! ([`Gadget::perform_checks`]), compares itself to other gadgets of its type
//! ([`Gadget::is_equal_to`]) and renders into a [`TargetFormat`].
//!
//! The optimizer and the code generator work on [`AnyGadget`], the closed sum
//! of all gadget types. Predicates find their gadget through the link-time
//! [`registry`].
//!
//! # Pipeline Position
//!
//! ```text
//! Predicate → fields() → [FieldMap] → Gadget::init_from → AnyGadget → Optimizer
//! ```

use std::fmt;

use indexmap::IndexMap;

use crate::data::{DataType, Variable};
use crate::error::{CompileError, CompileResult, ErrorKind};

pub mod bounds;
pub mod equality;
pub mod fields;
pub mod inequality;
pub mod merkle_tree;
pub mod mimc_hash;
pub mod registry;
pub mod set_membership;

pub use bounds::BoundsCheckGadget;
pub use equality::EqualityGadget;
pub use fields::{FieldMap, FieldValue, VariableTree};
pub use inequality::InequalityGadget;
pub use merkle_tree::MerkleTreeGadget;
pub use mimc_hash::MimcHashGadget;
pub use registry::{GadgetDescriptor, GADGETS};
pub use set_membership::SetMembershipGadget;

/// Discriminant of a gadget type, used to match optimizer rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GadgetKind {
    Equality,
    Inequality,
    BoundsCheck,
    SetMembership,
    MimcHash,
    MerkleTree,
}

impl GadgetKind {
    pub fn name(self) -> &'static str {
        match self {
            GadgetKind::Equality => "EqualityGadget",
            GadgetKind::Inequality => "InequalityGadget",
            GadgetKind::BoundsCheck => "BoundsCheckGadget",
            GadgetKind::SetMembership => "SetMembershipGadget",
            GadgetKind::MimcHash => "MimcHashGadget",
            GadgetKind::MerkleTree => "MerkleTreeGadget",
        }
    }
}

impl fmt::Display for GadgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rendered gadget: a template with `%(name)` placeholders and the variable
/// bound to each placeholder, in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFormat {
    pub template: String,
    pub bindings: IndexMap<String, Variable>,
}

impl TargetFormat {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            bindings: IndexMap::new(),
        }
    }

    pub fn bind(mut self, name: impl Into<String>, variable: &Variable) -> Self {
        self.bindings.insert(name.into(), variable.clone());
        self
    }
}

/// Construction, validation, comparison and rendering of one gadget type.
pub trait Gadget: Clone + fmt::Debug + Send + Sync + Sized + 'static {
    const KIND: GadgetKind;

    /// Builds the gadget from resolved predicate fields and checks it.
    fn init_from(fields: FieldMap) -> CompileResult<Self>;

    /// Rejects user-supplied values the gadget cannot represent.
    fn perform_checks(&self) -> CompileResult<()>;

    /// Whether both gadgets assert the same thing.
    fn is_equal_to(&self, other: &Self) -> bool;

    fn to_target_format(&self) -> TargetFormat;

    fn into_any(self) -> AnyGadget;

    fn from_any(gadget: &AnyGadget) -> Option<&Self>;
}

/// Any gadget, as held by the optimizer and the compiled statement.
#[derive(Debug, Clone)]
pub enum AnyGadget {
    Equality(EqualityGadget),
    Inequality(InequalityGadget),
    BoundsCheck(BoundsCheckGadget),
    SetMembership(SetMembershipGadget),
    MimcHash(MimcHashGadget),
    MerkleTree(MerkleTreeGadget),
}

macro_rules! dispatch {
    ($gadget:expr, $inner:ident => $body:expr) => {
        match $gadget {
            AnyGadget::Equality($inner) => $body,
            AnyGadget::Inequality($inner) => $body,
            AnyGadget::BoundsCheck($inner) => $body,
            AnyGadget::SetMembership($inner) => $body,
            AnyGadget::MimcHash($inner) => $body,
            AnyGadget::MerkleTree($inner) => $body,
        }
    };
}

impl AnyGadget {
    pub fn kind(&self) -> GadgetKind {
        dispatch!(self, g => kind_of(g))
    }

    pub fn perform_checks(&self) -> CompileResult<()> {
        dispatch!(self, g => g.perform_checks())
    }

    /// Same gadget type and [`Gadget::is_equal_to`].
    pub fn is_equal_to(&self, other: &AnyGadget) -> bool {
        match (self, other) {
            (AnyGadget::Equality(a), AnyGadget::Equality(b)) => a.is_equal_to(b),
            (AnyGadget::Inequality(a), AnyGadget::Inequality(b)) => a.is_equal_to(b),
            (AnyGadget::BoundsCheck(a), AnyGadget::BoundsCheck(b)) => a.is_equal_to(b),
            (AnyGadget::SetMembership(a), AnyGadget::SetMembership(b)) => a.is_equal_to(b),
            (AnyGadget::MimcHash(a), AnyGadget::MimcHash(b)) => a.is_equal_to(b),
            (AnyGadget::MerkleTree(a), AnyGadget::MerkleTree(b)) => a.is_equal_to(b),
            _ => false,
        }
    }

    pub fn to_target_format(&self) -> TargetFormat {
        dispatch!(self, g => g.to_target_format())
    }
}

fn kind_of<G: Gadget>(_: &G) -> GadgetKind {
    G::KIND
}

impl fmt::Display for AnyGadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = self.to_target_format();
        let mut text = format.template;
        for (name, variable) in &format.bindings {
            text = text.replace(&format!("%({})", name), &variable.describe());
        }
        f.write_str(&text)
    }
}

// Field contract checks shared by all gadgets.

/// Instance data is required: a witness here would be published.
pub(crate) fn require_instance(gadget: GadgetKind, field: &str, variable: &Variable) -> CompileResult<()> {
    if variable.is_witness() {
        return Err(CompileError::unpositioned(
            ErrorKind::WitnessExposure,
            format!(
                "{} expects instance data for `{}`, but `{}` is witness data and would be exposed.",
                gadget, field, variable
            ),
        )
        .with_variable(variable, format!("witness data used as `{}`", field)));
    }
    Ok(())
}

/// Witness data is required.
pub(crate) fn require_witness(gadget: GadgetKind, field: &str, variable: &Variable) -> CompileResult<()> {
    if variable.is_instance() {
        return Err(CompileError::unpositioned(
            ErrorKind::TypeMismatch,
            format!(
                "{} expects witness data for `{}`, found instance value `{}`.",
                gadget, field, variable
            ),
        )
        .with_variable(variable, format!("instance data used as `{}`", field)));
    }
    Ok(())
}

pub(crate) fn require_type(
    gadget: GadgetKind,
    field: &str,
    variable: &Variable,
    expected: DataType,
) -> CompileResult<()> {
    if variable.data_type() != expected {
        return Err(CompileError::unpositioned(
            ErrorKind::TypeMismatch,
            format!(
                "{} expects {} for `{}`, found {} `{}`.",
                gadget,
                expected,
                field,
                variable.data_type(),
                variable
            ),
        )
        .with_variable(variable, format!("expected {}", expected)));
    }
    Ok(())
}

/// Both sides of a comparison must share a declared type.
pub(crate) fn require_same_type(gadget: GadgetKind, left: &Variable, right: &Variable) -> CompileResult<()> {
    if left.data_type() != right.data_type() {
        return Err(CompileError::unpositioned(
            ErrorKind::TypeMismatch,
            format!(
                "{} cannot compare {} `{}` with {} `{}`.",
                gadget,
                left.data_type(),
                left,
                right.data_type(),
                right
            ),
        )
        .with_variable(left, left.data_type().name())
        .with_variable(right, right.data_type().name()));
    }
    Ok(())
}

/// Unordered comparison of two variable pairs.
pub(crate) fn same_pair(a: (&Variable, &Variable), b: (&Variable, &Variable)) -> bool {
    (a.0 == b.0 && a.1 == b.1) || (a.0 == b.1 && a.1 == b.0)
}

/// Two instance variables with known, differing values.
pub(crate) fn distinct_instances(left: &Variable, right: &Variable) -> bool {
    left.is_instance()
        && right.is_instance()
        && !left.value().is_opaque()
        && !right.value().is_opaque()
        && left.value() != right.value()
}

/// Both sides are the same operand, judged without concrete witness values.
///
/// Known witness values may coincide by accident, so only instances and
/// opaque witness fields count.
pub(crate) fn same_operand(left: &Variable, right: &Variable) -> bool {
    left == right && (left.is_instance() || left.value().is_opaque())
}
