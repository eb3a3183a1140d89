//! `left != right`

use linkme::distributed_slice;
use strata_ast::PredicateKind;

use super::equality::EqualityGadget;
use super::fields::FieldMap;
use super::registry::{GadgetDescriptor, GADGETS};
use super::{distinct_instances, require_same_type, same_operand, same_pair, AnyGadget, Gadget, GadgetKind, TargetFormat};
use crate::data::Variable;
use crate::error::{CompileError, CompileResult, ErrorKind};

#[distributed_slice(GADGETS)]
static INEQUALITY: GadgetDescriptor =
    GadgetDescriptor::of::<InequalityGadget>(PredicateKind::Inequality);

#[derive(Debug, Clone)]
pub struct InequalityGadget {
    pub left: Variable,
    pub right: Variable,
}

impl InequalityGadget {
    pub fn new(left: Variable, right: Variable) -> Self {
        Self { left, right }
    }
}

impl Gadget for InequalityGadget {
    const KIND: GadgetKind = GadgetKind::Inequality;

    fn init_from(mut fields: FieldMap) -> CompileResult<Self> {
        let gadget = Self {
            left: fields.take_variable("left")?,
            right: fields.take_variable("right")?,
        };
        gadget.perform_checks()?;
        Ok(gadget)
    }

    fn perform_checks(&self) -> CompileResult<()> {
        require_same_type(Self::KIND, &self.left, &self.right)
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        same_pair((&self.left, &self.right), (&other.left, &other.right))
    }

    fn to_target_format(&self) -> TargetFormat {
        TargetFormat::new("NOT_EQUALS %(left) %(right)")
            .bind("left", &self.left)
            .bind("right", &self.right)
    }

    fn into_any(self) -> AnyGadget {
        AnyGadget::Inequality(self)
    }

    fn from_any(gadget: &AnyGadget) -> Option<&Self> {
        match gadget {
            AnyGadget::Inequality(g) => Some(g),
            _ => None,
        }
    }
}

pub fn unequal_to_itself(gadget: &InequalityGadget) -> CompileResult<()> {
    if same_operand(&gadget.left, &gadget.right) {
        return Err(CompileError::unpositioned(
            ErrorKind::Contradiction,
            format!("Contradiction: `{}` cannot be unequal to itself.", gadget.left),
        )
        .with_variable(&gadget.left, "left side")
        .with_variable(&gadget.right, "right side"));
    }
    Ok(())
}

pub fn equal_and_unequal(equality: &EqualityGadget, inequality: &InequalityGadget) -> CompileResult<()> {
    if same_pair(
        (&equality.left, &equality.right),
        (&inequality.left, &inequality.right),
    ) {
        return Err(CompileError::unpositioned(
            ErrorKind::Contradiction,
            format!(
                "Contradiction: `{}` and `{}` are required to be both equal and unequal.",
                equality.left, equality.right
            ),
        )
        .with_variable(&equality.left, "asserted equal here")
        .with_variable(&inequality.left, "asserted unequal here"));
    }
    Ok(())
}

/// Two different public values are unequal anyway.
pub fn remove_distinct_instances(gadget: &InequalityGadget) -> Option<Vec<AnyGadget>> {
    distinct_instances(&gadget.left, &gadget.right).then(Vec::new)
}
