//! `left == right`

use linkme::distributed_slice;
use strata_ast::PredicateKind;

use super::fields::FieldMap;
use super::registry::{GadgetDescriptor, GADGETS};
use super::{distinct_instances, require_same_type, same_operand, AnyGadget, Gadget, GadgetKind, TargetFormat};
use crate::data::Variable;
use crate::error::{CompileError, CompileResult, ErrorKind};

#[distributed_slice(GADGETS)]
static EQUALITY: GadgetDescriptor = GadgetDescriptor::of::<EqualityGadget>(PredicateKind::Equality);

#[derive(Debug, Clone)]
pub struct EqualityGadget {
    pub left: Variable,
    pub right: Variable,
}

impl EqualityGadget {
    /// Builds an equality between two variables already known to share a type.
    pub fn new(left: Variable, right: Variable) -> Self {
        Self { left, right }
    }

    /// The other side, if `variable` is one side of this equality.
    pub fn counterpart(&self, variable: &Variable) -> Option<&Variable> {
        if &self.left == variable {
            Some(&self.right)
        } else if &self.right == variable {
            Some(&self.left)
        } else {
            None
        }
    }
}

impl Gadget for EqualityGadget {
    const KIND: GadgetKind = GadgetKind::Equality;

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
        super::same_pair((&self.left, &self.right), (&other.left, &other.right))
    }

    fn to_target_format(&self) -> TargetFormat {
        TargetFormat::new("EQUALS %(left) %(right)")
            .bind("left", &self.left)
            .bind("right", &self.right)
    }

    fn into_any(self) -> AnyGadget {
        AnyGadget::Equality(self)
    }

    fn from_any(gadget: &AnyGadget) -> Option<&Self> {
        match gadget {
            AnyGadget::Equality(g) => Some(g),
            _ => None,
        }
    }
}

/// Two different public values can never be equal.
pub fn contradicting_instances(gadget: &EqualityGadget) -> CompileResult<()> {
    if distinct_instances(&gadget.left, &gadget.right) {
        return Err(CompileError::unpositioned(
            ErrorKind::Contradiction,
            format!(
                "Contradiction: `{}` can never equal `{}`.",
                gadget.left, gadget.right
            ),
        )
        .with_variable(&gadget.left, "left side")
        .with_variable(&gadget.right, "right side"));
    }
    Ok(())
}

/// Equalities sharing a side imply equality of their other sides.
pub fn transitivity(a: &EqualityGadget, b: &EqualityGadget) -> Option<AnyGadget> {
    let (x, y) = if let Some(other) = b.counterpart(&a.left) {
        (&a.right, other)
    } else if let Some(other) = b.counterpart(&a.right) {
        (&a.left, other)
    } else {
        return None;
    };

    if x == y {
        return None;
    }
    Some(EqualityGadget::new(x.clone(), y.clone()).into_any())
}

/// `x == x` holds trivially.
pub fn remove_tautology(gadget: &EqualityGadget) -> Option<Vec<AnyGadget>> {
    same_operand(&gadget.left, &gadget.right).then(Vec::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadgets::fields::FieldValue;
    use crate::gadgets::test_support::{int, known_witness, pos, text, witness};

    fn fields(left: Variable, right: Variable) -> FieldMap {
        FieldMap::new(pos(0))
            .with("left", FieldValue::Variable(left))
            .with("right", FieldValue::Variable(right))
    }

    #[test]
    fn test_init_checks_types() {
        assert!(EqualityGadget::init_from(fields(witness("dateOfBirth"), int(1))).is_ok());

        let err = EqualityGadget::init_from(fields(witness("dateOfBirth"), text("x"))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_equality_is_symmetric() {
        let a = EqualityGadget::new(witness("a"), int(1));
        let b = EqualityGadget::new(int(1), witness("a"));
        assert!(a.is_equal_to(&b));
        assert!(!a.is_equal_to(&EqualityGadget::new(witness("a"), int(2))));
    }

    #[test]
    fn test_target_format() {
        let format = EqualityGadget::new(witness("a"), int(1)).to_target_format();
        assert_eq!(format.template, "EQUALS %(left) %(right)");
        assert_eq!(format.bindings.keys().collect::<Vec<_>>(), vec!["left", "right"]);
    }

    #[test]
    fn test_distinct_instances_contradict() {
        let err = contradicting_instances(&EqualityGadget::new(int(1), int(2))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contradiction);
        assert_eq!(err.labels.len(), 2);
        assert!(contradicting_instances(&EqualityGadget::new(witness("a"), int(2))).is_ok());
    }

    #[test]
    fn test_transitivity() {
        let a = EqualityGadget::new(witness("a"), witness("b"));
        let b = EqualityGadget::new(witness("b"), int(7));
        let implied = transitivity(&a, &b).unwrap();
        assert!(implied.is_equal_to(&EqualityGadget::new(witness("a"), int(7)).into_any()));

        let unrelated = EqualityGadget::new(witness("c"), int(7));
        assert!(transitivity(&a, &unrelated).is_none());
    }

    #[test]
    fn test_tautology_removed() {
        assert_eq!(remove_tautology(&EqualityGadget::new(witness("a"), witness("a"))).map(|g| g.len()), Some(0));
        assert!(remove_tautology(&EqualityGadget::new(witness("a"), int(1))).is_none());
        assert_eq!(remove_tautology(&EqualityGadget::new(int(1), int(1))).map(|g| g.len()), Some(0));
    }

    #[test]
    fn test_matching_known_witnesses_are_kept() {
        let first = known_witness("firstName", "Alice");
        let last = known_witness("lastName", "Alice");
        assert!(remove_tautology(&EqualityGadget::new(first, last)).is_none());
    }
}
