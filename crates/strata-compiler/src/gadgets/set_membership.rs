//! `member IN (a, b, c)`

use linkme::distributed_slice;
use strata_ast::PredicateKind;

use super::equality::EqualityGadget;
use super::fields::FieldMap;
use super::registry::{GadgetDescriptor, GADGETS};
use super::{require_instance, require_same_type, AnyGadget, Gadget, GadgetKind, TargetFormat};
use crate::data::Variable;
use crate::error::{CompileError, CompileResult, ErrorKind};

#[distributed_slice(GADGETS)]
static SET_MEMBERSHIP: GadgetDescriptor =
    GadgetDescriptor::of::<SetMembershipGadget>(PredicateKind::SetMembership);

#[derive(Debug, Clone)]
pub struct SetMembershipGadget {
    pub member: Variable,
    /// Public set elements, in statement order
    pub set: Vec<Variable>,
}

impl SetMembershipGadget {
    pub fn new(member: Variable, set: Vec<Variable>) -> Self {
        Self { member, set }
    }

    fn contains(&self, variable: &Variable) -> bool {
        self.set.iter().any(|element| element == variable)
    }
}

impl Gadget for SetMembershipGadget {
    const KIND: GadgetKind = GadgetKind::SetMembership;

    fn init_from(mut fields: FieldMap) -> CompileResult<Self> {
        let position = fields.position();
        let gadget = Self {
            member: fields.take_variable("member")?,
            set: fields.take_list("set")?,
        };
        if gadget.set.is_empty() {
            return Err(CompileError::new(
                ErrorKind::InvalidValue,
                position,
                "Set membership requires a non-empty set.".to_string(),
            ));
        }
        gadget.perform_checks()?;
        Ok(gadget)
    }

    fn perform_checks(&self) -> CompileResult<()> {
        for (index, element) in self.set.iter().enumerate() {
            require_instance(Self::KIND, &format!("set_{}", index), element)?;
            require_same_type(Self::KIND, &self.member, element)?;

            if let Some(first) = self.set[..index].iter().find(|e| *e == element) {
                return Err(CompileError::unpositioned(
                    ErrorKind::DuplicateElement,
                    format!("Set contains duplicate element {}.", element),
                )
                .with_variable(element, "duplicate element")
                .with_variable(first, "first occurrence"));
            }
        }
        Ok(())
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self.member == other.member
            && self.set.len() == other.set.len()
            && self.set.iter().all(|element| other.contains(element))
    }

    fn to_target_format(&self) -> TargetFormat {
        let mut template = String::from("SET_MEMBERSHIP %(member)");
        let mut format = TargetFormat::new(String::new()).bind("member", &self.member);
        for (index, element) in self.set.iter().enumerate() {
            let name = format!("set_{}", index);
            template.push_str(&format!(" %({})", name));
            format = format.bind(name, element);
        }
        format.template = template;
        format
    }

    fn into_any(self) -> AnyGadget {
        AnyGadget::SetMembership(self)
    }

    fn from_any(gadget: &AnyGadget) -> Option<&Self> {
        match gadget {
            AnyGadget::SetMembership(g) => Some(g),
            _ => None,
        }
    }
}

/// A public member that is not among the public elements.
pub fn public_non_member(gadget: &SetMembershipGadget) -> CompileResult<()> {
    if gadget.member.is_instance() && !gadget.member.value().is_opaque() && !gadget.contains(&gadget.member) {
        return Err(CompileError::unpositioned(
            ErrorKind::Contradiction,
            format!("Contradiction: {} is not an element of the set.", gadget.member),
        )
        .with_variable(&gadget.member, "member"));
    }
    Ok(())
}

/// Membership in a single-element set is equality.
pub fn single_element(gadget: &SetMembershipGadget) -> Option<Vec<AnyGadget>> {
    match gadget.set.as_slice() {
        [only] => Some(vec![EqualityGadget::new(gadget.member.clone(), only.clone()).into_any()]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadgets::fields::FieldValue;
    use crate::gadgets::test_support::{int, pos, text, witness};

    fn fields(member: Variable, set: Vec<Variable>) -> FieldMap {
        FieldMap::new(pos(0))
            .with("member", FieldValue::Variable(member))
            .with("set", FieldValue::List(set))
    }

    #[test]
    fn test_duplicate_element_rejected() {
        let err = SetMembershipGadget::init_from(fields(witness("a"), vec![int(1), int(2), int(1)])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateElement);
        assert!(err.to_string().contains("duplicate element"));
    }

    #[test]
    fn test_set_elements_must_be_public_and_typed() {
        let err = SetMembershipGadget::init_from(fields(int(1), vec![witness("a")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WitnessExposure);

        let err = SetMembershipGadget::init_from(fields(witness("a"), vec![text("x")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);

        let err = SetMembershipGadget::init_from(fields(witness("a"), vec![])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_equality_ignores_element_order() {
        let a = SetMembershipGadget::new(witness("a"), vec![int(1), int(2)]);
        let b = SetMembershipGadget::new(witness("a"), vec![int(2), int(1)]);
        assert!(a.is_equal_to(&b));
        assert!(!a.is_equal_to(&SetMembershipGadget::new(witness("a"), vec![int(1)])));
    }

    #[test]
    fn test_target_format_enumerates_elements() {
        let format = SetMembershipGadget::new(witness("a"), vec![int(1), int(2)]).to_target_format();
        assert_eq!(format.template, "SET_MEMBERSHIP %(member) %(set_0) %(set_1)");
        assert_eq!(format.bindings.len(), 3);
    }

    #[test]
    fn test_public_non_member_contradicts() {
        assert!(public_non_member(&SetMembershipGadget::new(int(3), vec![int(1), int(2)])).is_err());
        assert!(public_non_member(&SetMembershipGadget::new(int(2), vec![int(1), int(2)])).is_ok());
        assert!(public_non_member(&SetMembershipGadget::new(witness("a"), vec![int(1)])).is_ok());
    }

    #[test]
    fn test_single_element_becomes_equality() {
        let replaced = single_element(&SetMembershipGadget::new(witness("a"), vec![int(1)])).unwrap();
        assert!(replaced[0].is_equal_to(&EqualityGadget::new(witness("a"), int(1)).into_any()));
    }
}
