//! Predicate → gadget registry.
//!
//! # Architecture
//!
//! The registry uses [`linkme::distributed_slice`] for link-time registration:
//!
//! 1. Each gadget module declares a [`GadgetDescriptor`] in [`GADGETS`]
//! 2. At link time, all descriptors are collected into the slice
//! 3. The visitor looks up the descriptor for a predicate's kind and calls its
//!    constructor with the resolved fields
//!
//! # Example Registration
//!
//! ```ignore
//! #[distributed_slice(GADGETS)]
//! static EQUALITY: GadgetDescriptor = GadgetDescriptor::of::<EqualityGadget>(PredicateKind::Equality);
//! ```

use linkme::distributed_slice;
use strata_ast::PredicateKind;

use super::fields::FieldMap;
use super::{AnyGadget, Gadget, GadgetKind};
use crate::error::CompileResult;

/// Signature of a type-erased gadget constructor.
pub type ConstructFn = fn(FieldMap) -> CompileResult<AnyGadget>;

/// Descriptor for a registered gadget.
pub struct GadgetDescriptor {
    /// Predicate this gadget compiles
    pub predicate: PredicateKind,
    pub gadget: GadgetKind,
    pub construct: ConstructFn,
}

impl GadgetDescriptor {
    pub const fn of<G: Gadget>(predicate: PredicateKind) -> Self {
        Self {
            predicate,
            gadget: G::KIND,
            construct: construct::<G>,
        }
    }
}

fn construct<G: Gadget>(fields: FieldMap) -> CompileResult<AnyGadget> {
    G::init_from(fields).map(Gadget::into_any)
}

/// Distributed slice collecting all gadget registrations.
#[distributed_slice]
pub static GADGETS: [GadgetDescriptor];

/// Look up the gadget registered for a predicate.
pub fn lookup(registry: &[GadgetDescriptor], predicate: PredicateKind) -> Option<&GadgetDescriptor> {
    registry.iter().find(|d| d.predicate == predicate)
}

/// Look up in the link-time registry.
pub fn get(predicate: PredicateKind) -> Option<&'static GadgetDescriptor> {
    lookup(&GADGETS, predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_predicate_has_exactly_one_gadget() {
        for kind in PredicateKind::ALL {
            let count = GADGETS.iter().filter(|d| d.predicate == kind).count();
            assert_eq!(count, 1, "predicate {} registered {} times", kind, count);
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(get(PredicateKind::BoundsCheck).map(|d| d.gadget), Some(GadgetKind::BoundsCheck));
        assert!(lookup(&[], PredicateKind::Equality).is_none());
    }
}
