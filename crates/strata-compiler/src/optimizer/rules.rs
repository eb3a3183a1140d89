//! Typed optimizer rules.
//!
//! A rule is a plain function over one or two concrete gadget types. Wrapping
//! it with [`unary`] or [`binary`] erases the types: the wrapper only applies
//! the function when the gadgets' kinds match its signature, in either order
//! for binary rules.
//!
//! Rules live next to the gadget they concern; [`RuleSet::standard`] lists
//! them in priority order.

use crate::gadgets::{bounds, equality, inequality, mimc_hash, set_membership, AnyGadget, Gadget};
use crate::error::CompileResult;

/// Outcome of a contradiction rule.
pub type Check = CompileResult<()>;
/// Outcome of an implication rule: a gadget implied by the pair, if any.
pub type Implied = Option<AnyGadget>;
/// Outcome of a substitution rule: the replacement for the matched gadgets.
pub type Replacement = Option<Vec<AnyGadget>>;

type UnaryFn<O> = Box<dyn Fn(&AnyGadget) -> Option<O> + Send + Sync>;
type BinaryFn<O> = Box<dyn Fn(&AnyGadget, &AnyGadget) -> Option<O> + Send + Sync>;

/// A type-erased rule producing `O` when its signature matches.
pub enum Rule<O> {
    Unary { name: &'static str, apply: UnaryFn<O> },
    Binary { name: &'static str, apply: BinaryFn<O> },
}

impl<O> Rule<O> {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Unary { name, .. } | Rule::Binary { name, .. } => *name,
        }
    }
}

/// Wraps a rule over a single gadget of type `A`.
pub fn unary<A: Gadget, O: 'static>(name: &'static str, rule: fn(&A) -> O) -> Rule<O> {
    Rule::Unary {
        name,
        apply: Box::new(move |gadget| A::from_any(gadget).map(rule)),
    }
}

/// Wraps a rule over a pair of gadgets of types `A` and `B`, matched in either order.
pub fn binary<A: Gadget, B: Gadget, O: 'static>(name: &'static str, rule: fn(&A, &B) -> O) -> Rule<O> {
    Rule::Binary {
        name,
        apply: Box::new(move |x, y| {
            if let (Some(a), Some(b)) = (A::from_any(x), B::from_any(y)) {
                Some(rule(a, b))
            } else if let (Some(a), Some(b)) = (A::from_any(y), B::from_any(x)) {
                Some(rule(a, b))
            } else {
                None
            }
        }),
    }
}

/// Contradiction, implication and substitution rules, each in priority order.
pub struct RuleSet {
    pub contradictions: Vec<Rule<Check>>,
    pub implications: Vec<Rule<Implied>>,
    pub substitutions: Vec<Rule<Replacement>>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self {
            contradictions: Vec::new(),
            implications: Vec::new(),
            substitutions: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        use bounds::BoundsCheckGadget as Bounds;
        use equality::EqualityGadget as Equality;
        use inequality::InequalityGadget as Inequality;
        use mimc_hash::MimcHashGadget as MimcHash;
        use set_membership::SetMembershipGadget as SetMembership;

        Self {
            contradictions: vec![
                unary::<Bounds, _>("empty bounds range", bounds::empty_range),
                binary::<Bounds, Bounds, _>("disjoint bounds ranges", bounds::disjoint_ranges),
                unary::<Equality, _>("unequal instances", equality::contradicting_instances),
                unary::<Inequality, _>("self inequality", inequality::unequal_to_itself),
                binary::<Equality, Inequality, _>("equal and unequal", inequality::equal_and_unequal),
                unary::<SetMembership, _>("public non-member", set_membership::public_non_member),
                binary::<MimcHash, MimcHash, _>("conflicting hash images", mimc_hash::conflicting_images),
            ],
            implications: vec![
                binary::<Equality, Bounds, _>("bounds over equality", bounds::carry_over_equality),
                binary::<Equality, Equality, _>("equality transitivity", equality::transitivity),
            ],
            substitutions: vec![
                unary::<Bounds, _>("point range", bounds::collapse_point_range),
                binary::<Bounds, Bounds, _>("shared boundary", bounds::shared_boundary),
                binary::<Bounds, Bounds, _>("range intersection", bounds::intersect_ranges),
                unary::<Equality, _>("tautology", equality::remove_tautology),
                unary::<Inequality, _>("distinct instances", inequality::remove_distinct_instances),
                unary::<SetMembership, _>("single element set", set_membership::single_element),
            ],
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}
