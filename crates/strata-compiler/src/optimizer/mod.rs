//! Rule-based gadget optimizer.
//!
//! # Design
//!
//! The optimizer runs the [`RuleSet`] over a gadget collection until nothing
//! changes. Each iteration:
//!
//! 1. runs every contradiction rule over every gadget and every unordered
//!    pair; the first contradiction aborts the compile
//! 2. adds every gadget implied by a pair that was never in the collection
//! 3. applies the first matching substitution, in rule priority and then
//!    collection order
//!
//! The collection is a set under [`AnyGadget::is_equal_to`]: inserting a
//! gadget equal to one already present is a no-op. Gadgets that were ever in
//! the collection are never implied again, so implications cannot cycle.
//!
//! # Pipeline Position
//!
//! ```text
//! Visitor → [Optimizer] → Statement → Codegen
//! ```

pub mod rules;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::error::{CompileError, CompileResult};
use crate::gadgets::AnyGadget;

pub use rules::{Rule, RuleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Iterations after which the rule set is considered non-terminating
    pub max_iterations: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
        }
    }
}

pub struct Optimizer {
    rules: RuleSet,
    config: OptimizerConfig,
}

/// Ordered gadget set; equal gadgets are kept once, in first-seen order.
#[derive(Debug, Default)]
struct GadgetSet {
    gadgets: Vec<AnyGadget>,
}

impl GadgetSet {
    fn contains(&self, gadget: &AnyGadget) -> bool {
        self.gadgets.iter().any(|g| g.is_equal_to(gadget))
    }

    fn insert(&mut self, gadget: AnyGadget) -> bool {
        if self.contains(&gadget) {
            return false;
        }
        self.gadgets.push(gadget);
        true
    }

    fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.gadgets.len();
        (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
    }
}

/// Gadgets matched by a substitution, and what replaces them.
struct Substitution {
    rule: &'static str,
    matched: Vec<usize>,
    replacement: Vec<AnyGadget>,
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_rules(RuleSet::standard(), config)
    }

    pub fn with_rules(rules: RuleSet, config: OptimizerConfig) -> Self {
        Self { rules, config }
    }

    /// Runs all rules to a fixpoint.
    #[instrument(skip_all, name = "optimize", fields(gadgets = gadgets.len()))]
    pub fn optimize(&self, gadgets: Vec<AnyGadget>) -> CompileResult<Vec<AnyGadget>> {
        let mut collection = GadgetSet::default();
        for gadget in gadgets {
            collection.insert(gadget);
        }
        let mut seen = GadgetSet {
            gadgets: collection.gadgets.clone(),
        };

        for iteration in 0..self.config.max_iterations {
            trace!(iteration, gadgets = collection.gadgets.len(), "optimizer iteration");

            self.check_contradictions(&collection)?;

            let mut changed = false;
            for gadget in self.implications(&collection, &seen) {
                info!(gadget = %gadget, "implied");
                seen.insert(gadget.clone());
                changed |= collection.insert(gadget);
            }

            if let Some(substitution) = self.find_substitution(&collection) {
                for &index in substitution.matched.iter().rev() {
                    let removed = collection.gadgets.remove(index);
                    info!(rule = substitution.rule, gadget = %removed, "substituted");
                }
                for gadget in substitution.replacement {
                    debug!(rule = substitution.rule, gadget = %gadget, "replacement");
                    seen.insert(gadget.clone());
                    collection.insert(gadget);
                }
                changed = true;
            }

            if !changed {
                debug!(iterations = iteration + 1, gadgets = collection.gadgets.len(), "optimizer converged");
                return Ok(collection.gadgets);
            }
        }

        Err(CompileError::internal(format!(
            "optimizer did not reach a fixpoint within {} iterations",
            self.config.max_iterations
        )))
    }

    fn check_contradictions(&self, collection: &GadgetSet) -> CompileResult<()> {
        let gadgets = &collection.gadgets;
        for rule in &self.rules.contradictions {
            match rule {
                Rule::Unary { apply, .. } => {
                    for gadget in gadgets {
                        apply(gadget).unwrap_or(Ok(()))?;
                    }
                }
                Rule::Binary { apply, .. } => {
                    for (i, j) in collection.pairs() {
                        apply(&gadgets[i], &gadgets[j]).unwrap_or(Ok(()))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn implications(&self, collection: &GadgetSet, seen: &GadgetSet) -> Vec<AnyGadget> {
        let gadgets = &collection.gadgets;
        let mut implied = GadgetSet::default();

        for rule in &self.rules.implications {
            let Rule::Binary { apply, .. } = rule else {
                continue;
            };
            for (i, j) in collection.pairs() {
                if let Some(Some(gadget)) = apply(&gadgets[i], &gadgets[j]) {
                    if !seen.contains(&gadget) {
                        implied.insert(gadget);
                    }
                }
            }
        }
        implied.gadgets
    }

    fn find_substitution(&self, collection: &GadgetSet) -> Option<Substitution> {
        let gadgets = &collection.gadgets;

        for rule in &self.rules.substitutions {
            match rule {
                Rule::Unary { name, apply } => {
                    for (i, gadget) in gadgets.iter().enumerate() {
                        if let Some(Some(replacement)) = apply(gadget) {
                            return Some(Substitution {
                                rule: *name,
                                matched: vec![i],
                                replacement,
                            });
                        }
                    }
                }
                Rule::Binary { name, apply } => {
                    for (i, j) in collection.pairs() {
                        if let Some(Some(replacement)) = apply(&gadgets[i], &gadgets[j]) {
                            return Some(Substitution {
                                rule: *name,
                                matched: vec![i, j],
                                replacement,
                            });
                        }
                    }
                }
            }
        }
        None
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gadgets::test_support::{int, witness};
    use crate::gadgets::{BoundsCheckGadget, EqualityGadget, Gadget, InequalityGadget};

    fn bounds(selector: &str, min: i64, max: i64) -> AnyGadget {
        BoundsCheckGadget::new(witness(selector), int(min), int(max)).into_any()
    }

    fn equality(left: crate::data::Variable, right: crate::data::Variable) -> AnyGadget {
        EqualityGadget::new(left, right).into_any()
    }

    fn contains(gadgets: &[AnyGadget], gadget: &AnyGadget) -> bool {
        gadgets.iter().any(|g| g.is_equal_to(gadget))
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let result = Optimizer::default()
            .optimize(vec![bounds("a", 0, 10), bounds("a", 0, 10)])
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_disjoint_bounds_contradict() {
        let err = Optimizer::default()
            .optimize(vec![bounds("a", 0, 10), bounds("a", 20, 30)])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contradiction);
    }

    #[test]
    fn test_point_range_becomes_equality_and_is_stable() {
        let optimizer = Optimizer::default();
        let result = optimizer.optimize(vec![bounds("a", 5, 5)]).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_equal_to(&equality(witness("a"), int(5))));

        let again = optimizer.optimize(result.clone()).unwrap();
        assert_eq!(again.len(), 1);
        assert!(again[0].is_equal_to(&result[0]));
    }

    #[test]
    fn test_bounds_propagate_over_equality() {
        let result = Optimizer::default()
            .optimize(vec![equality(witness("a"), witness("b")), bounds("b", 0, 10)])
            .unwrap();
        assert!(contains(&result, &bounds("a", 0, 10)));
        assert!(contains(&result, &bounds("b", 0, 10)));
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_overlapping_bounds_intersect() {
        let result = Optimizer::default()
            .optimize(vec![bounds("a", 0, 10), bounds("a", 5, 30)])
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_equal_to(&bounds("a", 5, 10)));
    }

    #[test]
    fn test_shared_boundary_becomes_equality() {
        let result = Optimizer::default()
            .optimize(vec![bounds("a", 0, 10), bounds("a", 10, 30)])
            .unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].is_equal_to(&equality(witness("a"), int(10))));
    }

    #[test]
    fn test_transitivity_detects_contradiction() {
        let err = Optimizer::default()
            .optimize(vec![equality(witness("a"), int(1)), equality(witness("a"), int(2))])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contradiction);
    }

    #[test]
    fn test_equal_and_unequal_contradict() {
        let err = Optimizer::default()
            .optimize(vec![
                equality(witness("a"), witness("b")),
                InequalityGadget::new(witness("b"), witness("a")).into_any(),
            ])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contradiction);
    }

    #[test]
    fn test_result_is_deterministic() {
        let input = || {
            vec![
                equality(witness("a"), witness("b")),
                equality(witness("b"), witness("c")),
                bounds("c", 3, 9),
                bounds("a", 0, 20),
            ]
        };
        let first = Optimizer::default().optimize(input()).unwrap();
        let second = Optimizer::default().optimize(input()).unwrap();
        let render = |gadgets: &[AnyGadget]| gadgets.iter().map(|g| g.to_string()).collect::<Vec<_>>();
        assert_eq!(render(&first), render(&second));
    }

    #[test]
    fn test_iteration_cap_is_internal_error() {
        let optimizer = Optimizer::with_rules(RuleSet::standard(), OptimizerConfig { max_iterations: 1 });
        let err = optimizer
            .optimize(vec![bounds("a", 0, 10), bounds("a", 5, 30)])
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_empty_rule_set_keeps_gadgets() {
        let optimizer = Optimizer::with_rules(RuleSet::empty(), OptimizerConfig::default());
        let result = optimizer.optimize(vec![bounds("a", 0, 10), bounds("a", 20, 30)]).unwrap();
        assert_eq!(result.len(), 2);
    }
}
