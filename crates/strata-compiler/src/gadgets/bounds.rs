//! `min < value < max`
//!
//! The value is a witness integer, the bounds are public integers within
//! `[0, 2^256 - 1]`. Absent bounds take the limits of that range.

use linkme::distributed_slice;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use strata_ast::PredicateKind;

use super::equality::EqualityGadget;
use super::fields::FieldMap;
use super::registry::{GadgetDescriptor, GADGETS};
use super::{require_instance, require_type, require_witness, AnyGadget, Gadget, GadgetKind, TargetFormat};
use crate::data::{DataType, Literal, Variable};
use crate::error::{CompileError, CompileResult, ErrorKind};

#[distributed_slice(GADGETS)]
static BOUNDS_CHECK: GadgetDescriptor =
    GadgetDescriptor::of::<BoundsCheckGadget>(PredicateKind::BoundsCheck);

pub const MAX_BITS: u64 = 256;

/// Smallest admissible bound.
pub fn min_bound() -> BigInt {
    BigInt::zero()
}

/// Largest admissible bound, `2^256 - 1`.
pub fn max_bound() -> BigInt {
    (BigInt::one() << MAX_BITS) - BigInt::one()
}

#[derive(Debug, Clone)]
pub struct BoundsCheckGadget {
    pub value: Variable,
    pub min: Variable,
    pub max: Variable,
}

impl BoundsCheckGadget {
    pub fn new(value: Variable, min: Variable, max: Variable) -> Self {
        Self { value, min, max }
    }

    /// Integer bounds, once checked.
    fn range(&self) -> Option<(&BigInt, &BigInt)> {
        Some((self.min.instance_integer()?, self.max.instance_integer()?))
    }

    fn check_bound(&self, field: &str, bound: &Variable) -> CompileResult<()> {
        require_instance(Self::KIND, field, bound)?;
        require_type(Self::KIND, field, bound, DataType::Integer)?;

        let Some(value) = bound.instance_integer() else {
            return Err(CompileError::internal(format!(
                "{} bound `{}` has no integer value",
                field, bound
            )));
        };

        if value.is_negative() {
            return Err(CompileError::unpositioned(
                ErrorKind::InvalidValue,
                format!("Bound `{}` is a negative number: {}.", field, value),
            )
            .with_variable(bound, "bounds must not be negative"));
        }
        if value.bits() > MAX_BITS {
            return Err(CompileError::unpositioned(
                ErrorKind::InvalidValue,
                format!(
                    "Bound `{}` is a number too large: {} exceeds {} bits.",
                    field, value, MAX_BITS
                ),
            )
            .with_variable(bound, "bounds must fit in 256 bits"));
        }
        Ok(())
    }
}

impl Gadget for BoundsCheckGadget {
    const KIND: GadgetKind = GadgetKind::BoundsCheck;

    fn init_from(mut fields: FieldMap) -> CompileResult<Self> {
        let value = fields.take_variable("value")?;
        let min = fields
            .take_optional("min")?
            .unwrap_or_else(|| Variable::constant(Literal::Integer(min_bound())));
        let max = fields
            .take_optional("max")?
            .unwrap_or_else(|| Variable::constant(Literal::Integer(max_bound())));

        let gadget = Self { value, min, max };
        gadget.perform_checks()?;
        Ok(gadget)
    }

    fn perform_checks(&self) -> CompileResult<()> {
        require_witness(Self::KIND, "value", &self.value)?;
        require_type(Self::KIND, "value", &self.value, DataType::Integer)?;
        self.check_bound("min", &self.min)?;
        self.check_bound("max", &self.max)?;
        empty_range(self)
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self.value == other.value && self.min == other.min && self.max == other.max
    }

    fn to_target_format(&self) -> TargetFormat {
        TargetFormat::new("BOUND %(value) %(min) %(max)")
            .bind("value", &self.value)
            .bind("min", &self.min)
            .bind("max", &self.max)
    }

    fn into_any(self) -> AnyGadget {
        AnyGadget::BoundsCheck(self)
    }

    fn from_any(gadget: &AnyGadget) -> Option<&Self> {
        match gadget {
            AnyGadget::BoundsCheck(g) => Some(g),
            _ => None,
        }
    }
}

/// `min > max` admits no value.
pub fn empty_range(gadget: &BoundsCheckGadget) -> CompileResult<()> {
    if let Some((min, max)) = gadget.range() {
        if min > max {
            return Err(CompileError::unpositioned(
                ErrorKind::Contradiction,
                format!(
                    "Contradiction: lower bound {} of `{}` exceeds its upper bound {}.",
                    min, gadget.value, max
                ),
            )
            .with_variable(&gadget.min, "lower bound")
            .with_variable(&gadget.max, "upper bound"));
        }
    }
    Ok(())
}

/// Two ranges on the same value that do not overlap.
pub fn disjoint_ranges(a: &BoundsCheckGadget, b: &BoundsCheckGadget) -> CompileResult<()> {
    if a.value != b.value {
        return Ok(());
    }
    let (Some((a_min, a_max)), Some((b_min, b_max))) = (a.range(), b.range()) else {
        return Ok(());
    };

    let (upper, lower) = if a_max < b_min {
        (&a.max, &b.min)
    } else if b_max < a_min {
        (&b.max, &a.min)
    } else {
        return Ok(());
    };

    Err(CompileError::unpositioned(
        ErrorKind::Contradiction,
        format!(
            "Contradiction: `{}` cannot be at most {} and at least {} at the same time.",
            a.value, upper, lower
        ),
    )
    .with_variable(upper, "upper bound")
    .with_variable(lower, "lower bound"))
}

/// Bounds carry over to the other witness side of an equality.
pub fn carry_over_equality(equality: &EqualityGadget, bounds: &BoundsCheckGadget) -> Option<AnyGadget> {
    let other = equality.counterpart(&bounds.value)?;
    if !other.is_witness() || other == &bounds.value {
        return None;
    }
    Some(BoundsCheckGadget::new(other.clone(), bounds.min.clone(), bounds.max.clone()).into_any())
}

/// `x <= value <= x` pins the value to `x`.
pub fn collapse_point_range(gadget: &BoundsCheckGadget) -> Option<Vec<AnyGadget>> {
    let (min, max) = gadget.range()?;
    (min == max).then(|| vec![EqualityGadget::new(gadget.value.clone(), gadget.min.clone()).into_any()])
}

/// Ranges touching in a single point pin the value to that point.
pub fn shared_boundary(a: &BoundsCheckGadget, b: &BoundsCheckGadget) -> Option<Vec<AnyGadget>> {
    if a.value != b.value {
        return None;
    }
    let ((a_min, a_max), (b_min, b_max)) = (a.range()?, b.range()?);

    let point = if a_max == b_min {
        &a.max
    } else if b_max == a_min {
        &b.max
    } else {
        return None;
    };
    Some(vec![EqualityGadget::new(a.value.clone(), point.clone()).into_any()])
}

/// Overlapping ranges on the same value reduce to their intersection.
pub fn intersect_ranges(a: &BoundsCheckGadget, b: &BoundsCheckGadget) -> Option<Vec<AnyGadget>> {
    if a.value != b.value {
        return None;
    }
    let ((a_min, a_max), (b_min, b_max)) = (a.range()?, b.range()?);
    if a_max < b_min || b_max < a_min {
        return None;
    }

    let min = if a_min >= b_min { &a.min } else { &b.min };
    let max = if a_max <= b_max { &a.max } else { &b.max };
    Some(vec![BoundsCheckGadget::new(a.value.clone(), min.clone(), max.clone()).into_any()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gadgets::fields::FieldValue;
    use crate::gadgets::test_support::{int, pos, text, witness};

    fn fields(value: Variable, min: Option<Variable>, max: Option<Variable>) -> FieldMap {
        let optional = |v: Option<Variable>| v.map_or(FieldValue::Absent, FieldValue::Variable);
        FieldMap::new(pos(0))
            .with("value", FieldValue::Variable(value))
            .with("min", optional(min))
            .with("max", optional(max))
    }

    fn bounds(min: i64, max: i64) -> BoundsCheckGadget {
        BoundsCheckGadget::new(witness("dateOfBirth"), int(min), int(max))
    }

    #[test]
    fn test_absent_bounds_default_to_full_range() {
        let gadget = BoundsCheckGadget::init_from(fields(witness("dateOfBirth"), None, None)).unwrap();
        assert_eq!(gadget.min.instance_integer(), Some(&BigInt::zero()));
        assert_eq!(gadget.max.instance_integer(), Some(&max_bound()));
        assert_eq!(max_bound().bits(), 256);
    }

    #[test]
    fn test_negative_bound_rejected() {
        let err = BoundsCheckGadget::init_from(fields(witness("dateOfBirth"), Some(int(-1)), None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        assert!(err.message.contains("negative number"));
    }

    #[test]
    fn test_oversized_bound_rejected() {
        let too_large = Variable::constant(Literal::Integer(BigInt::one() << 256));
        let err = BoundsCheckGadget::init_from(fields(witness("dateOfBirth"), None, Some(too_large))).unwrap_err();
        assert!(err.message.contains("number too large"));
    }

    #[test]
    fn test_classification_contract() {
        let err = BoundsCheckGadget::init_from(fields(int(3), None, None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);

        let err = BoundsCheckGadget::init_from(fields(witness("dateOfBirth"), Some(witness("dateOfExpiry")), None))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::WitnessExposure);

        let err = BoundsCheckGadget::init_from(fields(witness("dateOfBirth"), Some(text("a")), None)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_inverted_range_contradicts() {
        let err = BoundsCheckGadget::init_from(fields(witness("dateOfBirth"), Some(int(20)), Some(int(10))))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contradiction);
    }

    #[test]
    fn test_disjoint_ranges_contradict() {
        let err = disjoint_ranges(&bounds(0, 10), &bounds(20, 30)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contradiction);
        assert_eq!(err.labels.len(), 2);
        assert!(disjoint_ranges(&bounds(0, 10), &bounds(5, 30)).is_ok());
        assert!(disjoint_ranges(&bounds(20, 30), &bounds(0, 10)).is_err());
    }

    #[test]
    fn test_point_range_becomes_equality() {
        let replaced = collapse_point_range(&bounds(5, 5)).unwrap();
        assert!(replaced[0].is_equal_to(&EqualityGadget::new(witness("dateOfBirth"), int(5)).into_any()));
        assert!(collapse_point_range(&bounds(5, 6)).is_none());
    }

    #[test]
    fn test_shared_boundary_becomes_equality() {
        let replaced = shared_boundary(&bounds(0, 10), &bounds(10, 30)).unwrap();
        assert!(replaced[0].is_equal_to(&EqualityGadget::new(witness("dateOfBirth"), int(10)).into_any()));
        assert!(shared_boundary(&bounds(0, 10), &bounds(11, 30)).is_none());
    }

    #[test]
    fn test_intersection() {
        let replaced = intersect_ranges(&bounds(0, 10), &bounds(5, 30)).unwrap();
        assert!(replaced[0].is_equal_to(&bounds(5, 10).into_any()));

        let other_value = BoundsCheckGadget::new(witness("dateOfExpiry"), int(5), int(30));
        assert!(intersect_ranges(&bounds(0, 10), &other_value).is_none());
    }

    #[test]
    fn test_bounds_carry_over_equality() {
        let equality = EqualityGadget::new(witness("a"), witness("dateOfBirth"));
        let implied = carry_over_equality(&equality, &bounds(0, 10)).unwrap();
        assert!(implied.is_equal_to(&BoundsCheckGadget::new(witness("a"), int(0), int(10)).into_any()));

        let public = EqualityGadget::new(int(4), witness("dateOfBirth"));
        assert!(carry_over_equality(&public, &bounds(0, 10)).is_none());
    }
}
