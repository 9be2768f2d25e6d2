//! Random arithmetic problem generation.
//!
//! Pure functions over a caller-supplied RNG: no shared state, so a seeded
//! RNG reproduces the same sequence of problems.
//!
//! Division problems are built backwards from a divisor and a quotient,
//! so the answer is always an exact integer and the divisor is never zero.

use std::collections::BTreeSet;

use mathrace_protocol::{MatchSettings, OpBounds, Operation, Problem};
use rand::Rng;

/// Why a problem could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProblemError {
    #[error("no operations to choose from")]
    EmptyOperations,

    #[error("inverted range ({min}, {max})")]
    InvertedBounds { min: i64, max: i64 },

    #[error("divisor range contains only zero")]
    NoDivisor,

    #[error("operands overflow a 64-bit result")]
    Overflow,
}

/// Draws a problem for a uniformly chosen operation from `settings`.
pub fn generate_for<R: Rng>(
    settings: &MatchSettings,
    rng: &mut R,
) -> Result<Problem, ProblemError> {
    let operation = pick_operation(&settings.operations, rng)?;
    generate(operation, settings.bounds_for(operation), rng)
}

/// Draws a problem for `operation` with operands inside `bounds`.
///
/// - ADD/SUB/MUL: `num1` from `bounds_1`, `num2` from `bounds_2`. SUB is
///   not reordered, so its result may be negative.
/// - DIV: divisor (`num2`) from `bounds_2` without zero, quotient from
///   `bounds_1`, `num1 = num2 * quotient`.
pub fn generate<R: Rng>(
    operation: Operation,
    bounds: &OpBounds,
    rng: &mut R,
) -> Result<Problem, ProblemError> {
    let (num1, num2, result) = match operation {
        Operation::Add | Operation::Sub | Operation::Mul => {
            let a = draw(bounds.bounds_1, rng)?;
            let b = draw(bounds.bounds_2, rng)?;
            let result = operation.apply(a, b).ok_or(ProblemError::Overflow)?;
            (a, b, result)
        }
        Operation::Div => {
            let divisor = draw_nonzero(bounds.bounds_2, rng)?;
            let quotient = draw(bounds.bounds_1, rng)?;
            let dividend = divisor
                .checked_mul(quotient)
                .ok_or(ProblemError::Overflow)?;
            (dividend, divisor, quotient)
        }
    };

    Ok(Problem {
        num1,
        num2,
        operation,
        result,
    })
}

fn pick_operation<R: Rng>(
    operations: &BTreeSet<Operation>,
    rng: &mut R,
) -> Result<Operation, ProblemError> {
    if operations.is_empty() {
        return Err(ProblemError::EmptyOperations);
    }
    let index = rng.random_range(0..operations.len());
    operations
        .iter()
        .nth(index)
        .copied()
        .ok_or(ProblemError::EmptyOperations)
}

fn draw<R: Rng>((min, max): (i64, i64), rng: &mut R) -> Result<i64, ProblemError> {
    if min > max {
        return Err(ProblemError::InvertedBounds { min, max });
    }
    Ok(rng.random_range(min..=max))
}

/// Uniform over `[min, max]` with zero removed.
fn draw_nonzero<R: Rng>((min, max): (i64, i64), rng: &mut R) -> Result<i64, ProblemError> {
    if min > max {
        return Err(ProblemError::InvertedBounds { min, max });
    }
    if min > 0 || max < 0 {
        return Ok(rng.random_range(min..=max));
    }
    if min == 0 && max == 0 {
        return Err(ProblemError::NoDivisor);
    }
    // One fewer candidate than the range holds; shift the upper half past zero.
    let v = rng.random_range(min..max);
    Ok(if v >= 0 { v + 1 } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DRAWS: usize = 2_000;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn within((min, max): (i64, i64), v: i64) -> bool {
        (min..=max).contains(&v)
    }

    #[test]
    fn test_every_problem_evaluates_to_its_result() {
        let settings = MatchSettings::default();
        let mut rng = rng();
        for _ in 0..DRAWS {
            let p = generate_for(&settings, &mut rng).unwrap();
            assert_eq!(p.operation.apply(p.num1, p.num2), Some(p.result), "{p}");
        }
    }

    #[test]
    fn test_add_operands_stay_in_bounds() {
        let bounds = OpBounds::new((1, 5), (10, 12));
        let mut rng = rng();
        for _ in 0..DRAWS {
            let p = generate(Operation::Add, &bounds, &mut rng).unwrap();
            assert!(within(bounds.bounds_1, p.num1));
            assert!(within(bounds.bounds_2, p.num2));
            assert_eq!(p.result, p.num1 + p.num2);
        }
    }

    #[test]
    fn test_sub_is_not_reordered() {
        let bounds = OpBounds::new((1, 1), (5, 5));
        let p = generate(Operation::Sub, &bounds, &mut rng()).unwrap();
        assert_eq!((p.num1, p.num2, p.result), (1, 5, -4));
    }

    #[test]
    fn test_div_is_exact_with_nonzero_divisor() {
        let bounds = OpBounds::new((-6, 6), (-3, 3));
        let mut rng = rng();
        for _ in 0..DRAWS {
            let p = generate(Operation::Div, &bounds, &mut rng).unwrap();
            assert_ne!(p.num2, 0);
            assert!(within(bounds.bounds_2, p.num2));
            assert!(within(bounds.bounds_1, p.result));
            assert_eq!(p.num1, p.num2 * p.result);
            assert_eq!(p.num1 % p.num2, 0);
        }
    }

    #[test]
    fn test_div_divisor_range_with_zero_hits_both_ends() {
        let bounds = OpBounds::new((1, 1), (-1, 1));
        let mut rng = rng();
        let divisors: BTreeSet<i64> = (0..200)
            .map(|_| generate(Operation::Div, &bounds, &mut rng).unwrap().num2)
            .collect();
        assert_eq!(divisors, BTreeSet::from([-1, 1]));
    }

    #[test]
    fn test_div_zero_only_divisor_is_rejected() {
        let bounds = OpBounds::new((1, 5), (0, 0));
        assert_eq!(
            generate(Operation::Div, &bounds, &mut rng()),
            Err(ProblemError::NoDivisor)
        );
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let bounds = OpBounds::new((5, 1), (1, 5));
        assert_eq!(
            generate(Operation::Mul, &bounds, &mut rng()),
            Err(ProblemError::InvertedBounds { min: 5, max: 1 })
        );
    }

    #[test]
    fn test_mul_overflow_is_reported() {
        let bounds = OpBounds::new((i64::MAX, i64::MAX), (2, 2));
        assert_eq!(
            generate(Operation::Mul, &bounds, &mut rng()),
            Err(ProblemError::Overflow)
        );
    }

    #[test]
    fn test_operation_choice_covers_the_set() {
        let settings = MatchSettings {
            operations: BTreeSet::from([Operation::Add, Operation::Div]),
            ..MatchSettings::default()
        };
        let mut rng = rng();
        let seen: BTreeSet<Operation> = (0..200)
            .map(|_| generate_for(&settings, &mut rng).unwrap().operation)
            .collect();
        assert_eq!(seen, settings.operations);
    }

    #[test]
    fn test_empty_operation_set_is_rejected() {
        let settings = MatchSettings {
            operations: BTreeSet::new(),
            ..MatchSettings::default()
        };
        assert_eq!(
            generate_for(&settings, &mut rng()),
            Err(ProblemError::EmptyOperations)
        );
    }

    #[test]
    fn test_same_seed_same_problems() {
        let settings = MatchSettings::default();
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            assert_eq!(
                generate_for(&settings, &mut a).unwrap(),
                generate_for(&settings, &mut b).unwrap()
            );
        }
    }
}
