//! Arithmetic problem generation.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    MASTER_OPERAND_MAX, MASTER_OPERAND_MIN, PRODUCT_OPERAND_MAX, PRODUCT_OPERAND_MIN,
};
use crate::error::QuizError;
use crate::presets::{Difficulty, OperationGroup, Operator};

/// One generated question. Replaced, never mutated, between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub operand1: i64,
    pub operand2: i64,
    pub operator: Operator,
    pub answer: i64,
}

impl Problem {
    fn build(operand1: i64, operand2: i64, operator: Operator) -> Self {
        Self {
            operand1,
            operand2,
            operator,
            answer: operator.apply(operand1, operand2),
        }
    }

    /// Exact integer comparison against a raw answer; unparsable input never matches.
    #[must_use]
    pub fn is_answered_by(&self, raw: &str) -> bool {
        parse_answer(raw) == Some(self.answer)
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operand1, self.operator, self.operand2)
    }
}

/// Read the leading base-10 integer of a submitted answer.
///
/// Leading whitespace and one sign are accepted; anything after the digits
/// is ignored, so `"42."` and `"42.0"` both read as 42. Returns `None` when
/// no digit follows, or when the digits overflow `i64`.
#[must_use]
pub fn parse_answer(raw: &str) -> Option<i64> {
    let rest = raw.trim_start();
    let sign_len = usize::from(rest.starts_with(['+', '-']));
    let digits = rest[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    rest[..sign_len + digits].parse::<i64>().ok()
}

/// Generate a problem for the given preset and group.
///
/// Multiplication and division ignore the preset range: operands come from
/// 2-12, or 6-9 on master.
///
/// # Errors
///
/// Returns [`QuizError::NoSharedOperator`] when the preset and group have no
/// operator in common.
pub fn generate_problem<R>(
    difficulty: Difficulty,
    group: OperationGroup,
    rng: &mut R,
) -> Result<Problem, QuizError>
where
    R: Rng + ?Sized,
{
    let shared = difficulty.shared_operators(group);
    let Some(&operator) = shared.choose(rng) else {
        return Err(QuizError::NoSharedOperator { difficulty, group });
    };

    let problem = if difficulty == Difficulty::Master {
        master_problem(operator, rng)
    } else {
        match operator {
            Operator::Divide => {
                let answer = rng.gen_range(PRODUCT_OPERAND_MIN..=PRODUCT_OPERAND_MAX);
                let divisor = rng.gen_range(PRODUCT_OPERAND_MIN..=PRODUCT_OPERAND_MAX);
                Problem::build(divisor * answer, divisor, Operator::Divide)
            }
            Operator::Multiply => {
                let lhs = rng.gen_range(PRODUCT_OPERAND_MIN..=PRODUCT_OPERAND_MAX);
                let rhs = rng.gen_range(PRODUCT_OPERAND_MIN..=PRODUCT_OPERAND_MAX);
                Problem::build(lhs, rhs, Operator::Multiply)
            }
            Operator::Add | Operator::Subtract => {
                let (min, max) = difficulty.range();
                additive_problem(operator, min, max, rng)
            }
        }
    };
    Ok(problem)
}

fn master_problem<R>(operator: Operator, rng: &mut R) -> Problem
where
    R: Rng + ?Sized,
{
    match operator {
        Operator::Divide => {
            let quotient = rng.gen_range(MASTER_OPERAND_MIN..=MASTER_OPERAND_MAX);
            let divisor = rng.gen_range(MASTER_OPERAND_MIN..=MASTER_OPERAND_MAX);
            Problem::build(quotient * divisor, divisor, Operator::Divide)
        }
        Operator::Multiply => {
            let lhs = rng.gen_range(MASTER_OPERAND_MIN..=MASTER_OPERAND_MAX);
            let rhs = rng.gen_range(MASTER_OPERAND_MIN..=MASTER_OPERAND_MAX);
            Problem::build(lhs, rhs, Operator::Multiply)
        }
        Operator::Add | Operator::Subtract => {
            additive_problem(operator, MASTER_OPERAND_MIN, MASTER_OPERAND_MAX, rng)
        }
    }
}

fn additive_problem<R>(operator: Operator, min: i64, max: i64, rng: &mut R) -> Problem
where
    R: Rng + ?Sized,
{
    let mut lhs = rng.gen_range(min..=max);
    let mut rhs = rng.gen_range(min..=max);
    if operator == Operator::Subtract && lhs < rhs {
        std::mem::swap(&mut lhs, &mut rhs);
    }
    Problem::build(lhs, rhs, operator)
}
