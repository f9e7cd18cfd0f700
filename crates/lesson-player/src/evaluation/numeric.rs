//! Numeric comparison with an explicit operator.

use std::collections::BTreeMap;

use crate::error::{PlayerError, Result};
use crate::evaluation::{OptionStatus, Verdict};
use crate::question::NumericOperator;

/// Status key for the single entered value.
pub const VALUE_KEY: &str = "value";

/// Evaluates `value <operator> expected`.
///
/// The operator must be one of the six recognized symbols; an absent or
/// unknown operator fails instead of falling back to equality. A missing
/// value is an incomplete response and evaluates to incorrect.
pub fn evaluate(
    question_id: u64,
    expected: Option<f64>,
    operator: Option<&str>,
    value: Option<f64>,
    tolerance: f64,
) -> Result<Verdict> {
    let expected = match expected {
        Some(expected) if expected.is_finite() => expected,
        Some(expected) => {
            return Err(PlayerError::unsupported_question(
                question_id,
                format!("expected value {expected} is not a finite number"),
            ))
        }
        None => {
            return Err(PlayerError::unsupported_question(
                question_id,
                "missing expected value",
            ))
        }
    };

    let operator = match operator {
        Some(symbol) => NumericOperator::parse(symbol).ok_or_else(|| {
            PlayerError::unsupported_question(
                question_id,
                format!("unrecognized numeric operator '{symbol}'"),
            )
        })?,
        None => {
            return Err(PlayerError::unsupported_question(
                question_id,
                "missing numeric operator",
            ))
        }
    };

    let is_correct = value.is_some_and(|value| operator.apply(value, expected, tolerance));
    let status = if value.is_some() {
        OptionStatus::classify(true, is_correct, false)
    } else {
        OptionStatus::Unselected
    };

    let statuses = BTreeMap::from([(VALUE_KEY.to_string(), status)]);
    Ok(Verdict::new(question_id, is_correct, statuses))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn check(op: &str, value: f64, expected: f64) -> bool {
        evaluate(1, Some(expected), Some(op), Some(value), TOLERANCE)
            .unwrap()
            .is_correct
    }

    #[test]
    fn test_standard_comparisons() {
        assert!(check("gte", 10.0, 10.0));
        assert!(!check("gte", 9.0, 10.0));
        assert!(!check("neq", 10.0, 10.0));
        assert!(check("neq", 11.0, 10.0));
        assert!(check("gt", 10.5, 10.0));
        assert!(!check("gt", 10.0, 10.0));
        assert!(check("lt", 9.5, 10.0));
        assert!(check("lte", 10.0, 10.0));
        assert!(!check("lte", 10.5, 10.0));
        assert!(check("eq", 0.1 + 0.2, 0.3));
    }

    #[test]
    fn test_every_operator_parses_back() {
        for op in NumericOperator::ALL {
            assert!(evaluate(1, Some(1.0), Some(op.symbol()), Some(1.0), TOLERANCE).is_ok());
        }
    }

    #[test]
    fn test_invalid_operator_fails_closed() {
        let err = evaluate(1, Some(10.0), Some("approx"), Some(10.0), TOLERANCE).unwrap_err();
        assert!(err.to_string().contains("unrecognized numeric operator 'approx'"));

        let err = evaluate(1, Some(10.0), None, Some(10.0), TOLERANCE).unwrap_err();
        assert!(matches!(err, PlayerError::UnsupportedQuestion { question_id: 1, .. }));
    }

    #[test]
    fn test_expected_must_be_finite() {
        assert!(evaluate(1, Some(f64::NAN), Some("eq"), Some(1.0), TOLERANCE).is_err());
        assert!(evaluate(1, None, Some("eq"), Some(1.0), TOLERANCE).is_err());
    }

    #[test]
    fn test_missing_value_is_incorrect() {
        let verdict = evaluate(1, Some(10.0), Some("gte"), None, TOLERANCE).unwrap();
        assert!(!verdict.is_correct);
        assert_eq!(verdict.status_of(VALUE_KEY), OptionStatus::Unselected);

        let verdict = evaluate(1, Some(10.0), Some("gte"), Some(3.0), TOLERANCE).unwrap();
        assert_eq!(verdict.status_of(VALUE_KEY), OptionStatus::SelectedIncorrect);
    }
}
