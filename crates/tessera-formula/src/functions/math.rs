//! Math functions

use super::{number_arg, single_arg};
use tessera_core::{FormulaError, FormulaResult, FormulaValue, RuntimeContext};

/// Decimal places used by ROUND when none are given
const DEFAULT_ROUND_PLACES: i32 = 2;

/// Largest place count (either direction) an f64 can meaningfully round to
const MAX_ROUND_PLACES: f64 = 15.0;

/// Round half away from zero to `places` decimal places
fn round_to(n: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (n * factor).round() / factor
}

fn is_even(n: f64) -> bool {
    n.fract() == 0.0 && n % 2.0 == 0.0
}

/// ROUND(number, [places])
pub fn fn_round(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let value = args.first().ok_or_else(|| FormulaError::ArgumentCount {
        function: "round".to_string(),
        expected: "at least 1".to_string(),
        actual: 0,
    })?;
    let number = number_arg("round", value)?;

    let places = match args.get(1) {
        None => DEFAULT_ROUND_PLACES,
        Some(v) => {
            let places = number_arg("round", v)?.trunc();
            if places.abs() > MAX_ROUND_PLACES {
                return Err(FormulaError::evaluation(format!(
                    "round: decimal places must be between -{0} and {0}",
                    MAX_ROUND_PLACES
                )));
            }
            places as i32
        }
    };

    Ok(FormulaValue::Number(round_to(number, places)))
}

/// IS_EVEN(number): non-integral numbers are never even
pub fn fn_is_even(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    let n = number_arg("is_even", single_arg("is_even", args)?)?;
    Ok(FormulaValue::Boolean(is_even(n)))
}

/// IS_ODD(number): true whenever the number is not even
pub fn fn_is_odd(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let n = number_arg("is_odd", single_arg("is_odd", args)?)?;
    Ok(FormulaValue::Boolean(!is_even(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::EmptyContext;

    fn n(v: f64) -> FormulaValue {
        FormulaValue::Number(v)
    }

    fn s(v: &str) -> FormulaValue {
        FormulaValue::string(v)
    }

    #[test]
    fn test_round() {
        assert_eq!(fn_round(&[s("23.45"), n(2.0)], &EmptyContext), Ok(n(23.45)));
        // Defaults to 2 decimal places
        assert_eq!(fn_round(&[n(33.4567)], &EmptyContext), Ok(n(33.46)));
        assert_eq!(fn_round(&[n(33.0), n(0.0)], &EmptyContext), Ok(n(33.0)));
        assert_eq!(fn_round(&[n(49.4587), n(3.0)], &EmptyContext), Ok(n(49.459)));
        assert!(fn_round(&[s("foo")], &EmptyContext).is_err());
    }

    #[test]
    fn test_round_rejects_extreme_places() {
        assert_eq!(fn_round(&[n(1.0), n(15.0)], &EmptyContext), Ok(n(1.0)));
        for places in [400.0, -400.0, 16.0] {
            assert!(matches!(
                fn_round(&[n(1.0), n(places)], &EmptyContext),
                Err(FormulaError::Evaluation(_))
            ));
        }
    }

    #[test]
    fn test_is_even_is_odd() {
        let cases = [
            (s("23.45"), false),
            (s("24"), true),
            (n(33.4567), false),
            (n(33.0), false),
            (n(50.0), true),
        ];
        for (value, even) in cases {
            assert_eq!(
                fn_is_even(&[value.clone()], &EmptyContext),
                Ok(FormulaValue::Boolean(even))
            );
            assert_eq!(
                fn_is_odd(&[value], &EmptyContext),
                Ok(FormulaValue::Boolean(!even))
            );
        }
        assert!(fn_is_even(&[s("foo")], &EmptyContext).is_err());
    }
}
