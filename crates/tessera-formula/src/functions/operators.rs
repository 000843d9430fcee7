//! Functions backing the binary operators

use super::number_arg;
use std::cmp::Ordering;
use tessera_core::{FormulaError, FormulaResult, FormulaValue, RuntimeContext};

fn operands<'a>(
    name: &str,
    args: &'a [FormulaValue],
) -> FormulaResult<(&'a FormulaValue, &'a FormulaValue)> {
    match args {
        [left, right] => Ok((left, right)),
        _ => Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: "2".to_string(),
            actual: args.len(),
        }),
    }
}

fn numeric_operands(name: &str, args: &[FormulaValue]) -> FormulaResult<(f64, f64)> {
    let (left, right) = operands(name, args)?;
    Ok((number_arg(name, left)?, number_arg(name, right)?))
}

/// Compare numerically when both sides are numeric, otherwise as text
fn compare(left: &FormulaValue, right: &FormulaValue) -> Option<Ordering> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => l.partial_cmp(&r),
        _ => Some(left.as_string().cmp(&right.as_string())),
    }
}

fn compare_with(
    name: &str,
    args: &[FormulaValue],
    predicate: fn(Ordering) -> bool,
) -> FormulaResult<FormulaValue> {
    let (left, right) = operands(name, args)?;
    Ok(FormulaValue::Boolean(
        compare(left, right).map_or(false, predicate),
    ))
}

fn bool_operand(name: &str, value: &FormulaValue) -> FormulaResult<bool> {
    value.as_bool().ok_or_else(|| {
        FormulaError::evaluation(format!(
            "{} expects a boolean, got {} '{}'",
            name,
            value.type_name(),
            value.as_string()
        ))
    })
}

/// `a + b`
pub fn fn_add(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let (l, r) = numeric_operands("add", args)?;
    Ok(FormulaValue::Number(l + r))
}

/// `a - b`
pub fn fn_minus(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let (l, r) = numeric_operands("minus", args)?;
    Ok(FormulaValue::Number(l - r))
}

/// `a * b`
pub fn fn_multiply(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    let (l, r) = numeric_operands("multiply", args)?;
    Ok(FormulaValue::Number(l * r))
}

/// `a / b`
pub fn fn_divide(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let (l, r) = numeric_operands("divide", args)?;
    if r == 0.0 {
        return Err(FormulaError::evaluation("Division by zero"));
    }
    Ok(FormulaValue::Number(l / r))
}

/// `a = b`
pub fn fn_equal(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    compare_with("equal", args, Ordering::is_eq)
}

/// `a != b`
pub fn fn_not_equal(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    let (left, right) = operands("not_equal", args)?;
    Ok(FormulaValue::Boolean(
        compare(left, right) != Some(Ordering::Equal),
    ))
}

/// `a > b`
pub fn fn_greater_than(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    compare_with("greater_than", args, Ordering::is_gt)
}

/// `a >= b`
pub fn fn_greater_than_or_equal(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    compare_with("greater_than_or_equal", args, Ordering::is_ge)
}

/// `a < b`
pub fn fn_less_than(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    compare_with("less_than", args, Ordering::is_lt)
}

/// `a <= b`
pub fn fn_less_than_or_equal(
    args: &[FormulaValue],
    _ctx: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    compare_with("less_than_or_equal", args, Ordering::is_le)
}

/// `a && b`
pub fn fn_and(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let (left, right) = operands("and", args)?;
    let l = bool_operand("and", left)?;
    let r = bool_operand("and", right)?;
    Ok(FormulaValue::Boolean(l && r))
}

/// `a || b`
pub fn fn_or(args: &[FormulaValue], _ctx: &dyn RuntimeContext) -> FormulaResult<FormulaValue> {
    let (left, right) = operands("or", args)?;
    let l = bool_operand("or", left)?;
    let r = bool_operand("or", right)?;
    Ok(FormulaValue::Boolean(l || r))
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
    fn test_arithmetic() {
        assert_eq!(fn_add(&[n(1.0), n(2.0)], &EmptyContext), Ok(n(3.0)));
        assert_eq!(fn_add(&[s("3.5"), n(1.0)], &EmptyContext), Ok(n(4.5)));
        assert_eq!(fn_minus(&[n(3.0), s("5")], &EmptyContext), Ok(n(-2.0)));
        assert_eq!(fn_multiply(&[n(2.0), n(3.5)], &EmptyContext), Ok(n(7.0)));
        assert_eq!(fn_divide(&[n(9.0), n(2.0)], &EmptyContext), Ok(n(4.5)));
    }

    #[test]
    fn test_arithmetic_rejects_non_numbers() {
        for bad in [s("foo"), FormulaValue::Boolean(true), FormulaValue::Null] {
            let err = fn_add(&[n(1.0), bad.clone()], &EmptyContext).unwrap_err();
            assert!(matches!(err, FormulaError::Evaluation(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            fn_divide(&[n(1.0), n(0.0)], &EmptyContext),
            Err(FormulaError::Evaluation("Division by zero".into()))
        );
    }

    #[test]
    fn test_comparison() {
        assert_eq!(fn_equal(&[n(2.0), s("2")], &EmptyContext), Ok(true.into()));
        assert_eq!(fn_not_equal(&[s("a"), s("b")], &EmptyContext), Ok(true.into()));
        assert_eq!(fn_greater_than(&[n(10.0), s("9")], &EmptyContext), Ok(true.into()));
        // Text compares as text
        assert_eq!(fn_greater_than(&[s("ball"), s("apple")], &EmptyContext), Ok(true.into()));
        assert_eq!(fn_less_than(&[s("10"), s("9")], &EmptyContext), Ok(false.into()));
        assert_eq!(fn_less_than_or_equal(&[n(2.0), n(2.0)], &EmptyContext), Ok(true.into()));
        assert_eq!(
            fn_greater_than_or_equal(&[n(1.0), n(2.0)], &EmptyContext),
            Ok(false.into())
        );
    }

    #[test]
    fn test_logical() {
        assert_eq!(
            fn_and(&[true.into(), s("false")], &EmptyContext),
            Ok(false.into())
        );
        assert_eq!(fn_or(&[false.into(), n(1.0)], &EmptyContext), Ok(true.into()));
        assert!(fn_or(&[s("maybe"), true.into()], &EmptyContext).is_err());
    }
}
