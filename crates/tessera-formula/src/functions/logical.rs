//! Logical functions

use crate::ast::FormulaExpr;
use crate::evaluator::Evaluator;
use tessera_core::{FormulaError, FormulaResult, FormulaValue};

/// IF(condition, then, [else])
///
/// Only the chosen branch is evaluated. A false condition without an else
/// branch yields null.
pub fn fn_if(args: &[FormulaExpr], evaluator: &Evaluator<'_>) -> FormulaResult<FormulaValue> {
    let (condition, if_true, if_false) = match args {
        [condition, if_true] => (condition, if_true, None),
        [condition, if_true, if_false] => (condition, if_true, Some(if_false)),
        _ => {
            return Err(FormulaError::ArgumentCount {
                function: "if".to_string(),
                expected: "2 or 3".to_string(),
                actual: args.len(),
            })
        }
    };

    let value = evaluator.evaluate(condition)?;
    let condition_bool = value.as_bool().ok_or_else(|| {
        FormulaError::evaluation(format!(
            "if expects a boolean condition, got {} '{}'",
            value.type_name(),
            value.as_string()
        ))
    })?;

    if condition_bool {
        evaluator.evaluate(if_true)
    } else {
        match if_false {
            Some(expr) => evaluator.evaluate(expr),
            None => Ok(FormulaValue::Null),
        }
    }
}
