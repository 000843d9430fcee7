//! Formula evaluator

use crate::ast::FormulaExpr;
use crate::functions::{FunctionImpl, FunctionRegistry};
use tessera_core::{FormulaError, FormulaResult, FormulaValue, RuntimeContext};

/// Walks an expression tree against a function registry and a runtime
/// context
#[derive(Clone, Copy)]
pub struct Evaluator<'a> {
    functions: &'a FunctionRegistry,
    context: &'a dyn RuntimeContext,
}

impl<'a> Evaluator<'a> {
    pub fn new(functions: &'a FunctionRegistry, context: &'a dyn RuntimeContext) -> Self {
        Self { functions, context }
    }

    pub fn functions(&self) -> &'a FunctionRegistry {
        self.functions
    }

    pub fn context(&self) -> &'a dyn RuntimeContext {
        self.context
    }

    /// Evaluate a formula expression
    pub fn evaluate(&self, expr: &FormulaExpr) -> FormulaResult<FormulaValue> {
        match expr {
            // === Literals ===
            FormulaExpr::StringLiteral(s) => Ok(FormulaValue::String(s.clone())),
            FormulaExpr::NumberLiteral(raw) => parse_number(raw).map(FormulaValue::Number),
            FormulaExpr::BooleanLiteral(b) => Ok(FormulaValue::Boolean(*b)),

            // === Calls and operators ===
            FormulaExpr::FunctionCall { name, args } => self.evaluate_function(name, args),

            FormulaExpr::BinaryOp { op, left, right } => {
                self.evaluate_binary_op(op.function_name(), left, right)
            }

            FormulaExpr::Bracketed(inner) => self.evaluate(inner),

            FormulaExpr::Identifier(name) => Err(FormulaError::evaluation(format!(
                "Unexpected identifier '{}'",
                name
            ))),
        }
    }

    /// Evaluate a binary operation through the function backing the operator
    fn evaluate_binary_op(
        &self,
        name: &str,
        left: &FormulaExpr,
        right: &FormulaExpr,
    ) -> FormulaResult<FormulaValue> {
        let func = self.functions.lookup(name)?;
        func.check_arity(2)?;

        match func.implementation {
            FunctionImpl::Lazy(implementation) => {
                implementation(&[left.clone(), right.clone()], self)
            }
            FunctionImpl::Eager(implementation) => {
                // Evaluate operands first
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                implementation(&[left_val, right_val], self.context)
            }
        }
    }

    /// Evaluate a function call
    fn evaluate_function(&self, name: &str, args: &[FormulaExpr]) -> FormulaResult<FormulaValue> {
        let func = self.functions.lookup(name)?;

        // Check argument count
        func.check_arity(args.len())?;

        match func.implementation {
            FunctionImpl::Lazy(implementation) => implementation(args, self),
            FunctionImpl::Eager(implementation) => {
                // Evaluate arguments left to right
                let mut evaluated_args = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated_args.push(self.evaluate(arg)?);
                }

                implementation(&evaluated_args, self.context)
            }
        }
    }
}

fn parse_number(raw: &str) -> FormulaResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormulaError::evaluation(format!("Invalid number '{}'", raw)))
}

/// Evaluate a formula expression
///
/// # Example
/// ```rust
/// use tessera_core::{EmptyContext, FormulaValue};
/// use tessera_formula::{evaluate, parse_formula, FunctionRegistry};
///
/// let functions = FunctionRegistry::new();
/// let ast = parse_formula("1 + 2").unwrap();
/// assert_eq!(
///     evaluate(&ast, &functions, &EmptyContext).unwrap(),
///     FormulaValue::Number(3.0)
/// );
/// ```
pub fn evaluate(
    expr: &FormulaExpr,
    functions: &FunctionRegistry,
    context: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    Evaluator::new(functions, context).evaluate(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionDef;
    use crate::parser::parse_formula;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tessera_core::EmptyContext;

    fn eval(formula: &str) -> FormulaResult<FormulaValue> {
        let ast = parse_formula(formula)?;
        evaluate(&ast, &FunctionRegistry::new(), &EmptyContext)
    }

    fn eval_with(formula: &str, ctx: &serde_json::Value) -> FormulaResult<FormulaValue> {
        let ast = parse_formula(formula)?;
        evaluate(&ast, &FunctionRegistry::new(), ctx)
    }

    fn s(v: &str) -> FormulaValue {
        FormulaValue::string(v)
    }

    #[test]
    fn test_evaluate_literals() {
        assert_eq!(eval("42").unwrap(), FormulaValue::Number(42.0));
        assert_eq!(eval("1.50").unwrap(), FormulaValue::Number(1.5));
        assert_eq!(eval("-3").unwrap(), FormulaValue::Number(-3.0));
        assert_eq!(eval("'Hello'").unwrap(), s("Hello"));
        assert_eq!(eval("TRUE").unwrap(), FormulaValue::Boolean(true));
    }

    #[test]
    fn test_evaluate_invalid_number_literal() {
        let expr = FormulaExpr::number("1.2.3");
        let result = evaluate(&expr, &FunctionRegistry::new(), &EmptyContext);
        assert!(matches!(result, Err(FormulaError::Evaluation(_))));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("1 + 2").unwrap(), FormulaValue::Number(3.0));
        assert_eq!(eval("1 + 2 * 3").unwrap(), FormulaValue::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3").unwrap(), FormulaValue::Number(9.0));
        assert_eq!(eval("10 - 4 - 3").unwrap(), FormulaValue::Number(3.0));
        assert_eq!(eval("'2' * 4").unwrap(), FormulaValue::Number(8.0));
    }

    #[test]
    fn test_evaluate_errors() {
        assert!(matches!(eval("1 / 0"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(eval("'a' + 1"), Err(FormulaError::Evaluation(_))));
        assert!(matches!(eval("foo"), Err(FormulaError::Evaluation(_))));
        assert_eq!(
            eval("nope(1)"),
            Err(FormulaError::UnknownFunction("nope".into()))
        );
        assert!(matches!(
            eval("upper('a', 'b')"),
            Err(FormulaError::ArgumentCount { actual: 2, .. })
        ));
    }

    #[test]
    fn test_evaluate_comparison_and_logic() {
        assert_eq!(eval("2 > 1").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("'ball' > 'apple'").unwrap(), FormulaValue::Boolean(true));
        assert_eq!(eval("1 <> 1").unwrap(), FormulaValue::Boolean(false));
        assert_eq!(
            eval("1 < 2 && 3 >= 3").unwrap(),
            FormulaValue::Boolean(true)
        );
        assert_eq!(eval("false || 1 = 2").unwrap(), FormulaValue::Boolean(false));
    }

    #[test]
    fn test_evaluate_functions() {
        assert_eq!(eval("concat('a', 'b')").unwrap(), s("ab"));
        assert_eq!(eval("CONCAT('a', 1, true)").unwrap(), s("a1true"));
        assert_eq!(eval("upper(concat('a', 'b'))").unwrap(), s("AB"));
        assert_eq!(eval("round(33.4567)").unwrap(), FormulaValue::Number(33.46));
        assert_eq!(eval("is_even('24')").unwrap(), FormulaValue::Boolean(true));
    }

    #[test]
    fn test_evaluate_if_is_lazy() {
        assert_eq!(eval("if(true, 'yes', 1 / 0)").unwrap(), s("yes"));
        assert_eq!(eval("if(1 > 2, 1 / 0, 'no')").unwrap(), s("no"));
        assert_eq!(eval("if(false, 'yes')").unwrap(), FormulaValue::Null);
        assert!(eval("if('maybe', 1, 2)").is_err());
        assert!(matches!(
            eval("if(true)"),
            Err(FormulaError::ArgumentCount { .. })
        ));
    }

    #[test]
    fn test_evaluate_get() {
        let ctx = json!({"id": 101, "row": {"Name": "Apple"}});
        assert_eq!(eval_with("get('row.Name')", &ctx).unwrap(), s("Apple"));
        assert_eq!(
            eval_with("get('id') + 1", &ctx).unwrap(),
            FormulaValue::Number(102.0)
        );
        assert_eq!(
            eval_with("get('row.Color')", &ctx),
            Err(FormulaError::UnresolvedReference("row.Color".into()))
        );
    }

    #[test]
    fn test_operator_resolution_uses_registry() {
        let ast = parse_formula("1 + 2").unwrap();
        assert_eq!(
            evaluate(&ast, &FunctionRegistry::empty(), &EmptyContext),
            Err(FormulaError::UnknownFunction("add".into()))
        );

        // Operators can be replaced like any other function
        fn fn_add_strings(
            args: &[FormulaValue],
            _ctx: &dyn RuntimeContext,
        ) -> FormulaResult<FormulaValue> {
            Ok(FormulaValue::String(
                args.iter().map(FormulaValue::as_string).collect(),
            ))
        }
        let functions = FunctionRegistry::new()
            .with(FunctionDef::eager("add", 2, Some(2), fn_add_strings).with_operator("+"));
        assert_eq!(
            evaluate(&ast, &functions, &EmptyContext).unwrap(),
            s("12")
        );
    }

    #[test]
    fn test_evaluation_is_pure() {
        let ctx = json!({"n": 4});
        let ast = parse_formula("concat(get('n') * 2, '-', round(1.005, 2))").unwrap();
        let functions = FunctionRegistry::new();
        let first = evaluate(&ast, &functions, &ctx);
        let second = evaluate(&ast, &functions, &ctx);
        assert_eq!(first, second);
    }
}
