//! Formula Abstract Syntax Tree types

use std::fmt;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    // === Literals ===
    /// String literal (unescaped content)
    StringLiteral(String),
    /// Numeric literal, kept as written; coerced at evaluation time
    NumberLiteral(String),
    /// Boolean literal
    BooleanLiteral(bool),

    // === Calls and operators ===
    FunctionCall {
        name: String,
        args: Vec<FormulaExpr>,
    },
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },

    /// Bare name not followed by an argument list
    Identifier(String),
    /// Parenthesized sub-expression
    Bracketed(Box<FormulaExpr>),
}

impl FormulaExpr {
    pub fn string<S: Into<String>>(s: S) -> Self {
        FormulaExpr::StringLiteral(s.into())
    }

    pub fn number<S: Into<String>>(raw: S) -> Self {
        FormulaExpr::NumberLiteral(raw.into())
    }

    pub fn call<S: Into<String>>(name: S, args: Vec<FormulaExpr>) -> Self {
        FormulaExpr::FunctionCall {
            name: name.into(),
            args,
        }
    }

    pub fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> Self {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn bracketed(inner: FormulaExpr) -> Self {
        FormulaExpr::Bracketed(Box::new(inner))
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Minus,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 12] = [
        BinaryOperator::Add,
        BinaryOperator::Minus,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::GreaterThan,
        BinaryOperator::GreaterThanOrEqual,
        BinaryOperator::LessThan,
        BinaryOperator::LessThanOrEqual,
        BinaryOperator::And,
        BinaryOperator::Or,
    ];

    /// Name of the registry function implementing the operator
    pub fn function_name(self) -> &'static str {
        match self {
            BinaryOperator::Add => "add",
            BinaryOperator::Minus => "minus",
            BinaryOperator::Multiply => "multiply",
            BinaryOperator::Divide => "divide",
            BinaryOperator::Equal => "equal",
            BinaryOperator::NotEqual => "not_equal",
            BinaryOperator::GreaterThan => "greater_than",
            BinaryOperator::GreaterThanOrEqual => "greater_than_or_equal",
            BinaryOperator::LessThan => "less_than",
            BinaryOperator::LessThanOrEqual => "less_than_or_equal",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    /// Infix symbol as written in formula source
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    /// Binding strength; higher binds tighter. All operators are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanOrEqual
            | BinaryOperator::LessThan
            | BinaryOperator::LessThanOrEqual => 3,
            BinaryOperator::Add | BinaryOperator::Minus => 4,
            BinaryOperator::Multiply | BinaryOperator::Divide => 5,
        }
    }

    /// Whether `operand` must be parenthesized to keep its meaning when placed
    /// on the given side of this operator
    pub fn needs_parens(self, operand: &FormulaExpr, right_side: bool) -> bool {
        match operand {
            FormulaExpr::BinaryOp { op, .. } => {
                op.precedence() < self.precedence()
                    || (right_side && op.precedence() == self.precedence())
            }
            _ => false,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Quote `value` as a single-quoted string literal
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Prints canonical formula source
impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::StringLiteral(s) => f.write_str(&quote_string(s)),
            FormulaExpr::NumberLiteral(raw) => f.write_str(raw),
            FormulaExpr::BooleanLiteral(b) => write!(f, "{}", b),
            FormulaExpr::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            FormulaExpr::BinaryOp { op, left, right } => {
                write_operand(f, left, op.needs_parens(left, false))?;
                write!(f, " {} ", op)?;
                write_operand(f, right, op.needs_parens(right, true))
            }
            FormulaExpr::Identifier(name) => f.write_str(name),
            FormulaExpr::Bracketed(inner) => write!(f, "({})", inner),
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &FormulaExpr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", operand)
    } else {
        write!(f, "{}", operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_names() {
        for (i, op) in BinaryOperator::ALL.iter().enumerate() {
            for other in &BinaryOperator::ALL[i + 1..] {
                assert_ne!(op.function_name(), other.function_name());
                assert_ne!(op.symbol(), other.symbol());
            }
        }
        assert_eq!(BinaryOperator::GreaterThan.function_name(), "greater_than");
        assert_eq!(BinaryOperator::NotEqual.symbol(), "!=");
    }

    #[test]
    fn test_quote_string() {
        assert_eq!(quote_string("Name"), "'Name'");
        assert_eq!(quote_string("it's"), "'it\\'s'");
        assert_eq!(quote_string("a\nb"), "'a\\nb'");
        assert_eq!(quote_string("C:\\"), "'C:\\\\'");
    }

    #[test]
    fn test_display() {
        let expr = FormulaExpr::call(
            "concat",
            vec![
                FormulaExpr::string("a"),
                FormulaExpr::number("1.50"),
                FormulaExpr::BooleanLiteral(true),
            ],
        );
        assert_eq!(expr.to_string(), "concat('a', 1.50, true)");

        let expr = FormulaExpr::binary(
            BinaryOperator::Multiply,
            FormulaExpr::bracketed(FormulaExpr::binary(
                BinaryOperator::Add,
                FormulaExpr::number("1"),
                FormulaExpr::number("2"),
            )),
            FormulaExpr::number("3"),
        );
        assert_eq!(expr.to_string(), "(1 + 2) * 3");
    }

    #[test]
    fn test_display_adds_parens_for_precedence() {
        // Built by hand, no Bracketed node
        let expr = FormulaExpr::binary(
            BinaryOperator::Multiply,
            FormulaExpr::binary(
                BinaryOperator::Add,
                FormulaExpr::number("1"),
                FormulaExpr::number("2"),
            ),
            FormulaExpr::number("3"),
        );
        assert_eq!(expr.to_string(), "(1 + 2) * 3");

        let expr = FormulaExpr::binary(
            BinaryOperator::Minus,
            FormulaExpr::number("1"),
            FormulaExpr::binary(
                BinaryOperator::Minus,
                FormulaExpr::number("2"),
                FormulaExpr::number("3"),
            ),
        );
        assert_eq!(expr.to_string(), "1 - (2 - 3)");
    }
}
