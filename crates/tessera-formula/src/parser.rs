//! Formula parser
//!
//! A recursive descent parser for formula source text with proper operator
//! precedence. Every failure is a [`FormulaError::Syntax`] carrying the byte
//! span of the offending text.

use crate::ast::{BinaryOperator, FormulaExpr};
use std::ops::Range;
use tessera_core::{FormulaError, FormulaResult};

/// Parse formula source text into an AST
///
/// # Example
/// ```rust
/// use tessera_formula::parse_formula;
///
/// let ast = parse_formula("1 + 2").unwrap();
/// let ast = parse_formula("concat('Hello, ', get('row.Name'))").unwrap();
/// let ast = parse_formula("if(get('id') > 100, 'big', 'small')").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(formula)?;

    if parser.current == Token::Eof {
        return Err(FormulaError::syntax(
            "Empty formula",
            formula,
            0..formula.len(),
        ));
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current != Token::Eof {
        return Err(parser.error(format!(
            "Unexpected {} after expression",
            parser.current.describe()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    // Literals
    Number(String),
    String(String),
    Boolean(bool),

    Identifier(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    AndAnd,
    OrOr,
    Comma,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(raw) => format!("number {}", raw),
            Token::String(_) => "string".to_string(),
            Token::Boolean(b) => format!("'{}'", b),
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Equal => "'='".to_string(),
            Token::NotEqual => "'!='".to_string(),
            Token::LessThan => "'<'".to_string(),
            Token::LessEqual => "'<='".to_string(),
            Token::GreaterThan => "'>'".to_string(),
            Token::GreaterEqual => "'>='".to_string(),
            Token::AndAnd => "'&&'".to_string(),
            Token::OrOr => "'||'".to_string(),
            Token::Comma => "','".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Eof => "end of formula".to_string(),
        }
    }
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current: Token,
    /// Byte range of `current` in `input`
    span: Range<usize>,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current: Token::Eof,
            span: 0..0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    fn error(&self, message: impl Into<String>) -> FormulaError {
        FormulaError::syntax(message, self.input, self.span.clone())
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.skip_trivia()?;
        let start = self.pos;
        self.current = self.scan_token(start)?;
        self.span = start..self.pos;
        Ok(())
    }

    fn scan_token(&mut self, start: usize) -> FormulaResult<Token> {
        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '=' => Some(Token::Equal),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        // One- or two-character operators
        match c {
            '<' => {
                self.advance();
                return Ok(match self.peek_char() {
                    Some('=') => {
                        self.advance();
                        Token::LessEqual
                    }
                    Some('>') => {
                        self.advance();
                        Token::NotEqual
                    }
                    _ => Token::LessThan,
                });
            }
            '>' => {
                self.advance();
                if self.peek_char() == Some('=') {
                    self.advance();
                    return Ok(Token::GreaterEqual);
                }
                return Ok(Token::GreaterThan);
            }
            '!' | '&' | '|' => {
                let (second, token) = match c {
                    '!' => ('=', Token::NotEqual),
                    '&' => ('&', Token::AndAnd),
                    _ => ('|', Token::OrOr),
                };
                if self.peek_char_at(1) == Some(second) {
                    self.advance();
                    self.advance();
                    return Ok(token);
                }
            }
            _ => {}
        }

        if c == '\'' || c == '"' {
            return self.scan_string(c, start);
        }

        if c.is_ascii_digit() {
            return Ok(self.scan_number());
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.scan_identifier());
        }

        Err(FormulaError::syntax(
            format!("Unexpected character '{}'", c),
            self.input,
            start..start + c.len_utf8(),
        ))
    }

    fn scan_string(&mut self, quote: char, start: usize) -> FormulaResult<Token> {
        self.advance(); // Skip opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                None => {
                    return Err(FormulaError::syntax(
                        "Unterminated string literal",
                        self.input,
                        start..self.pos,
                    ))
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(Token::String(s));
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some(c @ ('\\' | '\'' | '"')) => s.push(c),
                        // Unknown escapes are kept as written
                        Some(c) => {
                            s.push('\\');
                            s.push(c);
                        }
                        None => continue,
                    }
                    self.advance();
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }

        // Decimal part
        if self.peek_char() == Some('.')
            && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit())
        {
            self.advance();
            while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        Token::Number(self.input[start..self.pos].to_string())
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // Boolean literals, unless followed by '(' (then it's a function call)
        if self.peek_char() != Some('(') {
            if text.eq_ignore_ascii_case("true") {
                return Token::Boolean(true);
            }
            if text.eq_ignore_ascii_case("false") {
                return Token::Boolean(false);
            }
        }

        Token::Identifier(text.to_string())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    /// Skip whitespace and `/* ... */` comments
    fn skip_trivia(&mut self) -> FormulaResult<()> {
        loop {
            while self.peek_char().map_or(false, |c| c.is_whitespace()) {
                self.advance();
            }

            if !self.input[self.pos..].starts_with("/*") {
                return Ok(());
            }

            let start = self.pos;
            match self.input[start + 2..].find("*/") {
                Some(offset) => self.pos = start + 2 + offset + 2,
                None => {
                    return Err(FormulaError::syntax(
                        "Unterminated comment",
                        self.input,
                        start..self.input.len(),
                    ))
                }
            }
        }
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if &self.current == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(self.error(format!(
                "Expected {}, got {}",
                expected.describe(),
                self.current.describe()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Logical or: ||
    // 2. Logical and: &&
    // 3. Comparison: =, !=, <>, <, <=, >, >=
    // 4. Addition/Subtraction: +, -
    // 5. Multiplication/Division: *, /
    // 6. Primary: literals, identifiers, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_and()?;

        while self.current == Token::OrOr {
            self.consume()?;
            let right = self.parse_and()?;
            left = FormulaExpr::binary(BinaryOperator::Or, left, right);
        }

        Ok(left)
    }

    fn parse_and(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_comparison()?;

        while self.current == Token::AndAnd {
            self.consume()?;
            let right = self.parse_comparison()?;
            left = FormulaExpr::binary(BinaryOperator::And, left, right);
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.current {
                Token::Equal => BinaryOperator::Equal,
                Token::NotEqual => BinaryOperator::NotEqual,
                Token::LessThan => BinaryOperator::LessThan,
                Token::LessEqual => BinaryOperator::LessThanOrEqual,
                Token::GreaterThan => BinaryOperator::GreaterThan,
                Token::GreaterEqual => BinaryOperator::GreaterThanOrEqual,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_additive()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Minus,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_primary()?;

        loop {
            let op = match self.current {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_primary()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.current.clone() {
            Token::Number(raw) => {
                self.consume()?;
                Ok(FormulaExpr::NumberLiteral(raw))
            }

            Token::String(s) => {
                self.consume()?;
                Ok(FormulaExpr::StringLiteral(s))
            }

            Token::Boolean(b) => {
                self.consume()?;
                Ok(FormulaExpr::BooleanLiteral(b))
            }

            // Negative number literal: '-' directly followed by digits
            Token::Minus => {
                let minus_end = self.span.end;
                self.consume()?;
                match self.current.clone() {
                    Token::Number(raw) if self.span.start == minus_end => {
                        self.consume()?;
                        Ok(FormulaExpr::NumberLiteral(format!("-{}", raw)))
                    }
                    _ => Err(FormulaError::syntax(
                        "Expected a number after '-'",
                        self.input,
                        minus_end - 1..self.span.end,
                    )),
                }
            }

            Token::LeftParen => {
                self.consume()?;
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(FormulaExpr::Bracketed(Box::new(expr)))
            }

            Token::Identifier(name) => {
                self.consume()?;
                if self.current == Token::LeftParen {
                    self.parse_function_call(name)
                } else {
                    Ok(FormulaExpr::Identifier(name))
                }
            }

            Token::Eof => Err(self.error("Unexpected end of formula")),

            token => Err(self.error(format!("Unexpected {}", token.describe()))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();

        // Parse arguments
        if self.current != Token::RightParen {
            args.push(self.parse_expression()?);

            while self.current == Token::Comma {
                self.consume()?;
                args.push(self.parse_expression()?);
            }
        }

        self.expect(&Token::RightParen)?;

        Ok(FormulaExpr::FunctionCall { name, args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(raw: &str) -> FormulaExpr {
        FormulaExpr::number(raw)
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), num("42"));
        assert_eq!(parse_formula("1.50").unwrap(), num("1.50"));
        assert_eq!(parse_formula("-3").unwrap(), num("-3"));
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(parse_formula("'Hello'").unwrap(), FormulaExpr::string("Hello"));
        assert_eq!(
            parse_formula("\"double\"").unwrap(),
            FormulaExpr::string("double")
        );
        assert_eq!(
            parse_formula(r"'it\'s \\ a\nb'").unwrap(),
            FormulaExpr::string("it's \\ a\nb")
        );
        assert_eq!(parse_formula("''").unwrap(), FormulaExpr::string(""));
        assert_eq!(
            parse_formula("'line\nbreak'").unwrap(),
            FormulaExpr::string("line\nbreak")
        );
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(
            parse_formula("true").unwrap(),
            FormulaExpr::BooleanLiteral(true)
        );
        assert_eq!(
            parse_formula("FALSE").unwrap(),
            FormulaExpr::BooleanLiteral(false)
        );
        // Followed by '(' it is a call
        assert_eq!(
            parse_formula("true()").unwrap(),
            FormulaExpr::call("true", vec![])
        );
    }

    #[test]
    fn test_parse_function_call() {
        let ast = parse_formula("concat('a', get('row.Name'))").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::call(
                "concat",
                vec![
                    FormulaExpr::string("a"),
                    FormulaExpr::call("get", vec![FormulaExpr::string("row.Name")]),
                ]
            )
        );

        // Name case is preserved
        assert_eq!(
            parse_formula("UPPER ('x')").unwrap(),
            FormulaExpr::call("UPPER", vec![FormulaExpr::string("x")])
        );
        assert_eq!(
            parse_formula("now()").unwrap(),
            FormulaExpr::call("now", vec![])
        );
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(
            parse_formula("foo").unwrap(),
            FormulaExpr::Identifier("foo".into())
        );
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // Should parse as 1+(2*3) due to precedence
        let ast = parse_formula("1 + 2 * 3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Add,
                num("1"),
                FormulaExpr::binary(BinaryOperator::Multiply, num("2"), num("3")),
            )
        );

        // Left associative
        let ast = parse_formula("10 - 4 - 3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Minus,
                FormulaExpr::binary(BinaryOperator::Minus, num("10"), num("4")),
                num("3"),
            )
        );
    }

    #[test]
    fn test_parse_brackets() {
        let ast = parse_formula("(1 + 2) * 3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Multiply,
                FormulaExpr::bracketed(FormulaExpr::binary(
                    BinaryOperator::Add,
                    num("1"),
                    num("2")
                )),
                num("3"),
            )
        );
    }

    #[test]
    fn test_parse_comparison_and_logic() {
        let ast = parse_formula("1 < 2 && 'a' <> 'b' || false").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Or,
                FormulaExpr::binary(
                    BinaryOperator::And,
                    FormulaExpr::binary(BinaryOperator::LessThan, num("1"), num("2")),
                    FormulaExpr::binary(
                        BinaryOperator::NotEqual,
                        FormulaExpr::string("a"),
                        FormulaExpr::string("b")
                    ),
                ),
                FormulaExpr::BooleanLiteral(false),
            )
        );

        assert_eq!(
            parse_formula("1 >= 2").unwrap(),
            FormulaExpr::binary(BinaryOperator::GreaterThanOrEqual, num("1"), num("2"))
        );
        assert_eq!(
            parse_formula("1 != 2").unwrap(),
            FormulaExpr::binary(BinaryOperator::NotEqual, num("1"), num("2"))
        );
    }

    #[test]
    fn test_negative_operands() {
        assert_eq!(
            parse_formula("1 - -3").unwrap(),
            FormulaExpr::binary(BinaryOperator::Minus, num("1"), num("-3"))
        );
        assert_eq!(
            parse_formula("1 -3").unwrap(),
            FormulaExpr::binary(BinaryOperator::Minus, num("1"), num("3"))
        );
        assert!(parse_formula("- 3").is_err());
    }

    #[test]
    fn test_comments_and_whitespace() {
        assert_eq!(
            parse_formula("  /* total */ 1 +\n 2 /* done */ ").unwrap(),
            FormulaExpr::binary(BinaryOperator::Add, num("1"), num("2"))
        );
    }

    #[test]
    fn test_syntax_errors() {
        for source in ["", "   ", "upper(", "1 +", "1 2", "concat('a',)", "1 & 2", "'open", "/* x"] {
            let err = parse_formula(source).unwrap_err();
            assert!(err.is_syntax(), "{:?} gave {:?}", source, err);
        }
    }

    #[test]
    fn test_error_span() {
        match parse_formula("1 + ?") {
            Err(FormulaError::Syntax { span, snippet, .. }) => {
                assert_eq!(span, 4..5);
                assert_eq!(snippet, "?");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }

        match parse_formula("1 2") {
            Err(FormulaError::Syntax { span, snippet, .. }) => {
                assert_eq!(span, 2..3);
                assert_eq!(snippet, "2");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_display_reparses() {
        for source in [
            "concat('it\\'s', '\\n', get('a.b'))",
            "(1 + 2) * -3",
            "if(get('x') >= 10 && true, 'big', \"small\")",
            "10 - (4 - 3)",
        ] {
            let ast = parse_formula(source).unwrap();
            assert_eq!(parse_formula(&ast.to_string()).unwrap(), ast);
        }
    }
}
