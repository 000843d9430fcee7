//! Caller-facing formula entry points
//!
//! Hosts render formula results without caring why a formula fails: every
//! error is logged and replaced by a caller-chosen default.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tessera::prelude::*;
//!
//! let functions = FunctionRegistry::new();
//! let row = json!({"Name": "Apple"});
//! let options = DisplayOptions::default();
//!
//! let value = evaluate_for_display("upper(get('Name'))", &options, &functions, &row);
//! assert_eq!(value, FormulaValue::string("APPLE"));
//!
//! // Unknown function: falls back to the default
//! let value = evaluate_for_display("nope()", &options, &functions, &row);
//! assert_eq!(value, FormulaValue::string(""));
//! ```

use crate::{
    evaluate, from_rich_text, parse_formula, to_rich_text, ConversionMode, Document,
    FormulaError, FormulaResult, FormulaValue, FunctionRegistry, RuntimeContext, Wrapper,
};
use serde::{Deserialize, Serialize};

/// How a formula is authored and shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaMode {
    /// Text template with data references
    #[default]
    Simple,
    /// Full formula source
    Advanced,
    /// Not a formula; the text is the value
    Raw,
}

impl FormulaMode {
    /// Rich-text layout for the mode; raw text has none
    pub fn conversion_mode(self) -> Option<ConversionMode> {
        match self {
            FormulaMode::Simple => Some(ConversionMode::Simple),
            FormulaMode::Advanced => Some(ConversionMode::Advanced),
            FormulaMode::Raw => None,
        }
    }
}

impl From<ConversionMode> for FormulaMode {
    fn from(mode: ConversionMode) -> Self {
        match mode {
            ConversionMode::Simple => FormulaMode::Simple,
            ConversionMode::Advanced => FormulaMode::Advanced,
        }
    }
}

/// Options for [`evaluate_for_display`]
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub mode: FormulaMode,
    /// Returned in place of any parse or evaluation error
    pub default_if_error: FormulaValue,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            mode: FormulaMode::Simple,
            default_if_error: FormulaValue::String(String::new()),
        }
    }
}

impl DisplayOptions {
    pub fn with_mode(mut self, mode: FormulaMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_default(mut self, default_if_error: FormulaValue) -> Self {
        self.default_if_error = default_if_error;
        self
    }
}

fn parse_and_evaluate(
    formula: &str,
    functions: &FunctionRegistry,
    context: &dyn RuntimeContext,
) -> FormulaResult<FormulaValue> {
    let ast = parse_formula(formula)?;
    evaluate(&ast, functions, context)
}

/// Evaluate `formula` for display, never failing
///
/// An empty formula, or any formula in [`FormulaMode::Raw`], is returned
/// unchanged without parsing.
pub fn evaluate_for_display(
    formula: &str,
    options: &DisplayOptions,
    functions: &FunctionRegistry,
    context: &dyn RuntimeContext,
) -> FormulaValue {
    if formula.is_empty() || options.mode == FormulaMode::Raw {
        return FormulaValue::String(formula.to_string());
    }

    match parse_and_evaluate(formula, functions, context) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Formula {:?} failed, using default: {}", formula, e);
            options.default_if_error.clone()
        }
    }
}

/// Whether `formula` parses and evaluates without error against `context`
///
/// The empty formula is valid.
pub fn is_formula_valid(
    formula: &str,
    functions: &FunctionRegistry,
    context: &dyn RuntimeContext,
) -> bool {
    if formula.is_empty() {
        return true;
    }

    match parse_and_evaluate(formula, functions, context) {
        Ok(_) => true,
        Err(e) => {
            log::debug!("Formula {:?} is invalid: {}", formula, e);
            false
        }
    }
}

fn require_conversion_mode(mode: FormulaMode) -> FormulaResult<ConversionMode> {
    mode.conversion_mode().ok_or_else(|| {
        FormulaError::Conversion("raw text has no rich-text form".to_string())
    })
}

/// Parse `formula` and lay it out for the editor
pub fn formula_to_rich_text(
    formula: &str,
    mode: FormulaMode,
    functions: &FunctionRegistry,
) -> FormulaResult<Document> {
    let mode = require_conversion_mode(mode)?;
    if formula.is_empty() {
        return Ok(Document::new(vec![Wrapper::empty()]));
    }

    let ast = parse_formula(formula)?;
    to_rich_text(&ast, functions, mode)
}

/// Turn an edited editor document back into formula source
pub fn rich_text_to_formula(
    document: &Document,
    mode: FormulaMode,
    functions: &FunctionRegistry,
) -> FormulaResult<String> {
    from_rich_text(document, functions, require_conversion_mode(mode)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmptyContext;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let options = DisplayOptions::default();
        assert_eq!(options.mode, FormulaMode::Simple);
        assert_eq!(options.default_if_error, FormulaValue::string(""));
    }

    #[test]
    fn test_raw_and_empty_short_circuit() {
        let functions = FunctionRegistry::new();
        let raw = DisplayOptions::default().with_mode(FormulaMode::Raw);
        assert_eq!(
            evaluate_for_display("upper(", &raw, &functions, &EmptyContext),
            FormulaValue::string("upper(")
        );
        assert_eq!(
            evaluate_for_display("", &DisplayOptions::default(), &functions, &EmptyContext),
            FormulaValue::string("")
        );
    }

    #[test]
    fn test_errors_become_default() {
        let functions = FunctionRegistry::new();
        let options = DisplayOptions::default().with_default(FormulaValue::string("#ERR"));
        for formula in ["upper(", "nope()", "1 / 0", "get('missing')"] {
            assert_eq!(
                evaluate_for_display(formula, &options, &functions, &EmptyContext),
                FormulaValue::string("#ERR"),
                "{}",
                formula
            );
        }
    }

    #[test]
    fn test_is_formula_valid() {
        let functions = FunctionRegistry::new();
        assert!(is_formula_valid("", &functions, &EmptyContext));
        assert!(is_formula_valid("concat('a', 'b')", &functions, &EmptyContext));
        assert!(!is_formula_valid("upper(", &functions, &EmptyContext));
        assert!(!is_formula_valid("nope()", &functions, &EmptyContext));
    }

    #[test]
    fn test_mode_mapping() {
        assert_eq!(
            FormulaMode::Advanced.conversion_mode(),
            Some(ConversionMode::Advanced)
        );
        assert_eq!(FormulaMode::Raw.conversion_mode(), None);
        assert_eq!(FormulaMode::from(ConversionMode::Simple), FormulaMode::Simple);
    }

    #[test]
    fn test_raw_has_no_rich_text() {
        let functions = FunctionRegistry::new();
        assert!(matches!(
            formula_to_rich_text("'a'", FormulaMode::Raw, &functions),
            Err(FormulaError::Conversion(_))
        ));
        assert!(matches!(
            rich_text_to_formula(&Document::default(), FormulaMode::Raw, &functions),
            Err(FormulaError::Conversion(_))
        ));
    }

    #[test]
    fn test_empty_formula_rich_text() {
        let functions = FunctionRegistry::new();
        let doc = formula_to_rich_text("", FormulaMode::Simple, &functions).unwrap();
        assert_eq!(doc, Document::new(vec![Wrapper::empty()]));
        assert_eq!(
            rich_text_to_formula(&doc, FormulaMode::Simple, &functions).unwrap(),
            ""
        );
    }
}
