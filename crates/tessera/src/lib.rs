//! # tessera
//!
//! A small formula language for computed fields and data bindings.
//!
//! Tessera formulas are
//! - parsed from text into a syntax tree,
//! - evaluated against a registry of functions and a host-supplied runtime
//!   context of named values,
//! - round-tripped to and from the rich-text documents of the inline formula
//!   editor, where functions, operators and data references are atomic nodes.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tessera::prelude::*;
//!
//! let functions = FunctionRegistry::new();
//! let row = json!({"Name": "Apple", "Price": 1.25});
//!
//! // Evaluate
//! let ast = parse_formula("concat(get('Name'), ': ', get('Price') * 2)").unwrap();
//! let value = evaluate(&ast, &functions, &row).unwrap();
//! assert_eq!(value, FormulaValue::string("Apple: 2.5"));
//!
//! // Edit as rich text and back
//! let doc = formula_to_rich_text("concat('Hi ', get('Name'))", FormulaMode::Simple, &functions).unwrap();
//! let formula = rich_text_to_formula(&doc, FormulaMode::Simple, &functions).unwrap();
//! assert_eq!(formula, "concat('Hi ', get('Name'))");
//! ```

pub mod display;
pub mod prelude;

// Re-export display entry points
pub use display::{
    evaluate_for_display, formula_to_rich_text, is_formula_valid, rich_text_to_formula,
    DisplayOptions, FormulaMode,
};

// Re-export core types
pub use tessera_core::{
    ConversionMode, Document, EmptyContext, ErrorKind, FormulaError, FormulaResult,
    FormulaValue, Inline, RuntimeContext, Wrapper, ZERO_WIDTH_SPACE,
};

// Re-export formula types
pub use tessera_formula::{
    evaluate, from_rich_text, parse_formula, to_rich_text, BinaryOperator, Evaluator,
    FormulaExpr, Fragment, FunctionDef, FunctionImpl, FunctionRegistry, RichTextHooks,
};
