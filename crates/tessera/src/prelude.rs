//! Prelude module - common imports for tessera users
//!
//! ```rust
//! use tessera::prelude::*;
//! ```

pub use crate::{
    // Entry points
    evaluate,
    evaluate_for_display,
    formula_to_rich_text,
    from_rich_text,
    is_formula_valid,
    parse_formula,
    rich_text_to_formula,
    to_rich_text,

    // Rich text
    ConversionMode,
    // Options
    DisplayOptions,
    Document,

    EmptyContext,
    // Error types
    ErrorKind,
    FormulaError,
    // Syntax tree
    FormulaExpr,
    FormulaMode,
    FormulaResult,
    // Values
    FormulaValue,
    // Functions
    FunctionDef,
    FunctionRegistry,
    Inline,
    // Runtime context
    RuntimeContext,
    Wrapper,
};
