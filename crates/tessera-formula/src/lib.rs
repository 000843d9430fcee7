//! # tessera-formula
//!
//! Parser, evaluator and rich-text conversion for tessera formulas.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value) against a [`FunctionRegistry`] and a
//!   [`RuntimeContext`](tessera_core::RuntimeContext)
//! - Built-in functions (operators, text, math, logic, data access, dates)
//! - Conversion between formulas and the editor's rich-text documents
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use tessera_core::FormulaValue;
//! use tessera_formula::{evaluate, parse_formula, FunctionRegistry};
//!
//! let functions = FunctionRegistry::new();
//! let row = json!({"Name": "Apple"});
//! let ast = parse_formula("concat('I like ', lower(get('Name')))").unwrap();
//! assert_eq!(
//!     evaluate(&ast, &functions, &row).unwrap(),
//!     FormulaValue::string("I like apple")
//! );
//! ```

pub mod ast;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod rich_text;

pub use ast::{quote_string, BinaryOperator, FormulaExpr};
pub use evaluator::{evaluate, Evaluator};
pub use functions::{FunctionDef, FunctionImpl, FunctionRegistry, RichTextHooks};
pub use parser::parse_formula;
pub use rich_text::{from_rich_text, to_rich_text, Fragment};
