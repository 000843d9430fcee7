//! # tessera-core
//!
//! Core data types shared by the tessera formula crates:
//! - [`FormulaValue`] - runtime values (text, numbers, booleans, lists, null)
//! - [`FormulaError`] - the error taxonomy for parsing, evaluation and conversion
//! - [`RuntimeContext`] - host-supplied resolution of `get(path)` references
//! - [`Document`] - the rich-text representation used by the formula editor
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{FormulaValue, RuntimeContext};
//! use serde_json::json;
//!
//! let row = json!({"Name": "Apple", "tags": ["red"]});
//! assert_eq!(
//!     RuntimeContext::get(&row, "tags.0").unwrap(),
//!     FormulaValue::string("red")
//! );
//! ```

pub mod context;
pub mod document;
pub mod error;
pub mod value;

pub use context::{EmptyContext, RuntimeContext};
pub use document::{ConversionMode, Document, Inline, Wrapper, ZERO_WIDTH_SPACE};
pub use error::{ErrorKind, FormulaError, FormulaResult};
pub use value::FormulaValue;
