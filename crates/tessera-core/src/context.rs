//! Runtime contexts resolve `get(path)` references to live values
//!
//! The host application supplies a fresh context per evaluation, bound to
//! whatever the formula runs against (a table row, a previous automation
//! step's output, ...). Lookups are synchronous; the host preloads any data
//! it needs before evaluating.

use crate::error::{FormulaError, FormulaResult};
use crate::value::FormulaValue;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Resolves data paths used by the `get` builtin
pub trait RuntimeContext {
    /// Resolve `path` to a value, failing with
    /// [`FormulaError::UnresolvedReference`] when nothing lives there
    fn get(&self, path: &str) -> FormulaResult<FormulaValue>;
}

/// A context with no data; every lookup fails
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContext;

impl RuntimeContext for EmptyContext {
    fn get(&self, path: &str) -> FormulaResult<FormulaValue> {
        Err(FormulaError::UnresolvedReference(path.to_string()))
    }
}

impl<C: RuntimeContext + ?Sized> RuntimeContext for &C {
    fn get(&self, path: &str) -> FormulaResult<FormulaValue> {
        (**self).get(path)
    }
}

/// Flat lookup by exact key
impl<S: BuildHasher> RuntimeContext for HashMap<String, FormulaValue, S> {
    fn get(&self, path: &str) -> FormulaResult<FormulaValue> {
        HashMap::get(self, path)
            .cloned()
            .ok_or_else(|| FormulaError::UnresolvedReference(path.to_string()))
    }
}

/// Dotted-path lookup through nested objects and arrays, e.g.
/// `previous_node.1.rows.0.Name`
impl RuntimeContext for serde_json::Value {
    fn get(&self, path: &str) -> FormulaResult<FormulaValue> {
        let mut current = self;
        for part in path.split('.') {
            let next = match current {
                serde_json::Value::Object(map) => map.get(part),
                serde_json::Value::Array(items) => {
                    part.parse::<usize>().ok().and_then(|i| items.get(i))
                }
                _ => None,
            };
            current = next.ok_or_else(|| FormulaError::UnresolvedReference(path.to_string()))?;
        }
        Ok(FormulaValue::from(current))
    }
}
