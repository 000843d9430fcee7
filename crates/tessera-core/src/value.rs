//! Runtime values produced by formula evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormulaValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<FormulaValue>),
}

impl FormulaValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        FormulaValue::String(s.into())
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FormulaValue::Null)
    }

    /// Name of the value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FormulaValue::Null => "null",
            FormulaValue::Boolean(_) => "boolean",
            FormulaValue::Number(_) => "number",
            FormulaValue::String(_) => "text",
            FormulaValue::List(_) => "list",
        }
    }

    /// Numeric view of the value.
    ///
    /// Only numbers and numeric text qualify; booleans, null and lists do not.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Boolean view of the value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormulaValue::Boolean(b) => Some(*b),
            FormulaValue::Number(n) => Some(*n != 0.0),
            FormulaValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            FormulaValue::Null => Some(false),
            FormulaValue::List(_) => None,
        }
    }

    /// Convert to the text shown to users
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Null => String::new(),
            FormulaValue::Boolean(b) => b.to_string(),
            FormulaValue::Number(n) => format_number(*n),
            FormulaValue::String(s) => s.clone(),
            FormulaValue::List(items) => items
                .iter()
                .map(FormulaValue::as_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for FormulaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<&str> for FormulaValue {
    fn from(s: &str) -> Self {
        FormulaValue::String(s.to_string())
    }
}

impl From<String> for FormulaValue {
    fn from(s: String) -> Self {
        FormulaValue::String(s)
    }
}

impl From<f64> for FormulaValue {
    fn from(n: f64) -> Self {
        FormulaValue::Number(n)
    }
}

impl From<i64> for FormulaValue {
    fn from(n: i64) -> Self {
        FormulaValue::Number(n as f64)
    }
}

impl From<bool> for FormulaValue {
    fn from(b: bool) -> Self {
        FormulaValue::Boolean(b)
    }
}

impl<T: Into<FormulaValue>> From<Vec<T>> for FormulaValue {
    fn from(items: Vec<T>) -> Self {
        FormulaValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<&serde_json::Value> for FormulaValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FormulaValue::Null,
            serde_json::Value::Bool(b) => FormulaValue::Boolean(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(FormulaValue::Number)
                .unwrap_or(FormulaValue::Null),
            serde_json::Value::String(s) => FormulaValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                FormulaValue::List(items.iter().map(FormulaValue::from).collect())
            }
            // Objects have no value of their own; they travel as JSON text
            serde_json::Value::Object(_) => FormulaValue::String(value.to_string()),
        }
    }
}

impl From<serde_json::Value> for FormulaValue {
    fn from(value: serde_json::Value) -> Self {
        FormulaValue::from(&value)
    }
}
