//! Built-in formula functions and the function registry

pub mod data;
pub mod date;
pub mod logical;
pub mod math;
pub mod operators;
pub mod text;

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::evaluator::Evaluator;
use crate::rich_text::Fragment;
use ahash::AHashMap;
use std::fmt;
use tessera_core::{
    ConversionMode, FormulaError, FormulaResult, FormulaValue, Inline, RuntimeContext,
};

/// Signature of a function whose arguments are evaluated before the call
///
/// The runtime context is passed along for functions that read data
/// (`get`).
pub type EagerFn = fn(&[FormulaValue], &dyn RuntimeContext) -> FormulaResult<FormulaValue>;

/// Signature of a function that receives its arguments unevaluated and
/// decides itself what to evaluate (`if`)
pub type LazyFn = fn(&[FormulaExpr], &Evaluator<'_>) -> FormulaResult<FormulaValue>;

/// Builds a custom rich-text node from the already converted arguments.
/// `None` selects the generic function rendering.
pub type ToNodeFn = fn(&[Fragment], ConversionMode) -> Option<Fragment>;

/// Turns an inline node claimed by a function back into formula source
pub type FromNodeFn = fn(&Inline) -> Option<String>;

/// Function implementation
#[derive(Clone, Copy)]
pub enum FunctionImpl {
    Eager(EagerFn),
    Lazy(LazyFn),
}

impl fmt::Debug for FunctionImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionImpl::Eager(_) => f.write_str("Eager"),
            FunctionImpl::Lazy(_) => f.write_str("Lazy"),
        }
    }
}

/// Custom rich-text conversions for a function
#[derive(Clone, Copy, Default)]
pub struct RichTextHooks {
    pub to_node: Option<ToNodeFn>,
    pub from_node: Option<FromNodeFn>,
}

impl fmt::Debug for RichTextHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichTextHooks")
            .field("to_node", &self.to_node.is_some())
            .field("from_node", &self.from_node.is_some())
            .finish()
    }
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Function name (lowercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Infix symbol when the function backs a binary operator
    pub operator_symbol: Option<&'static str>,
    /// Rich-text conversions (None = generic rendering)
    pub rich_text: Option<RichTextHooks>,
}

impl FunctionDef {
    pub fn eager(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: EagerFn,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            implementation: FunctionImpl::Eager(implementation),
            operator_symbol: None,
            rich_text: None,
        }
    }

    pub fn lazy(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: LazyFn,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            implementation: FunctionImpl::Lazy(implementation),
            operator_symbol: None,
            rich_text: None,
        }
    }

    pub fn with_operator(mut self, symbol: &'static str) -> Self {
        self.operator_symbol = Some(symbol);
        self
    }

    pub fn with_rich_text(mut self, hooks: RichTextHooks) -> Self {
        self.rich_text = Some(hooks);
        self
    }

    /// Check an argument count against the arity bounds
    pub fn check_arity(&self, actual: usize) -> FormulaResult<()> {
        if actual < self.min_args {
            return Err(FormulaError::ArgumentCount {
                function: self.name.to_string(),
                expected: format!("at least {}", self.min_args),
                actual,
            });
        }

        if let Some(max) = self.max_args {
            if actual > max {
                return Err(FormulaError::ArgumentCount {
                    function: self.name.to_string(),
                    expected: format!("at most {}", max),
                    actual,
                });
            }
        }

        Ok(())
    }
}

/// Function registry
///
/// Built once and then shared by reference; lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
    /// Keys of functions with a `from_node` hook, sorted
    from_node_claimers: Vec<String>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_operator_functions();
        registry.register_text_functions();
        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_data_functions();
        registry.register_date_functions();

        registry
    }

    /// Create a registry without any functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
            from_node_claimers: Vec::new(),
        }
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_lowercase())
    }

    /// Look up a function by name, failing with
    /// [`FormulaError::UnknownFunction`] when it is missing
    pub fn lookup(&self, name: &str) -> FormulaResult<&FunctionDef> {
        self.get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register(&mut self, def: FunctionDef) {
        let key = def.name.to_lowercase();
        let claims = def.rich_text.and_then(|hooks| hooks.from_node).is_some();

        match self.from_node_claimers.binary_search(&key) {
            Ok(i) if !claims => {
                self.from_node_claimers.remove(i);
            }
            Err(i) if claims => self.from_node_claimers.insert(i, key.clone()),
            _ => {}
        }
        self.functions.insert(key, def);
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, def: FunctionDef) -> Self {
        self.register(def);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All registered functions, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Export an inline node through the first function (by name) whose
    /// `from_node` hook claims it
    pub fn inline_to_source(&self, inline: &Inline) -> Option<String> {
        self.from_node_claimers.iter().find_map(|key| {
            self.functions
                .get(key)
                .and_then(|def| def.rich_text)
                .and_then(|hooks| hooks.from_node)
                .and_then(|from_node| from_node(inline))
        })
    }

    fn register_operator_functions(&mut self) {
        let table: [(BinaryOperator, EagerFn); 12] = [
            (BinaryOperator::Add, operators::fn_add),
            (BinaryOperator::Minus, operators::fn_minus),
            (BinaryOperator::Multiply, operators::fn_multiply),
            (BinaryOperator::Divide, operators::fn_divide),
            (BinaryOperator::Equal, operators::fn_equal),
            (BinaryOperator::NotEqual, operators::fn_not_equal),
            (BinaryOperator::GreaterThan, operators::fn_greater_than),
            (
                BinaryOperator::GreaterThanOrEqual,
                operators::fn_greater_than_or_equal,
            ),
            (BinaryOperator::LessThan, operators::fn_less_than),
            (
                BinaryOperator::LessThanOrEqual,
                operators::fn_less_than_or_equal,
            ),
            (BinaryOperator::And, operators::fn_and),
            (BinaryOperator::Or, operators::fn_or),
        ];

        for (op, implementation) in table {
            self.register(
                FunctionDef::eager(op.function_name(), 2, Some(2), implementation)
                    .with_operator(op.symbol()),
            );
        }
    }

    fn register_text_functions(&mut self) {
        // CONCAT
        self.register(
            FunctionDef::eager("concat", 2, None, text::fn_concat).with_rich_text(RichTextHooks {
                to_node: Some(text::concat_to_node),
                from_node: None,
            }),
        );

        // UPPER / LOWER / CAPITALIZE
        self.register(FunctionDef::eager("upper", 1, Some(1), text::fn_upper));
        self.register(FunctionDef::eager("lower", 1, Some(1), text::fn_lower));
        self.register(FunctionDef::eager(
            "capitalize",
            1,
            Some(1),
            text::fn_capitalize,
        ));
    }

    fn register_math_functions(&mut self) {
        // ROUND (places default to 2)
        self.register(FunctionDef::eager("round", 1, Some(2), math::fn_round));

        // IS_EVEN / IS_ODD
        self.register(FunctionDef::eager("is_even", 1, Some(1), math::fn_is_even));
        self.register(FunctionDef::eager("is_odd", 1, Some(1), math::fn_is_odd));
    }

    fn register_logical_functions(&mut self) {
        // IF (lazy: only the chosen branch is evaluated)
        self.register(FunctionDef::lazy("if", 2, Some(3), logical::fn_if));
    }

    fn register_data_functions(&mut self) {
        // GET
        self.register(
            FunctionDef::eager("get", 1, Some(1), data::fn_get).with_rich_text(RichTextHooks {
                to_node: Some(data::get_to_node),
                from_node: Some(data::get_from_node),
            }),
        );

        // GET_PROPERTY
        self.register(FunctionDef::eager(
            "get_property",
            2,
            Some(2),
            data::fn_get_property,
        ));
    }

    fn register_date_functions(&mut self) {
        self.register(FunctionDef::eager("day", 1, Some(1), date::fn_day));
        self.register(FunctionDef::eager("month", 1, Some(1), date::fn_month));
        self.register(FunctionDef::eager("year", 1, Some(1), date::fn_year));
        self.register(FunctionDef::eager("hour", 1, Some(1), date::fn_hour));
        self.register(FunctionDef::eager("minute", 1, Some(1), date::fn_minute));
        self.register(FunctionDef::eager("second", 1, Some(1), date::fn_second));

        // Volatile
        self.register(FunctionDef::eager("today", 0, Some(0), date::fn_today));
        self.register(FunctionDef::eager("now", 0, Some(0), date::fn_now));
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch the single argument of a one-argument function
pub(crate) fn single_arg<'a>(
    name: &str,
    args: &'a [FormulaValue],
) -> FormulaResult<&'a FormulaValue> {
    match args {
        [value] => Ok(value),
        _ => Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: "1".to_string(),
            actual: args.len(),
        }),
    }
}

/// Numeric view of an argument, or an evaluation error naming the function
pub(crate) fn number_arg(name: &str, value: &FormulaValue) -> FormulaResult<f64> {
    value.as_number().ok_or_else(|| {
        FormulaError::evaluation(format!(
            "{} expects a number, got {} '{}'",
            name,
            value.type_name(),
            value.as_string()
        ))
    })
}
