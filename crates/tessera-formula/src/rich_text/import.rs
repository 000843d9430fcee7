//! Formula tree → rich-text document

use super::{display_run, Fragment};
use crate::ast::{BinaryOperator, FormulaExpr};
use crate::functions::FunctionRegistry;
use tessera_core::{ConversionMode, Document, FormulaResult, Inline, Wrapper};

/// Lay a formula tree out as an editor document
///
/// Fails with [`UnknownFunction`](tessera_core::FormulaError::UnknownFunction)
/// when a call or operator has no registry entry.
///
/// # Example
/// ```rust
/// use tessera_core::{ConversionMode, Inline};
/// use tessera_formula::{parse_formula, to_rich_text, FunctionRegistry};
///
/// let functions = FunctionRegistry::new();
/// let ast = parse_formula("concat('Hi ', get('row.Name'))").unwrap();
/// let doc = to_rich_text(&ast, &functions, ConversionMode::Simple).unwrap();
/// assert_eq!(
///     doc.content[0].content,
///     vec![Inline::text("Hi "), Inline::data_reference("row.Name")]
/// );
/// ```
pub fn to_rich_text(
    expr: &FormulaExpr,
    functions: &FunctionRegistry,
    mode: ConversionMode,
) -> FormulaResult<Document> {
    if matches!(expr, FormulaExpr::StringLiteral(s) if s.is_empty()) {
        return Ok(Document::new(vec![Wrapper::empty()]));
    }

    let fragment = convert(expr, functions, mode)?;
    Ok(match mode {
        ConversionMode::Advanced => Document::single(flatten_source(fragment)),
        ConversionMode::Simple => Document::new(display_wrappers(fragment)),
    })
}

fn convert(
    expr: &FormulaExpr,
    functions: &FunctionRegistry,
    mode: ConversionMode,
) -> FormulaResult<Fragment> {
    match expr {
        // === Literals ===
        FormulaExpr::StringLiteral(s) => {
            if mode == ConversionMode::Simple && s == "\n" {
                Ok(Fragment::NewLine)
            } else {
                Ok(Fragment::Text {
                    display: s.clone(),
                    source: quote_for_editor(s),
                })
            }
        }
        FormulaExpr::NumberLiteral(raw) => Ok(literal(raw)),
        FormulaExpr::BooleanLiteral(b) => Ok(literal(&b.to_string())),
        FormulaExpr::Identifier(name) => Ok(literal(name)),

        // === Calls and operators ===
        FormulaExpr::FunctionCall { name, args } => convert_function(name, args, functions, mode),

        FormulaExpr::BinaryOp { op, left, right } => {
            convert_binary_op(*op, left, right, functions, mode)
        }

        FormulaExpr::Bracketed(inner) => {
            // Brackets only matter to display content around operators
            if mode == ConversionMode::Simple && !matches!(**inner, FormulaExpr::BinaryOp { .. }) {
                return convert(inner, functions, mode);
            }

            let mut inlines = vec![Inline::text("(")];
            inlines.extend(source_inlines(inner, functions)?);
            inlines.push(Inline::text(")"));
            Ok(flow(inlines, mode))
        }
    }
}

fn literal(text: &str) -> Fragment {
    Fragment::Text {
        display: text.to_string(),
        source: text.to_string(),
    }
}

fn convert_function(
    name: &str,
    args: &[FormulaExpr],
    functions: &FunctionRegistry,
    mode: ConversionMode,
) -> FormulaResult<Fragment> {
    let def = functions.lookup(name)?;
    let name = name.to_lowercase();

    if let Some(to_node) = def.rich_text.and_then(|hooks| hooks.to_node) {
        let converted = args
            .iter()
            .map(|arg| convert(arg, functions, mode))
            .collect::<FormulaResult<Vec<_>>>()?;

        if let Some(fragment) = to_node(&converted, mode) {
            return Ok(fragment);
        }
        log::trace!("{}: custom rich-text layout declined, using generic rendering", name);
    }

    generic_call(&name, args, functions, mode)
}

/// `name(` arg `,` arg `)` with every argument in source form
fn generic_call<'e>(
    name: &str,
    args: impl IntoIterator<Item = &'e FormulaExpr>,
    functions: &FunctionRegistry,
    mode: ConversionMode,
) -> FormulaResult<Fragment> {
    let mut inlines = vec![Inline::function(name)];
    for (i, arg) in args.into_iter().enumerate() {
        if i > 0 {
            inlines.push(Inline::ArgumentSeparator);
        }
        inlines.extend(source_inlines(arg, functions)?);
    }
    inlines.push(Inline::ClosingParen);
    Ok(flow(inlines, mode))
}

fn convert_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    functions: &FunctionRegistry,
    mode: ConversionMode,
) -> FormulaResult<Fragment> {
    let def = functions.lookup(op.function_name())?;

    match def.operator_symbol {
        Some(symbol) => {
            let mut inlines = operand_inlines(op, left, false, functions)?;
            inlines.push(Inline::operator(symbol));
            inlines.extend(operand_inlines(op, right, true, functions)?);
            Ok(flow(inlines, mode))
        }
        None => generic_call(op.function_name(), [left, right], functions, mode),
    }
}

fn operand_inlines(
    op: BinaryOperator,
    operand: &FormulaExpr,
    right_side: bool,
    functions: &FunctionRegistry,
) -> FormulaResult<Vec<Inline>> {
    let inlines = source_inlines(operand, functions)?;
    if !op.needs_parens(operand, right_side) {
        return Ok(inlines);
    }

    let mut wrapped = Vec::with_capacity(inlines.len() + 2);
    wrapped.push(Inline::text("("));
    wrapped.extend(inlines);
    wrapped.push(Inline::text(")"));
    Ok(wrapped)
}

/// Source-form flows are simple-mode paragraphs of their own, or part of
/// the single advanced flow
fn flow(inlines: Vec<Inline>, mode: ConversionMode) -> Fragment {
    match mode {
        ConversionMode::Simple => Fragment::Wrapper(Wrapper::new(inlines)),
        ConversionMode::Advanced => Fragment::Sequence(inlines),
    }
}

fn source_inlines(expr: &FormulaExpr, functions: &FunctionRegistry) -> FormulaResult<Vec<Inline>> {
    convert(expr, functions, ConversionMode::Advanced).map(flatten_source)
}

fn flatten_source(fragment: Fragment) -> Vec<Inline> {
    match fragment {
        Fragment::Text { source, .. } => split_lines(&source),
        Fragment::Inline(inline) => vec![inline],
        Fragment::Sequence(inlines) => inlines,
        Fragment::Wrapper(wrapper) => wrapper.content,
        Fragment::Wrappers(wrappers) => {
            let mut inlines = Vec::new();
            for (i, wrapper) in wrappers.into_iter().enumerate() {
                if i > 0 {
                    inlines.push(Inline::HardBreak);
                }
                inlines.extend(wrapper.content);
            }
            inlines
        }
        Fragment::NewLine => vec![Inline::HardBreak],
    }
}

fn display_wrappers(fragment: Fragment) -> Vec<Wrapper> {
    match fragment {
        Fragment::Text { display, .. } => vec![Wrapper::new(vec![display_run(&display)])],
        Fragment::Inline(inline) => vec![Wrapper::new(vec![inline])],
        Fragment::Sequence(inlines) => vec![Wrapper::new(inlines)],
        Fragment::Wrapper(wrapper) => vec![wrapper],
        Fragment::Wrappers(wrappers) => wrappers,
        Fragment::NewLine => vec![Wrapper::empty(), Wrapper::empty()],
    }
}

/// Text runs separated by hard breaks, one per line
fn split_lines(text: &str) -> Vec<Inline> {
    let mut inlines = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            inlines.push(Inline::HardBreak);
        }
        if !line.is_empty() {
            inlines.push(Inline::text(line));
        }
    }
    inlines
}

/// Quote a string literal for the editor; newlines stay literal and become
/// hard breaks
fn quote_for_editor(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}
