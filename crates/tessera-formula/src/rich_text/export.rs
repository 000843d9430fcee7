//! Rich-text document → formula source

use super::is_syntax_marker;
use crate::ast::quote_string;
use crate::functions::FunctionRegistry;
use lazy_regex::regex_is_match;
use tessera_core::document::join_path;
use tessera_core::{
    ConversionMode, Document, FormulaError, FormulaResult, Inline, Wrapper, ZERO_WIDTH_SPACE,
};

/// Turn an editor document back into formula source
///
/// Never panics on malformed documents; the only failure is a
/// [`Conversion`](FormulaError::Conversion) error for a data reference
/// without a path.
///
/// # Example
/// ```rust
/// use tessera_core::{ConversionMode, Document, Inline, Wrapper};
/// use tessera_formula::{from_rich_text, FunctionRegistry};
///
/// let doc = Document::new(vec![
///     Wrapper::new(vec![Inline::text("a")]),
///     Wrapper::new(vec![Inline::text("b")]),
/// ]);
/// let formula = from_rich_text(&doc, &FunctionRegistry::new(), ConversionMode::Simple).unwrap();
/// assert_eq!(formula, "concat('a', '\\n', 'b')");
/// ```
pub fn from_rich_text(
    document: &Document,
    functions: &FunctionRegistry,
    mode: ConversionMode,
) -> FormulaResult<String> {
    let exporter = Exporter { functions, mode };

    match document.content.as_slice() {
        [] => Ok(String::new()),
        [wrapper] => {
            let formula = exporter.wrapper(wrapper)?;
            Ok(if formula == "''" { String::new() } else { formula })
        }
        wrappers => {
            let mut flattened = Vec::new();
            for (i, wrapper) in wrappers.iter().enumerate() {
                if i > 0 {
                    flattened.push(Inline::HardBreak);
                }
                flattened.extend(wrapper.content.iter().cloned());
            }
            if looks_like_call(&flattened) {
                return exporter.reassemble(&flattened);
            }

            let paragraphs = wrappers
                .iter()
                .map(|wrapper| exporter.wrapper(wrapper))
                .collect::<FormulaResult<Vec<_>>>()?;
            Ok(format!("concat({})", paragraphs.join(", '\\n', ")))
        }
    }
}

struct Exporter<'a> {
    functions: &'a FunctionRegistry,
    mode: ConversionMode,
}

impl Exporter<'_> {
    fn wrapper(&self, wrapper: &Wrapper) -> FormulaResult<String> {
        let children = wrapper.content.as_slice();
        match children {
            [] => Ok("''".to_string()),
            [child] => match self.mode {
                ConversionMode::Advanced => self.source_piece(child),
                ConversionMode::Simple => self.text_piece(child),
            },
            _ if looks_like_call(children) => self.reassemble(children),
            _ => match self.mode {
                ConversionMode::Advanced => self.source(children),
                ConversionMode::Simple if children.iter().any(is_syntax_marker) => {
                    self.source(children)
                }
                ConversionMode::Simple => self.text_template(children),
            },
        }
    }

    /// Rebuild `name(inner)suffix` around the first `(` and the last `)`
    fn reassemble(&self, children: &[Inline]) -> FormulaResult<String> {
        let joined = self.source(children)?;
        match (joined.find('('), joined.rfind(')')) {
            (Some(open), Some(close)) if open < close => {
                let name = joined[..open].trim();
                let inner = &joined[open + 1..close];
                let suffix = &joined[close + 1..];
                Ok(format!("{}({}){}", name, inner, suffix))
            }
            _ => Ok(joined),
        }
    }

    /// Children as one run of formula source
    fn source(&self, children: &[Inline]) -> FormulaResult<String> {
        let mut out = String::new();
        for child in children {
            out.push_str(&self.source_piece(child)?);
        }
        Ok(out)
    }

    fn source_piece(&self, inline: &Inline) -> FormulaResult<String> {
        Ok(match inline {
            Inline::TextRun { text } => strip_cursor_marks(text),
            Inline::FunctionMarker { function_name } => format!("{}(", function_name),
            Inline::ArgumentSeparator => ",".to_string(),
            Inline::ClosingParen => ")".to_string(),
            Inline::OperatorMarker { symbol } => symbol.clone(),
            Inline::DataReference { .. } => self.data_reference(inline)?,
            Inline::HardBreak => "\n".to_string(),
        })
    }

    /// Pure text and data content: each piece is an expression of its own
    fn text_template(&self, children: &[Inline]) -> FormulaResult<String> {
        let pieces = children
            .iter()
            .map(|child| self.text_piece(child))
            .collect::<FormulaResult<Vec<_>>>()?;
        Ok(format!("concat({})", pieces.join(", ")))
    }

    fn text_piece(&self, inline: &Inline) -> FormulaResult<String> {
        match inline {
            Inline::TextRun { text } => Ok(quote_string(&strip_cursor_marks(text))),
            Inline::HardBreak => Ok("'\\n'".to_string()),
            other => self.source_piece(other),
        }
    }

    fn data_reference(&self, inline: &Inline) -> FormulaResult<String> {
        let path = match inline {
            Inline::DataReference { path } => path,
            _ => return Err(FormulaError::Conversion("Expected a data reference".into())),
        };
        if path.is_empty() {
            return Err(FormulaError::Conversion(
                "Data reference without a path".into(),
            ));
        }

        Ok(self
            .functions
            .inline_to_source(inline)
            .unwrap_or_else(|| format!("get({})", quote_string(&join_path(path)))))
    }
}

fn strip_cursor_marks(text: &str) -> String {
    text.replace(ZERO_WIDTH_SPACE, "")
}

/// A run that reads like a function call: starts with a function marker or
/// `name(` text and ends with a closing paren or text containing `)`
fn looks_like_call(children: &[Inline]) -> bool {
    let starts = match children.first() {
        Some(Inline::FunctionMarker { .. }) => true,
        Some(Inline::TextRun { text }) => regex_is_match!(
            r"^[a-zA-Z_][a-zA-Z0-9_]*\s*\(",
            text.trim_start_matches(ZERO_WIDTH_SPACE)
        ),
        _ => false,
    };
    let ends = match children.last() {
        Some(Inline::ClosingParen) => true,
        Some(Inline::TextRun { text }) => text.contains(')'),
        _ => false,
    };
    starts && ends
}
