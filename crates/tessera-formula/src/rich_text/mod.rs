//! Conversion between formula trees and the editor's rich-text documents
//!
//! [`to_rich_text`] lays a parsed formula out as a [`Document`](tessera_core::Document)
//! and [`from_rich_text`] turns an edited document back into formula source.
//! Both take the [`ConversionMode`](tessera_core::ConversionMode) explicitly:
//!
//! - **simple**: a text template. Literals show their content, `concat`
//!   arguments flow inline and `'\n'` starts a new paragraph.
//! - **advanced**: the formula source as one flow, with function names,
//!   separators, operators and data references as atomic nodes.

mod export;
mod import;

pub use export::from_rich_text;
pub use import::to_rich_text;

use tessera_core::{Inline, Wrapper, ZERO_WIDTH_SPACE};

/// Intermediate result of converting one tree node
///
/// Function hooks receive their converted arguments as fragments and may
/// return a fragment of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A literal: `display` is the value as shown in simple content,
    /// `source` its formula text
    Text { display: String, source: String },
    /// A single inline node
    Inline(Inline),
    /// A flat run of inline nodes
    Sequence(Vec<Inline>),
    Wrapper(Wrapper),
    /// Several paragraphs
    Wrappers(Vec<Wrapper>),
    /// A `'\n'` literal in simple mode: starts a new paragraph
    NewLine,
}

/// Text run for display content; empty text becomes a zero-width space so
/// the editor has somewhere to put the cursor
pub fn display_run(text: &str) -> Inline {
    if text.is_empty() {
        Inline::text(ZERO_WIDTH_SPACE.to_string())
    } else {
        Inline::text(text)
    }
}

/// Inline nodes that carry formula syntax
pub(crate) fn is_syntax_marker(inline: &Inline) -> bool {
    matches!(
        inline,
        Inline::FunctionMarker { .. }
            | Inline::ArgumentSeparator
            | Inline::ClosingParen
            | Inline::OperatorMarker { .. }
    )
}
