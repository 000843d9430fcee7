//! Rich-text document model for the inline formula editor
//!
//! A [`Document`] holds paragraph-like [`Wrapper`]s, each a flat run of
//! [`Inline`] nodes. Function names, punctuation, operators and data
//! references are atomic inline nodes so the editor can treat them as single
//! units.
//!
//! The serde representation matches the editor's JSON:
//!
//! ```json
//! {"type": "doc", "content": [
//!   {"type": "wrapper", "content": [
//!     {"type": "function-formula-component", "attrs": {"functionName": "upper"}},
//!     {"type": "text", "text": "'hello'"},
//!     {"type": "function-closing-paren"}
//!   ]}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Character the editor inserts purely for cursor positioning
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// How formula content is laid out in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Text template with inline data references; may span several wrappers
    #[default]
    Simple,
    /// The whole formula as one continuous flow of source text
    Advanced,
}

/// Root of a rich-text document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "RawNode", try_from = "RawNode")]
pub struct Document {
    pub content: Vec<Wrapper>,
}

/// Paragraph-equivalent grouping of inline nodes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "RawNode", try_from = "RawNode")]
pub struct Wrapper {
    pub content: Vec<Inline>,
}

/// Inline content of a [`Wrapper`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawNode", try_from = "RawNode")]
pub enum Inline {
    /// Plain text
    TextRun { text: String },
    /// `name(` as one unit
    FunctionMarker { function_name: String },
    /// `,` between function arguments
    ArgumentSeparator,
    /// `)` closing a function call
    ClosingParen,
    /// Infix operator symbol
    OperatorMarker { symbol: String },
    /// A `get(...)` binding to a data path
    DataReference { path: Vec<String> },
    HardBreak,
}

impl Document {
    pub fn new(content: Vec<Wrapper>) -> Self {
        Self { content }
    }

    /// Document holding a single wrapper with `content`
    pub fn single(content: Vec<Inline>) -> Self {
        Self {
            content: vec![Wrapper::new(content)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// All inline nodes of all wrappers, in order
    pub fn inlines(&self) -> impl Iterator<Item = &Inline> {
        self.content.iter().flat_map(|w| w.content.iter())
    }
}

impl Wrapper {
    pub fn new(content: Vec<Inline>) -> Self {
        Self { content }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl Inline {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Inline::TextRun { text: text.into() }
    }

    pub fn function<S: Into<String>>(name: S) -> Self {
        Inline::FunctionMarker {
            function_name: name.into(),
        }
    }

    pub fn operator<S: Into<String>>(symbol: S) -> Self {
        Inline::OperatorMarker {
            symbol: symbol.into(),
        }
    }

    /// Data reference from a dotted path such as `row.Name`
    pub fn data_reference(path: &str) -> Self {
        Inline::DataReference {
            path: split_path(path),
        }
    }

    /// Atomic nodes are indivisible from the user's editing perspective
    pub fn is_atomic(&self) -> bool {
        !matches!(self, Inline::TextRun { .. } | Inline::HardBreak)
    }

    /// Text of a text run
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Inline::TextRun { text } => Some(text),
            _ => None,
        }
    }
}

/// Split a dotted data path into its identifiers
pub fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').map(str::to_string).collect()
}

/// Join identifiers back into a dotted data path
pub fn join_path(path: &[String]) -> String {
    path.join(".")
}

// === Editor JSON ===

const DOC: &str = "doc";
const WRAPPER: &str = "wrapper";
const PARAGRAPH: &str = "paragraph";
const TEXT: &str = "text";
const FUNCTION: &str = "function-formula-component";
const COMMA: &str = "function-argument-comma";
const CLOSING_PAREN: &str = "function-closing-paren";
const OPERATOR: &str = "operator-formula-component";
const GET: &str = "get-formula-component";
const HARD_BREAK: &str = "hardBreak";
const NEW_LINE: &str = "newLine";

/// Untyped editor node, the shape every node shares on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Vec<RawNode>>,
}

impl RawNode {
    fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            ..Self::default()
        }
    }

    fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.as_ref()?.get(key)?.as_str()
    }

    fn is_wrapper(&self) -> bool {
        self.kind == WRAPPER || self.kind == PARAGRAPH
    }
}

impl From<Document> for RawNode {
    fn from(doc: Document) -> Self {
        RawNode {
            content: Some(doc.content.into_iter().map(RawNode::from).collect()),
            ..RawNode::new(DOC)
        }
    }
}

impl From<Wrapper> for RawNode {
    fn from(wrapper: Wrapper) -> Self {
        RawNode {
            content: (!wrapper.content.is_empty())
                .then(|| wrapper.content.into_iter().map(RawNode::from).collect()),
            ..RawNode::new(WRAPPER)
        }
    }
}

impl From<Inline> for RawNode {
    fn from(inline: Inline) -> Self {
        match inline {
            Inline::TextRun { text } => RawNode {
                text: Some(text),
                ..RawNode::new(TEXT)
            },
            Inline::FunctionMarker { function_name } => {
                RawNode::new(FUNCTION).with_attr("functionName", function_name)
            }
            Inline::ArgumentSeparator => RawNode::new(COMMA),
            Inline::ClosingParen => RawNode::new(CLOSING_PAREN),
            Inline::OperatorMarker { symbol } => {
                RawNode::new(OPERATOR).with_attr("operatorSymbol", symbol)
            }
            Inline::DataReference { path } => RawNode::new(GET).with_attr("path", join_path(&path)),
            Inline::HardBreak => RawNode::new(HARD_BREAK),
        }
    }
}

impl TryFrom<RawNode> for Document {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.kind != DOC {
            return Err(format!("expected a '{DOC}' node, got '{}'", raw.kind));
        }

        let mut content = Vec::new();
        // Stray inline nodes directly under the document get their own wrapper
        let mut loose = Vec::new();
        for child in raw.content.unwrap_or_default() {
            if child.is_wrapper() {
                if !loose.is_empty() {
                    content.push(Wrapper::new(std::mem::take(&mut loose)));
                }
                content.push(Wrapper::try_from(child)?);
            } else {
                collect_inlines(child, &mut loose)?;
            }
        }
        if !loose.is_empty() {
            content.push(Wrapper::new(loose));
        }

        Ok(Document { content })
    }
}

impl TryFrom<RawNode> for Wrapper {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if !raw.is_wrapper() {
            return Err(format!("expected a '{WRAPPER}' node, got '{}'", raw.kind));
        }
        let mut content = Vec::new();
        for child in raw.content.unwrap_or_default() {
            collect_inlines(child, &mut content)?;
        }
        Ok(Wrapper { content })
    }
}

impl TryFrom<RawNode> for Inline {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let inline = match raw.kind.as_str() {
            TEXT => Inline::TextRun {
                text: raw.text.unwrap_or_default(),
            },
            FUNCTION => Inline::function(raw.attr("functionName").unwrap_or_default()),
            COMMA => Inline::ArgumentSeparator,
            CLOSING_PAREN => Inline::ClosingParen,
            OPERATOR => Inline::operator(raw.attr("operatorSymbol").unwrap_or_default()),
            GET => Inline::data_reference(raw.attr("path").unwrap_or_default()),
            HARD_BREAK | NEW_LINE => Inline::HardBreak,
            other => return Err(format!("unknown inline node type '{other}'")),
        };
        Ok(inline)
    }
}

/// Push `raw` into `out`, flattening nested wrappers
fn collect_inlines(raw: RawNode, out: &mut Vec<Inline>) -> Result<(), String> {
    if raw.is_wrapper() {
        for child in raw.content.unwrap_or_default() {
            collect_inlines(child, out)?;
        }
        Ok(())
    } else {
        out.push(Inline::try_from(raw)?);
        Ok(())
    }
}
