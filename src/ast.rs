//! The abbreviation Abstract Syntax Tree.
//!
//! The [`crate::parser`] module builds these nodes from an abbreviation
//! string; [`crate::transform`] walks them to produce the expanded output.
//!
//! # Key structures
//!
//! - [`Expr`]: the core enum. A whole abbreviation is one `Expr`, usually a
//!   `Filter` wrapping the body.
//!   - `Expr::List`: a sibling sequence joined by newlines (produced by
//!     multiplication and by child distribution over multiplied parents).
//!   - `Expr::Tag`: one element with its id/classes/attributes/text.
//!   - `Expr::Text`: free text from `{...}` or a lorem-ipsum marker.
//!   - `Expr::ParentChild` / `Expr::Sibling`: the `>` and `+` operators.
//! - [`TextPart`]: a literal string, or a literal/numbering-directive
//!   sequence. Tag names, ids, classes, attribute values, and inline text
//!   all carry `TextPart` so `$` directives are evaluated per clone.

/// One node of a parsed abbreviation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    /// Top-level expression carrying its output filter chain. An empty
    /// chain means "none specified"; the driver substitutes the default.
    Filter { filters: Vec<String>, body: Box<Expr> },
    List(Vec<Expr>),
    Tag(TagData),
    Text(TextContent),
    ParentChild { parent: Box<Expr>, child: Box<Expr> },
    Sibling { left: Box<Expr>, right: Box<Expr> },
}

/// An element node as written, before settings/default-attribute merging.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TagData {
    pub name: TextPart,
    /// `false` when the tag name carried a trailing `/`.
    pub has_body: bool,
    pub id: Option<TextPart>,
    pub classes: Vec<TextPart>,
    pub props: Vec<(String, TextPart)>,
    pub text: Option<TextContent>,
}

impl TagData {
    pub fn new(name: TextPart, has_body: bool) -> Self {
        TagData {
            name,
            has_body,
            id: None,
            classes: Vec::new(),
            props: Vec::new(),
            text: None,
        }
    }

    pub fn is_bare(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.props.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TextContent {
    Part(TextPart),
    /// Generate a lorem-ipsum paragraph of this many words.
    Lorem(usize),
}

/// A literal fragment that may contain `$` numbering directives.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TextPart {
    Plain(String),
    Numberings(Vec<NumberingPart>),
}

impl TextPart {
    pub fn plain<S: Into<String>>(s: S) -> Self {
        TextPart::Plain(s.into())
    }

    /// The literal text when the part carries no directive.
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            TextPart::Plain(s) => Some(s),
            TextPart::Numberings(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NumberingPart {
    Literal(String),
    Numbering {
        /// Width of the `$` run; numbers are zero-padded to it.
        digits: usize,
        ascending: bool,
        base: i64,
    },
}

/// The leftmost tag of an expression, used by alias expansion to merge the
/// caller's id/classes/props/text onto the expanded subtree.
pub(crate) fn first_tag_mut(expr: &mut Expr) -> Option<&mut TagData> {
    match expr {
        Expr::Tag(tag) => Some(tag),
        Expr::Filter { body, .. } => first_tag_mut(body),
        Expr::List(items) => items.first_mut().and_then(first_tag_mut),
        Expr::ParentChild { parent, .. } => first_tag_mut(parent),
        Expr::Sibling { left, .. } => first_tag_mut(left),
        Expr::Text(_) => None,
    }
}
