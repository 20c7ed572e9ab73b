use std::collections::HashMap;

/// Which expansion dialect to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The element/attribute/child grammar producing markup.
    Html,
    /// The property-shortcut grammar producing `prop: value;` lines.
    Css,
    /// The CSS grammar with the sass snippet table and no trailing `;`.
    Sass,
}

/// How a self-closing tag is terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfClosingStyle {
    /// `<br />`
    #[default]
    SpaceSlash,
    /// `<br/>`
    Slash,
    /// `<br>`
    Plain,
}

impl SelfClosingStyle {
    pub(crate) fn close(self) -> &'static str {
        match self {
            SelfClosingStyle::SpaceSlash => " />",
            SelfClosingStyle::Slash => "/>",
            SelfClosingStyle::Plain => ">",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorCase {
    /// Keep the case the hex digits were written in.
    #[default]
    Auto,
    Upper,
    Lower,
}

/// Per-call configuration for [`crate::expand`].
///
/// The defaults match the conventional editor setup: two-space indent,
/// `<br />` style self-closing tags, JSX off, colors kept as written and
/// shortened when possible.
#[derive(Debug, Clone)]
pub struct Options {
    pub indent_width: usize,
    pub self_closing_style: SelfClosingStyle,
    /// Emit `className`/`htmlFor` and keep `{...}` attribute values unquoted.
    pub jsx: bool,
    /// With `jsx`, render the class list as `className={a.b}` instead of a
    /// quoted space-separated list.
    pub jsx_braces_for_class: bool,
    pub color_case: ColorCase,
    /// Shorten `#aabbcc` to `#abc` when the pairs allow it.
    pub color_shorten: bool,
    /// Filter chains keyed by file extension, used when the abbreviation
    /// carries no explicit `|filter` chain.
    pub default_filter_by_ext: HashMap<String, Vec<String>>,
    /// Chain used when neither the abbreviation nor the extension selects
    /// one.
    pub fallback_filter: Vec<String>,
    /// Extension of the buffer being edited, if known.
    pub file_extension: Option<String>,
    /// Seed for lorem-ipsum generation; a fixed seed makes output
    /// reproducible.
    pub lorem_seed: u64,
    /// Body inserted into leaf tags that would otherwise be empty but are
    /// not self-closing.
    pub leaf_placeholder: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent_width: 2,
            self_closing_style: SelfClosingStyle::default(),
            jsx: false,
            jsx_braces_for_class: false,
            color_case: ColorCase::default(),
            color_shorten: true,
            default_filter_by_ext: HashMap::new(),
            fallback_filter: vec!["html".to_string()],
            file_extension: None,
            lorem_seed: 0,
            leaf_placeholder: None,
        }
    }
}

impl Options {
    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}
