use tracing::debug;

use crate::css;
use crate::error::{ExpandError, ExpandResult};
use crate::options::{Mode, Options};
use crate::parser;
use crate::tables::Tables;
use crate::transform::Renderer;

/// Expand one abbreviation against the embedded tables.
///
/// # Examples
///
/// ```
/// use zencode::{expand, Mode, Options};
///
/// let out = expand("ul>li*2", Mode::Html, &Options::default()).unwrap();
/// assert_eq!(out, "<ul>\n  <li></li>\n  <li></li>\n</ul>");
///
/// let out = expand("m10", Mode::Css, &Options::default()).unwrap();
/// assert_eq!(out, "margin: 10px;");
/// ```
///
/// # Errors
///
/// Returns [`ExpandError`] when the abbreviation does not match the
/// grammar or is empty. Expansion never produces partial output.
pub fn expand(input: &str, mode: Mode, options: &Options) -> ExpandResult<String> {
    expand_with(input, mode, options, Tables::global())
}

/// [`expand`] against a caller-supplied table set (see
/// [`Tables::from_json_strs`]).
pub fn expand_with(
    input: &str,
    mode: Mode,
    options: &Options,
    tables: &Tables,
) -> ExpandResult<String> {
    let input = input.trim();
    debug!(?mode, len = input.len(), "expanding abbreviation");
    if input.is_empty() {
        return Err(ExpandError::invalid_input("empty abbreviation"));
    }
    match mode {
        Mode::Html => {
            let ast = parser::parse(input, tables)?;
            Renderer::new(tables, options).transform(&ast)
        }
        Mode::Css => css::expand_css(input, false, options, tables),
        Mode::Sass => css::expand_css(input, true, options, tables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExpandErrorKind;

    #[test]
    fn test_empty_input_rejected() {
        let err = expand("  ", Mode::Html, &Options::default()).unwrap_err();
        assert_eq!(err.kind, ExpandErrorKind::InvalidInput);
    }

    #[test]
    fn test_parse_error_carries_position() {
        let err = expand("ul>li*", Mode::Html, &Options::default()).unwrap_err();
        assert_eq!(err.kind, ExpandErrorKind::Parse);
        assert!(err.position.is_some());
    }

    #[test]
    fn test_mode_selects_pipeline() {
        // `p` is a paragraph in markup and padding in css
        assert_eq!(
            expand("p", Mode::Html, &Options::default()).unwrap(),
            "<p></p>"
        );
        assert_eq!(
            expand("p0", Mode::Css, &Options::default()).unwrap(),
            "padding: 0px;"
        );
    }
}
