//! Tag-makers: each renders one resolved tag record plus its child markup
//! to the output dialect. `html` is the primary; `c` wraps it in
//! id/class comments; `haml` and `hic` emit HAML and Hiccup trees. The
//! `e` filter is a plain string pass applied after the primary.

use crate::options::Options;
use crate::tables::{TagSettings, Tables};

/// A tag with all numbering resolved and text generated, ready to format.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedTag {
    pub name: String,
    pub has_body: bool,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub props: Vec<(String, String)>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Maker {
    Html,
    Commented,
    Haml,
    Hiccup,
}

/// The primary maker selected by a filter name, if it names one.
pub(crate) fn primary_from_name(name: &str) -> Option<Maker> {
    match name {
        "html" => Some(Maker::Html),
        "c" => Some(Maker::Commented),
        "haml" => Some(Maker::Haml),
        "hic" => Some(Maker::Hiccup),
        _ => None,
    }
}

pub(crate) fn make_tag(
    maker: Maker,
    tag: &ResolvedTag,
    content: &str,
    opts: &Options,
    tables: &Tables,
) -> String {
    let settings = tables.settings(&tag.name);
    match maker {
        Maker::Html => html_tag(tag, content, settings, opts, tables),
        Maker::Commented => {
            let base = html_tag(tag, content, settings, opts, tables);
            commented(tag, base)
        }
        Maker::Haml => haml_tag(tag, content, opts),
        Maker::Hiccup => hiccup_tag(tag, content, settings, opts),
    }
}

/// Prefix every line of `s` with one indent unit.
pub(crate) fn indent(s: &str, unit: &str) -> String {
    s.lines()
        .map(|line| format!("{}{}", unit, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// XML-escape; `&` must go first so freshly inserted entities survive.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn html_tag(
    tag: &ResolvedTag,
    content: &str,
    settings: &TagSettings,
    opts: &Options,
    tables: &Tables,
) -> String {
    if let Some(template) = tables.html_template(&tag.name) {
        return match template.suffix {
            Some(suffix) => format!("{}{}{}", template.prefix, content, suffix),
            None => format!("{}{}", template.prefix, content),
        };
    }

    let mut attrs = String::new();
    if let Some(id) = &tag.id {
        attrs.push_str(&format!(" id=\"{}\"", id));
    }
    if !tag.classes.is_empty() {
        if opts.jsx {
            if opts.jsx_braces_for_class {
                attrs.push_str(&format!(" className={{{}}}", tag.classes.join(".")));
            } else {
                attrs.push_str(&format!(" className=\"{}\"", tag.classes.join(" ")));
            }
        } else {
            attrs.push_str(&format!(" class=\"{}\"", tag.classes.join(" ")));
        }
    }

    // Default attributes render first, in table order; a user attribute
    // with the same key replaces the default in place.
    let mut merged: Vec<(&str, &str)> = Vec::new();
    for (key, default_value) in &settings.default_attr {
        let value = tag
            .props
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or(default_value.as_str());
        merged.push((key.as_str(), value));
    }
    for (key, value) in &tag.props {
        if !merged.iter().any(|(k, _)| *k == key.as_str()) {
            merged.push((key.as_str(), value.as_str()));
        }
    }
    for (key, value) in merged {
        let key = if opts.jsx && key == "for" { "htmlFor" } else { key };
        if opts.jsx && value.starts_with('{') && value.ends_with('}') {
            attrs.push_str(&format!(" {}={}", key, value));
        } else {
            attrs.push_str(&format!(" {}=\"{}\"", key, value));
        }
    }

    let text = tag.text.as_deref().unwrap_or("");
    let self_closing =
        (!tag.has_body || settings.self_closing) && text.is_empty() && content.is_empty();
    if self_closing {
        return format!("<{}{}{}", tag.name, attrs, opts.self_closing_style.close());
    }

    let mut body = format!("{}{}", text, content);
    if body.is_empty() {
        if let Some(placeholder) = &opts.leaf_placeholder {
            body = placeholder.clone();
        }
    }
    let block_indent = content.contains('\n') || (settings.block && !content.is_empty());
    if block_indent {
        format!(
            "<{}{}>\n{}\n</{}>",
            tag.name,
            attrs,
            indent(&body, &opts.indent_unit()),
            tag.name
        )
    } else {
        format!("<{}{}>{}</{}>", tag.name, attrs, body, tag.name)
    }
}

fn commented(tag: &ResolvedTag, base: String) -> String {
    if tag.id.is_none() && tag.classes.is_empty() {
        return base;
    }
    let mut label = String::new();
    if let Some(id) = &tag.id {
        label.push('#');
        label.push_str(id);
    }
    for class in &tag.classes {
        label.push('.');
        label.push_str(class);
    }
    format!("<!-- {} -->\n{}\n<!-- /{} -->", label, base, label)
}

fn haml_tag(tag: &ResolvedTag, content: &str, opts: &Options) -> String {
    let mut line = String::new();
    let decorated = tag.id.is_some() || !tag.classes.is_empty();
    if !(tag.name == "div" && decorated) {
        line.push('%');
        line.push_str(&tag.name);
    }
    if let Some(id) = &tag.id {
        line.push('#');
        line.push_str(id);
    }
    for class in &tag.classes {
        line.push('.');
        line.push_str(class);
    }
    if !tag.props.is_empty() {
        let inner = tag
            .props
            .iter()
            .map(|(k, v)| format!(":{} => \"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        line.push('{');
        line.push_str(&inner);
        line.push('}');
    }
    if let Some(text) = tag.text.as_deref().filter(|t| !t.is_empty()) {
        line.push('\n');
        line.push_str(&indent(text, &opts.indent_unit()));
    }
    if !content.is_empty() {
        line.push('\n');
        line.push_str(&indent(content, &opts.indent_unit()));
    }
    line
}

fn hiccup_tag(tag: &ResolvedTag, content: &str, settings: &TagSettings, opts: &Options) -> String {
    let mut out = format!("[:{}", tag.name);
    if let Some(id) = &tag.id {
        out.push('#');
        out.push_str(id);
    }
    for class in &tag.classes {
        out.push('.');
        out.push_str(class);
    }
    if !tag.props.is_empty() {
        let inner = tag
            .props
            .iter()
            .map(|(k, v)| format!(":{} \"{}\"", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(" {{{}}}", inner));
    }
    if let Some(text) = tag.text.as_deref().filter(|t| !t.is_empty()) {
        out.push_str(&format!(" \"{}\"", text));
    }
    if !content.is_empty() {
        let block_indent = content.contains('\n') || settings.block;
        if block_indent {
            out.push('\n');
            out.push_str(&indent(content, &opts.indent_unit()));
        } else {
            out.push(' ');
            out.push_str(content);
        }
    }
    out.push(']');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SelfClosingStyle;

    fn resolved(name: &str) -> ResolvedTag {
        ResolvedTag {
            name: name.to_string(),
            has_body: true,
            id: None,
            classes: Vec::new(),
            props: Vec::new(),
            text: None,
        }
    }

    fn opts() -> Options {
        Options::default()
    }

    #[test]
    fn test_plain_tag() {
        let out = make_tag(Maker::Html, &resolved("em"), "", &opts(), Tables::global());
        assert_eq!(out, "<em></em>");
    }

    #[test]
    fn test_id_class_order() {
        let mut tag = resolved("em");
        tag.id = Some("x".into());
        tag.classes = vec!["a".into(), "b".into()];
        let out = make_tag(Maker::Html, &tag, "", &opts(), Tables::global());
        assert_eq!(out, "<em id=\"x\" class=\"a b\"></em>");
    }

    #[test]
    fn test_default_attributes_fill_and_yield() {
        let out = make_tag(Maker::Html, &resolved("a"), "", &opts(), Tables::global());
        assert_eq!(out, "<a href=\"\"></a>");

        let mut tag = resolved("a");
        tag.props.push(("href".into(), "#top".into()));
        let out = make_tag(Maker::Html, &tag, "", &opts(), Tables::global());
        assert_eq!(out, "<a href=\"#top\"></a>");
    }

    #[test]
    fn test_self_closing_styles() {
        let tables = Tables::global();
        let mut options = opts();
        assert_eq!(make_tag(Maker::Html, &resolved("br"), "", &options, tables), "<br />");
        options.self_closing_style = SelfClosingStyle::Slash;
        assert_eq!(make_tag(Maker::Html, &resolved("br"), "", &options, tables), "<br/>");
        options.self_closing_style = SelfClosingStyle::Plain;
        assert_eq!(make_tag(Maker::Html, &resolved("br"), "", &options, tables), "<br>");
    }

    #[test]
    fn test_no_body_marker_forces_self_close() {
        let mut tag = resolved("foo");
        tag.has_body = false;
        let out = make_tag(Maker::Html, &tag, "", &opts(), Tables::global());
        assert_eq!(out, "<foo />");
    }

    #[test]
    fn test_text_with_self_closing_settings_keeps_body() {
        // inline text overrides the self-closing settings entry
        let mut tag = resolved("br");
        tag.text = Some("x".into());
        let out = make_tag(Maker::Html, &tag, "", &opts(), Tables::global());
        assert_eq!(out, "<br>x</br>");
    }

    #[test]
    fn test_block_indents_content() {
        let out = make_tag(
            Maker::Html,
            &resolved("header"),
            "<h1>Hi</h1>",
            &opts(),
            Tables::global(),
        );
        assert_eq!(out, "<header>\n  <h1>Hi</h1>\n</header>");
    }

    #[test]
    fn test_inline_keeps_single_line() {
        let out = make_tag(
            Maker::Html,
            &resolved("em"),
            "<b></b>",
            &opts(),
            Tables::global(),
        );
        assert_eq!(out, "<em><b></b></em>");
    }

    #[test]
    fn test_leaf_placeholder() {
        let mut options = opts();
        options.leaf_placeholder = Some("$0".into());
        let out = make_tag(Maker::Html, &resolved("em"), "", &options, Tables::global());
        assert_eq!(out, "<em>$0</em>");
    }

    #[test]
    fn test_jsx_class_and_for() {
        let mut options = opts();
        options.jsx = true;
        let mut tag = resolved("label");
        tag.classes = vec!["a".into(), "b".into()];
        tag.props.push(("for".into(), "name".into()));
        let out = make_tag(Maker::Html, &tag, "", &options, Tables::global());
        assert_eq!(out, "<label className=\"a b\" htmlFor=\"name\"></label>");
    }

    #[test]
    fn test_jsx_braced_class_and_value() {
        let mut options = opts();
        options.jsx = true;
        options.jsx_braces_for_class = true;
        let mut tag = resolved("em");
        tag.classes = vec!["a".into(), "b".into()];
        tag.props.push(("onClick".into(), "{handle}".into()));
        let out = make_tag(Maker::Html, &tag, "", &options, Tables::global());
        assert_eq!(out, "<em className={a.b} onClick={handle}></em>");
    }

    #[test]
    fn test_commented_wraps_decorated_tags() {
        let mut tag = resolved("em");
        tag.id = Some("x".into());
        tag.classes = vec!["y".into()];
        let out = make_tag(Maker::Commented, &tag, "", &opts(), Tables::global());
        assert_eq!(out, "<!-- #x.y -->\n<em id=\"x\" class=\"y\"></em>\n<!-- /#x.y -->");
    }

    #[test]
    fn test_commented_leaves_bare_tags() {
        let out = make_tag(Maker::Commented, &resolved("em"), "", &opts(), Tables::global());
        assert_eq!(out, "<em></em>");
    }

    #[test]
    fn test_haml_shape() {
        let mut tag = resolved("span");
        tag.id = Some("x".into());
        tag.classes = vec!["y".into()];
        tag.props.push(("title".into(), "t".into()));
        tag.text = Some("hello".into());
        let out = make_tag(Maker::Haml, &tag, "", &opts(), Tables::global());
        assert_eq!(out, "%span#x.y{:title => \"t\"}\n  hello");
    }

    #[test]
    fn test_haml_div_elision() {
        let mut tag = resolved("div");
        tag.classes = vec!["row".into()];
        let out = make_tag(Maker::Haml, &tag, "", &opts(), Tables::global());
        assert_eq!(out, ".row");
    }

    #[test]
    fn test_hiccup_inline_and_block() {
        let mut tag = resolved("p");
        tag.text = Some("hi".into());
        assert_eq!(
            make_tag(Maker::Hiccup, &tag, "", &opts(), Tables::global()),
            "[:p \"hi\"]"
        );

        let out = make_tag(
            Maker::Hiccup,
            &resolved("ul"),
            "[:li]\n[:li]",
            &opts(),
            Tables::global(),
        );
        assert_eq!(out, "[:ul\n  [:li]\n  [:li]]");
    }

    #[test]
    fn test_escape_order() {
        assert_eq!(escape_xml("<a href=\"#\">&</a>"), "&lt;a href=\"#\"&gt;&amp;&lt;/a&gt;");
    }
}
