//! Static expansion tables and their memoising caches.
//!
//! Two JSON documents embedded at compile time define the engine's
//! behaviour: `data/snippets.json` (snippet and alias tables per dialect)
//! and `data/preferences.json` (per-tag settings and the CSS value tables).
//! [`Tables::global`] exposes the embedded documents as a process-wide
//! singleton; [`Tables::from_json_strs`] builds a replacement set from
//! caller-supplied documents, which is the test seam.
//!
//! The only mutation the tables ever see is memoisation: alias expansions
//! are parsed once and cached as ASTs, and snippet strings are compiled
//! once into their template form. Both caches are monotonic and never
//! invalidated; compiling the same source twice under a race yields
//! identical entries, so double insertion is harmless.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::trace;

use crate::ast::Expr;
use crate::error::ExpandError;

const SNIPPETS_JSON: &str = include_str!("../data/snippets.json");
const PREFERENCES_JSON: &str = include_str!("../data/preferences.json");

/// Rendering settings for one tag name. A name missing from the table
/// behaves as all-off with no default attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagSettings {
    pub block: bool,
    pub self_closing: bool,
    /// Attributes emitted even when the abbreviation does not mention
    /// them, in table order. User attributes with the same key win.
    pub default_attr: Vec<(String, String)>,
}

/// A compiled HTML snippet: the text around the `${child}` sentinel, with
/// any other `${...}` placeholders already collapsed to their defaults.
#[derive(Debug, Clone)]
pub(crate) struct HtmlTemplate {
    pub prefix: String,
    /// `None` when the source had no `${child}` sentinel; content is then
    /// appended after the prefix.
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CssPiece {
    Literal(String),
    Slot { index: usize, default: String },
}

/// A compiled CSS snippet template.
#[derive(Debug, Clone)]
pub(crate) struct CssTemplate {
    pub pieces: Vec<CssPiece>,
    /// Highest slot index; the slot with this index absorbs excess
    /// arguments.
    pub max_index: usize,
}

// --- raw document shapes ---

#[derive(Deserialize)]
struct SnippetsDoc {
    html: HtmlSnippetsRaw,
    css: DialectSnippetsRaw,
    sass: DialectSnippetsRaw,
}

#[derive(Deserialize)]
struct HtmlSnippetsRaw {
    snippets: HashMap<String, String>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

#[derive(Deserialize)]
struct DialectSnippetsRaw {
    snippets: HashMap<String, String>,
}

#[derive(Deserialize)]
struct PreferencesDoc {
    html: HtmlPreferencesRaw,
    css: CssPreferencesRaw,
}

#[derive(Deserialize)]
struct HtmlPreferencesRaw {
    tags: HashMap<String, TagSettingsRaw>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TagSettingsRaw {
    block: bool,
    #[serde(rename = "selfClosing")]
    self_closing: bool,
    #[serde(rename = "defaultAttr", deserialize_with = "ordered_string_map")]
    default_attr: Vec<(String, String)>,
}

#[derive(Deserialize)]
struct CssPreferencesRaw {
    color: ColorPreferencesRaw,
    #[serde(rename = "floatUnit")]
    float_unit: String,
    #[serde(rename = "intUnit")]
    int_unit: String,
    #[serde(rename = "keywordAliases")]
    keyword_aliases: HashMap<String, String>,
    #[serde(rename = "unitAliases")]
    unit_aliases: HashMap<String, String>,
    #[serde(rename = "unitlessProperties")]
    unitless_properties: Vec<String>,
    #[serde(rename = "vendorPrefixesProperties")]
    vendor_prefixes: HashMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct ColorPreferencesRaw {
    #[serde(rename = "trailingAliases", default)]
    trailing_aliases: HashMap<String, String>,
}

/// Deserialize a JSON object into a vector of pairs, preserving document
/// order (default attributes render in table order).
fn ordered_string_map<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> serde::de::Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a map of strings")
        }

        fn visit_map<A: serde::de::MapAccess<'de>>(
            self,
            mut access: A,
        ) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::new();
            while let Some((key, value)) = access.next_entry::<String, String>()? {
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

/// The full table set for one engine configuration.
#[derive(Debug)]
pub struct Tables {
    html_snippets: HashMap<String, String>,
    html_aliases: HashMap<String, String>,
    tag_settings: HashMap<String, TagSettings>,
    default_settings: TagSettings,
    css_snippets: HashMap<String, String>,
    sass_snippets: HashMap<String, String>,
    color_trailing_aliases: HashMap<String, String>,
    float_unit: String,
    int_unit: String,
    keyword_aliases: HashMap<String, String>,
    unit_aliases: HashMap<String, String>,
    unitless_properties: HashSet<String>,
    vendor_prefixes: HashMap<String, Vec<String>>,

    alias_asts: RwLock<HashMap<String, Expr>>,
    html_templates: RwLock<HashMap<String, HtmlTemplate>>,
    css_templates: RwLock<HashMap<String, CssTemplate>>,
}

static GLOBAL: Lazy<Tables> = Lazy::new(|| {
    Tables::from_json_strs(SNIPPETS_JSON, PREFERENCES_JSON)
        .expect("embedded table documents are well-formed")
});

impl Tables {
    /// The tables built from the embedded JSON documents.
    pub fn global() -> &'static Tables {
        &GLOBAL
    }

    /// Build a table set from caller-supplied snippet and preference
    /// documents (same shapes as `data/snippets.json` and
    /// `data/preferences.json`).
    pub fn from_json_strs(snippets: &str, preferences: &str) -> Result<Tables, ExpandError> {
        let snippets: SnippetsDoc = serde_json::from_str(snippets)
            .map_err(|e| ExpandError::invalid_input(format!("malformed snippets document: {}", e)))?;
        let preferences: PreferencesDoc = serde_json::from_str(preferences).map_err(|e| {
            ExpandError::invalid_input(format!("malformed preferences document: {}", e))
        })?;

        let tag_settings = preferences
            .html
            .tags
            .into_iter()
            .map(|(name, raw)| {
                (
                    name,
                    TagSettings {
                        block: raw.block,
                        self_closing: raw.self_closing,
                        default_attr: raw.default_attr,
                    },
                )
            })
            .collect();

        let css = preferences.css;
        Ok(Tables {
            html_snippets: snippets.html.snippets,
            html_aliases: snippets.html.aliases,
            tag_settings,
            default_settings: TagSettings::default(),
            css_snippets: snippets.css.snippets,
            sass_snippets: snippets.sass.snippets,
            color_trailing_aliases: css.color.trailing_aliases,
            float_unit: css.float_unit,
            int_unit: css.int_unit,
            keyword_aliases: css.keyword_aliases,
            unit_aliases: css.unit_aliases,
            unitless_properties: css.unitless_properties.into_iter().collect(),
            vendor_prefixes: css.vendor_prefixes,
            alias_asts: RwLock::new(HashMap::new()),
            html_templates: RwLock::new(HashMap::new()),
            css_templates: RwLock::new(HashMap::new()),
        })
    }

    // --- HTML side ---

    pub(crate) fn settings(&self, name: &str) -> &TagSettings {
        self.tag_settings.get(name).unwrap_or(&self.default_settings)
    }

    pub(crate) fn alias(&self, name: &str) -> Option<&str> {
        self.html_aliases.get(name).map(String::as_str)
    }

    pub(crate) fn cached_alias_ast(&self, name: &str) -> Option<Expr> {
        self.alias_asts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub(crate) fn store_alias_ast(&self, name: &str, ast: Expr) {
        trace!(alias = name, "caching alias subtree");
        self.alias_asts
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), ast);
    }

    /// The compiled snippet template for a tag name, if one is defined.
    pub(crate) fn html_template(&self, name: &str) -> Option<HtmlTemplate> {
        if let Some(template) = self
            .html_templates
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Some(template.clone());
        }
        let raw = self.html_snippets.get(name)?;
        let template = compile_html_snippet(raw);
        trace!(snippet = name, "compiled html snippet template");
        self.html_templates
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), template.clone());
        Some(template)
    }

    // --- CSS side ---

    /// Raw snippet text for a key. Sass mode consults the sass table
    /// first and falls back to the css table.
    pub(crate) fn css_snippet(&self, key: &str, sass: bool) -> Option<&str> {
        if sass {
            if let Some(s) = self.sass_snippets.get(key) {
                return Some(s);
            }
        }
        self.css_snippets.get(key).map(String::as_str)
    }

    /// Compile (and memoise) a CSS snippet string.
    pub(crate) fn css_template(&self, raw: &str) -> CssTemplate {
        if let Some(template) = self
            .css_templates
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(raw)
        {
            return template.clone();
        }
        let template = compile_css_snippet(raw);
        trace!(source = raw, "compiled css snippet template");
        self.css_templates
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(raw.to_string(), template.clone());
        template
    }

    pub(crate) fn unit_alias(&self, unit: &str) -> Option<&str> {
        self.unit_aliases.get(unit).map(String::as_str)
    }

    pub(crate) fn float_unit(&self) -> &str {
        &self.float_unit
    }

    pub(crate) fn int_unit(&self) -> &str {
        &self.int_unit
    }

    pub(crate) fn keyword_alias(&self, word: &str) -> Option<&str> {
        self.keyword_aliases.get(word).map(String::as_str)
    }

    /// Longest trailing-alias key that prefixes `rest` (e.g. `s` →
    /// `solid` directly after a color argument).
    pub(crate) fn color_trailing_alias(&self, rest: &str) -> Option<(&str, &str)> {
        self.color_trailing_aliases
            .iter()
            .filter(|(key, _)| rest.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub(crate) fn is_unitless(&self, property: &str) -> bool {
        self.unitless_properties.contains(property)
    }

    /// Prefix names for auto vendor decoration of `property`.
    pub(crate) fn vendor_prefixes_for(&self, property: &str) -> Vec<String> {
        self.vendor_prefixes.get(property).cloned().unwrap_or_else(|| {
            ["webkit", "moz", "ms", "o"]
                .iter()
                .map(|p| p.to_string())
                .collect()
        })
    }
}

/// Collapse a `${...}` placeholder to its default text (after the `:`, if
/// any). `${child}` is the content sentinel and is handled by the caller.
fn resolve_placeholders(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let body = &after[..end];
                if let Some((_, default)) = body.split_once(':') {
                    out.push_str(default);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn compile_html_snippet(raw: &str) -> HtmlTemplate {
    match raw.split_once("${child}") {
        Some((prefix, suffix)) => HtmlTemplate {
            prefix: resolve_placeholders(prefix),
            suffix: Some(resolve_placeholders(suffix)),
        },
        None => HtmlTemplate {
            prefix: resolve_placeholders(raw),
            suffix: None,
        },
    }
}

fn compile_css_snippet(raw: &str) -> CssTemplate {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut counter = 0usize;
    let mut max_index = 0usize;
    let mut rest = raw;

    fn flush(literal: &mut String, pieces: &mut Vec<CssPiece>) {
        if !literal.is_empty() {
            pieces.push(CssPiece::Literal(std::mem::take(literal)));
        }
    }

    while let Some(c) = rest.chars().next() {
        if c == '|' {
            counter += 1;
            max_index = max_index.max(counter);
            flush(&mut literal, &mut pieces);
            pieces.push(CssPiece::Slot {
                index: counter,
                default: String::new(),
            });
            rest = &rest[1..];
        } else if let Some(after) = rest.strip_prefix("${") {
            match after.find('}') {
                Some(end) => {
                    let body = &after[..end];
                    let (index_text, default) = match body.split_once(':') {
                        Some((i, d)) => (i, d.to_string()),
                        None => (body, String::new()),
                    };
                    match index_text.parse::<usize>() {
                        Ok(index) if index > 0 => {
                            counter = index;
                            max_index = max_index.max(index);
                            flush(&mut literal, &mut pieces);
                            pieces.push(CssPiece::Slot { index, default });
                        }
                        _ => {
                            // Not an argument slot; keep the default text.
                            literal.push_str(&default);
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    literal.push_str(rest);
                    rest = "";
                }
            }
        } else {
            literal.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    flush(&mut literal, &mut pieces);

    CssTemplate { pieces, max_index }
}
