//! AST-to-string transformation.
//!
//! [`Renderer`] walks an [`Expr`] tree depth-first: children render
//! before their parent so the parent's tag-maker receives the finished
//! child markup as `content`. Siblings and list items join with single
//! newlines. The filter chain picks the primary tag-maker (last primary
//! wins) and optionally applies the `e` escape over the final string.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use crate::ast::{Expr, TagData, TextContent};
use crate::error::ExpandResult;
use crate::lorem;
use crate::makers::{self, Maker, ResolvedTag};
use crate::numbering;
use crate::options::Options;
use crate::tables::Tables;

pub(crate) struct Renderer<'t> {
    tables: &'t Tables,
    opts: &'t Options,
    rng: StdRng,
}

impl<'t> Renderer<'t> {
    pub fn new(tables: &'t Tables, opts: &'t Options) -> Self {
        Renderer {
            tables,
            opts,
            rng: StdRng::seed_from_u64(opts.lorem_seed),
        }
    }

    pub fn transform(&mut self, expr: &Expr) -> ExpandResult<String> {
        match expr {
            Expr::Filter { filters, body } => {
                let chain = self.effective_chain(filters);
                let mut primary = Maker::Html;
                for name in &chain {
                    match makers::primary_from_name(name) {
                        Some(maker) => primary = maker,
                        None if name == "e" => {}
                        None => trace!(filter = name.as_str(), "ignoring unknown filter"),
                    }
                }
                let mut out = self.walk(body, primary)?;
                if chain.iter().any(|f| f == "e") {
                    out = makers::escape_xml(&out);
                }
                Ok(out)
            }
            other => self.walk(other, Maker::Html),
        }
    }

    /// The filter chain in effect: the abbreviation's own, the one
    /// registered for the buffer's extension, or the fallback.
    fn effective_chain(&self, filters: &[String]) -> Vec<String> {
        if !filters.is_empty() {
            return filters.to_vec();
        }
        if let Some(ext) = &self.opts.file_extension {
            if let Some(chain) = self.opts.default_filter_by_ext.get(ext) {
                return chain.clone();
            }
        }
        self.opts.fallback_filter.clone()
    }

    fn walk(&mut self, expr: &Expr, maker: Maker) -> ExpandResult<String> {
        match expr {
            Expr::Filter { body, .. } => self.walk(body, maker),
            Expr::List(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| self.walk(item, maker))
                    .collect::<Result<_, _>>()?;
                Ok(rendered.join("\n"))
            }
            Expr::Sibling { left, right } => Ok(format!(
                "{}\n{}",
                self.walk(left, maker)?,
                self.walk(right, maker)?
            )),
            Expr::ParentChild { parent, child } => {
                let content = self.walk(child, maker)?;
                self.render_parent(parent, &content, maker)
            }
            Expr::Tag(tag) => {
                let resolved = self.resolve_tag(tag);
                Ok(makers::make_tag(maker, &resolved, "", self.opts, self.tables))
            }
            Expr::Text(content) => Ok(self.resolve_text(content)),
        }
    }

    fn render_parent(&mut self, parent: &Expr, content: &str, maker: Maker) -> ExpandResult<String> {
        match parent {
            Expr::Tag(tag) => {
                let resolved = self.resolve_tag(tag);
                Ok(makers::make_tag(
                    maker, &resolved, content, self.opts, self.tables,
                ))
            }
            // A grouped parent has no single enclosing tag; its children
            // follow it as siblings.
            other => Ok(format!("{}\n{}", self.walk(other, maker)?, content)),
        }
    }

    /// Resolve numbering and text for one tag. Directives not bound by
    /// any multiplier number as the sole clone, `(0, 1)`.
    fn resolve_tag(&mut self, tag: &TagData) -> ResolvedTag {
        let mut classes: Vec<String> = Vec::new();
        for part in &tag.classes {
            let class = numbering::resolve(part, 0, 1);
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        ResolvedTag {
            name: numbering::resolve(&tag.name, 0, 1),
            has_body: tag.has_body,
            id: tag.id.as_ref().map(|p| numbering::resolve(p, 0, 1)),
            classes,
            props: tag
                .props
                .iter()
                .map(|(k, v)| (k.clone(), numbering::resolve(v, 0, 1)))
                .collect(),
            text: tag.text.as_ref().map(|t| self.resolve_text(t)),
        }
    }

    fn resolve_text(&mut self, content: &TextContent) -> String {
        match content {
            TextContent::Part(part) => numbering::resolve(part, 0, 1),
            TextContent::Lorem(count) => lorem::paragraph(&mut self.rng, *count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn render(input: &str) -> String {
        let tables = Tables::global();
        let ast = parser::parse(input, tables).unwrap();
        Renderer::new(tables, &Options::default())
            .transform(&ast)
            .unwrap()
    }

    #[test]
    fn test_siblings_join_with_newline() {
        assert_eq!(render("em+strong"), "<em></em>\n<strong></strong>");
    }

    #[test]
    fn test_unbound_numbering_renders_as_one() {
        assert_eq!(render("h$"), "<h1></h1>");
    }

    #[test]
    fn test_escape_filter_applies_last() {
        assert_eq!(render("em{x}|e"), "&lt;em&gt;x&lt;/em&gt;");
    }

    #[test]
    fn test_last_primary_wins() {
        assert_eq!(render("em|haml|hic"), "[:em]");
    }

    #[test]
    fn test_unknown_filter_ignored() {
        assert_eq!(render("em|bogus"), "<em></em>");
    }
}
