//! Recursive-descent parser for the HTML abbreviation grammar.
//!
//! ```text
//! subexpr  := siblings
//! siblings := sibling ('+' subexpr)?
//! sibling  := (group | tag | text) multiplier? ('>' subexpr)?
//! group    := '(' subexpr ')'
//! tag      := tagname? ('#' id)? ('.' class)* ('[' attrs ']')? ('{' text '}')?
//! ```
//!
//! Multiplication clones its operand at parse time, instantiating `$`
//! directives with the clone's `(index, total)`; a multiplied parent also
//! distributes its `>`-child per clone. Alias and lorem resolution happen
//! as soon as a tag finishes parsing, so the rest of the pipeline only
//! ever sees plain tags.

use crate::ast::{first_tag_mut, Expr, TagData, TextContent, TextPart};
use crate::error::{ParseError, ParseErrorKind};
use crate::numbering::{instantiate_expr, split_numbering};
use crate::scanner::Scanner;
use crate::tables::Tables;

type ParseResult<T> = Result<T, ParseError>;

/// Alias expansions are parsed recursively; anything deeper than this is a
/// cycle in the alias table.
const MAX_ALIAS_DEPTH: usize = 16;

/// Parse a full abbreviation (expression plus optional `|filter` chain).
/// The result is always an [`Expr::Filter`]; an empty chain means no
/// filters were specified.
pub(crate) fn parse(input: &str, tables: &Tables) -> ParseResult<Expr> {
    let (expr_src, filters) = split_filters(input);
    let mut parser = Parser {
        s: Scanner::new(expr_src),
        tables,
        alias_depth: 0,
    };
    let body = parser.subexpr()?;
    if !parser.s.eof() {
        return Err(ParseError {
            position: parser.s.pos(),
            kind: ParseErrorKind::TrailingInput {
                rest: parser.s.rest().to_string(),
            },
        });
    }
    Ok(Expr::Filter {
        filters: filters.unwrap_or_default(),
        body: Box::new(body),
    })
}

/// Split `expr|f1|f2` into the expression and its filter chain.
///
/// The chain starts at the first `|` outside `{...}` and `"..."`. The
/// split is refused outright when the candidate chain contains `"` or `}`
/// — the source's weak heuristic for "that pipe was probably part of the
/// text", kept as-is rather than silently improved.
fn split_filters(input: &str) -> (&str, Option<Vec<String>>) {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            '{' if !in_quote => depth += 1,
            '}' if !in_quote => depth = depth.saturating_sub(1),
            '|' if depth == 0 && !in_quote => {
                let tail = &input[i + 1..];
                if tail.contains('"') || tail.contains('}') {
                    return (input, None);
                }
                let filters = tail
                    .split('|')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                return (&input[..i], Some(filters));
            }
            _ => {}
        }
    }
    (input, None)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '@' | '-')
}

fn is_attr_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '$' | '@' | '-')
}

/// `lorem`/`ipsum` with an optional word count suffix.
fn lorem_count(name: &str) -> Option<usize> {
    let rest = name
        .strip_prefix("lorem")
        .or_else(|| name.strip_prefix("ipsum"))?;
    if rest.is_empty() {
        return Some(30);
    }
    if rest.chars().all(|c| c.is_ascii_digit()) {
        rest.parse().ok()
    } else {
        None
    }
}

#[derive(PartialEq)]
enum BaseKind {
    Group,
    Tag,
    Text,
}

struct Parser<'a, 't> {
    s: Scanner<'a>,
    tables: &'t Tables,
    alias_depth: usize,
}

impl Parser<'_, '_> {
    fn subexpr(&mut self) -> ParseResult<Expr> {
        let left = self.sibling_unit()?;
        if self.s.consume("+") {
            if !self.s.eof() {
                let cp = self.s.checkpoint();
                match self.subexpr() {
                    Ok(right) => {
                        return Ok(Expr::Sibling {
                            left: Box::new(left),
                            right: Box::new(right),
                        })
                    }
                    Err(e) => {
                        // `ul+)` inside a group: the `+` belongs to the
                        // alias, not a sibling. Recover only when such an
                        // alias exists.
                        if self.plus_alias_key(&left).is_none() {
                            return Err(e);
                        }
                        self.s.restore(cp);
                    }
                }
            }
            return self.expand_trailing_plus(left);
        }
        Ok(left)
    }

    /// The `name+` alias key for a tag expression, when the table has one.
    fn plus_alias_key(&self, expr: &Expr) -> Option<String> {
        match expr {
            Expr::Tag(tag) => tag
                .name
                .as_plain()
                .map(|n| format!("{}+", n))
                .filter(|key| self.tables.alias(key).is_some()),
            _ => None,
        }
    }

    fn sibling_unit(&mut self) -> ParseResult<Expr> {
        let (base, kind) = if self.s.starts_with("(") {
            (self.group()?, BaseKind::Group)
        } else if self.s.starts_with("{") {
            (Expr::Text(self.inner_text()?), BaseKind::Text)
        } else {
            (self.tag()?, BaseKind::Tag)
        };

        let clones = if self.s.starts_with("*") {
            Some(self.multiplier(&base)?)
        } else {
            None
        };

        if kind != BaseKind::Text && self.s.consume(">") {
            let child = self.subexpr()?;
            return Ok(match clones {
                Some(clones) => {
                    let total = clones.len();
                    Expr::List(
                        clones
                            .into_iter()
                            .enumerate()
                            .map(|(i, parent)| Expr::ParentChild {
                                parent: Box::new(parent),
                                child: Box::new(instantiate_expr(&child, i, total)),
                            })
                            .collect(),
                    )
                }
                None => Expr::ParentChild {
                    parent: Box::new(base),
                    child: Box::new(child),
                },
            });
        }

        Ok(match clones {
            Some(clones) => Expr::List(clones),
            None => base,
        })
    }

    fn group(&mut self) -> ParseResult<Expr> {
        self.s.expect("(")?;
        let inner = self.subexpr()?;
        self.s.expect(")")?;
        Ok(inner)
    }

    /// `*N`, cloning `base` with per-clone numbering instantiation.
    fn multiplier(&mut self, base: &Expr) -> ParseResult<Vec<Expr>> {
        self.s.expect("*")?;
        let digits = self.s.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(self.s.error_expected("*n where n is a number"));
        }
        let total: usize = digits
            .parse()
            .map_err(|_| self.s.error_expected("*n where n is a number"))?;
        Ok((0..total)
            .map(|i| instantiate_expr(base, i, total))
            .collect())
    }

    /// Balanced-brace inline text. `\}` and friends unescape to the bare
    /// character; `\$` stays escaped for the numbering pass.
    fn inner_text(&mut self) -> ParseResult<TextContent> {
        self.s.expect("{")?;
        let mut depth = 1usize;
        let mut text = String::new();
        loop {
            match self.s.consume_char() {
                None => {
                    return Err(ParseError {
                        position: self.s.pos(),
                        kind: ParseErrorKind::Expected {
                            description: "inner text".to_string(),
                        },
                    })
                }
                Some('\\') => match self.s.consume_char() {
                    Some('$') => {
                        text.push('\\');
                        text.push('$');
                    }
                    Some(c) => text.push(c),
                    None => {
                        return Err(ParseError {
                            position: self.s.pos(),
                            kind: ParseErrorKind::Expected {
                                description: "inner text".to_string(),
                            },
                        })
                    }
                },
                Some('{') => {
                    depth += 1;
                    text.push('{');
                }
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    text.push('}');
                }
                Some(c) => text.push(c),
            }
        }
        Ok(TextContent::Part(split_numbering(&text)))
    }

    fn tag(&mut self) -> ParseResult<Expr> {
        let (name, has_body) = self.tag_name()?;
        let mut tag = TagData::new(split_numbering(&name), has_body);

        if self.s.consume("#") {
            let id = self.s.take_while(is_ident_char);
            if id.is_empty() {
                return Err(self.s.error_expected("an id after '#'"));
            }
            tag.id = Some(split_numbering(id));
        }
        while self.s.consume(".") {
            let class = self.s.take_while(is_ident_char);
            if class.is_empty() {
                return Err(self.s.error_expected("a class name after '.'"));
            }
            let part = split_numbering(class);
            if !tag.classes.contains(&part) {
                tag.classes.push(part);
            }
        }
        if self.s.starts_with("[") {
            self.attributes(&mut tag)?;
        }
        if self.s.starts_with("{") {
            tag.text = Some(self.inner_text()?);
        }

        self.resolve_tag(tag)
    }

    fn tag_name(&mut self) -> ParseResult<(String, bool)> {
        match self.s.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '!' => {
                let mut name = String::new();
                name.push(c);
                self.s.consume_char();
                name.push_str(self.s.take_while(|c| {
                    c.is_ascii_alphanumeric() || matches!(c, ':' | '!' | '$' | '@' | '-')
                }));
                let has_body = !self.s.consume("/");
                Ok((name, has_body))
            }
            // id/class shorthand with the element left implicit
            Some('#') | Some('.') => Ok(("div".to_string(), true)),
            _ => Err(self.s.error_expected("a tag name, '#', '.', '(' or '{'")),
        }
    }

    fn attributes(&mut self, tag: &mut TagData) -> ParseResult<()> {
        self.s.expect("[")?;
        loop {
            self.s.take_while(|c| c == ' ' || c == ',');
            if self.s.consume("]") {
                return Ok(());
            }
            if self.s.eof() {
                return Err(ParseError {
                    position: self.s.pos(),
                    kind: ParseErrorKind::unexpected_eof(Some("']'".to_string())),
                });
            }
            let name = self.s.take_while(is_attr_name_char);
            if name.is_empty() {
                return Err(self.s.error_expected("an attribute name"));
            }
            let value = if self.s.consume("=") {
                if self.s.consume("\"") {
                    let v = self.s.take_while(|c| c != '"').to_string();
                    self.s.expect("\"")?;
                    v
                } else if self.s.consume("'") {
                    let v = self.s.take_while(|c| c != '\'').to_string();
                    self.s.expect("'")?;
                    v
                } else if self.s.starts_with("{") {
                    // JSX expression value; kept verbatim, braces included
                    self.braced_raw()?
                } else {
                    self.s
                        .take_while(|c| {
                            !matches!(c, ' ' | ',' | '+' | '>' | '{' | '}' | ')' | ']')
                        })
                        .to_string()
                }
            } else {
                String::new()
            };
            let part = split_numbering(&value);
            if let Some(existing) = tag.props.iter_mut().find(|(k, _)| *k == name) {
                existing.1 = part;
            } else {
                tag.props.push((name.to_string(), part));
            }
        }
    }

    fn braced_raw(&mut self) -> ParseResult<String> {
        self.s.expect("{")?;
        let mut out = String::from("{");
        let mut depth = 1usize;
        while depth > 0 {
            match self.s.consume_char() {
                None => {
                    return Err(ParseError {
                        position: self.s.pos(),
                        kind: ParseErrorKind::unexpected_eof(Some("'}'".to_string())),
                    })
                }
                Some(c) => {
                    if c == '{' {
                        depth += 1;
                    } else if c == '}' {
                        depth -= 1;
                    }
                    out.push(c);
                }
            }
        }
        Ok(out)
    }

    /// Turn a freshly-parsed tag into its final node: lorem markers become
    /// text, aliased names become their expanded subtree.
    fn resolve_tag(&mut self, tag: TagData) -> ParseResult<Expr> {
        let plain_name = tag.name.as_plain().map(str::to_string);
        if let Some(name) = plain_name {
            if let Some(count) = lorem_count(&name) {
                let text = Expr::Text(TextContent::Lorem(count));
                if tag.is_bare() {
                    return Ok(text);
                }
                let mut wrapper = tag;
                wrapper.name = TextPart::plain("div");
                wrapper.text = None;
                return Ok(Expr::ParentChild {
                    parent: Box::new(Expr::Tag(wrapper)),
                    child: Box::new(text),
                });
            }
            if let Some(expansion) = self.tables.alias(&name).map(str::to_string) {
                return self.expand_alias(&name, &expansion, tag);
            }
        }
        Ok(Expr::Tag(tag))
    }

    /// `A+` at the end of a sibling chain re-expands the `A+` alias
    /// (`ul+` → `ul>li`); a dangling `+` with no such alias is dropped.
    fn expand_trailing_plus(&mut self, left: Expr) -> ParseResult<Expr> {
        match left {
            Expr::Tag(tag) => {
                let looked_up = tag
                    .name
                    .as_plain()
                    .map(|n| format!("{}+", n))
                    .and_then(|key| {
                        self.tables
                            .alias(&key)
                            .map(|expansion| (key, expansion.to_string()))
                    });
                match looked_up {
                    Some((key, expansion)) => self.expand_alias(&key, &expansion, tag),
                    None => Ok(Expr::Tag(tag)),
                }
            }
            other => Ok(other),
        }
    }

    fn expand_alias(&mut self, key: &str, expansion: &str, caller: TagData) -> ParseResult<Expr> {
        if self.alias_depth >= MAX_ALIAS_DEPTH {
            return Err(self.s.error_expected("a non-cyclic alias expansion"));
        }
        let mut ast = match self.tables.cached_alias_ast(key) {
            Some(cached) => cached,
            None => {
                let mut sub = Parser {
                    s: Scanner::new(expansion),
                    tables: self.tables,
                    alias_depth: self.alias_depth + 1,
                };
                let parsed = sub.subexpr()?;
                self.tables.store_alias_ast(key, parsed.clone());
                parsed
            }
        };
        if let Some(first) = first_tag_mut(&mut ast) {
            merge_tag(first, caller);
        }
        Ok(ast)
    }
}

/// Merge the caller's extras onto the first tag of an aliased subtree:
/// id and text override, classes and props union (props by key, caller
/// wins).
fn merge_tag(target: &mut TagData, caller: TagData) {
    if caller.id.is_some() {
        target.id = caller.id;
    }
    for class in caller.classes {
        if !target.classes.contains(&class) {
            target.classes.push(class);
        }
    }
    for (key, value) in caller.props {
        if let Some(existing) = target.props.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            target.props.push((key, value));
        }
    }
    if caller.text.is_some() {
        target.text = caller.text;
    }
    if !caller.has_body {
        target.has_body = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NumberingPart;

    fn parse_body(input: &str) -> Expr {
        match parse(input, Tables::global()).unwrap() {
            Expr::Filter { body, .. } => *body,
            other => panic!("expected filter wrapper, got {:?}", other),
        }
    }

    fn tag(name: &str) -> TagData {
        TagData::new(TextPart::plain(name), true)
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_simple_tag() {
        assert_eq!(parse_body("span"), Expr::Tag(tag("span")));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_implicit_div() {
        let mut expected = tag("div");
        expected.classes.push(TextPart::plain("row"));
        assert_eq!(parse_body(".row"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_id_and_classes() {
        let mut expected = tag("span");
        expected.id = Some(TextPart::plain("main"));
        expected.classes.push(TextPart::plain("a"));
        expected.classes.push(TextPart::plain("b"));
        assert_eq!(parse_body("span#main.a.b"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_duplicate_classes_collapse() {
        let mut expected = tag("span");
        expected.classes.push(TextPart::plain("a"));
        assert_eq!(parse_body("span.a.a"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_attributes() {
        let mut expected = tag("span");
        expected.props.push(("title".into(), TextPart::plain("hi there")));
        expected.props.push(("rel".into(), TextPart::plain("x")));
        assert_eq!(
            parse_body("span[title=\"hi there\" rel=x]"),
            Expr::Tag(expected)
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_attribute_later_wins() {
        let mut expected = tag("span");
        expected.props.push(("rel".into(), TextPart::plain("b")));
        assert_eq!(parse_body("span[rel=a rel=b]"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_no_body_marker() {
        let expected = TagData::new(TextPart::plain("foo"), false);
        assert_eq!(parse_body("foo/"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_inline_text() {
        let mut expected = tag("span");
        expected.text = Some(TextContent::Part(TextPart::plain("click")));
        assert_eq!(parse_body("span{click}"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_nested_braces_in_text() {
        let mut expected = tag("span");
        expected.text = Some(TextContent::Part(TextPart::plain("a {b} c")));
        assert_eq!(parse_body("span{a {b} c}"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_escaped_brace_in_text() {
        let mut expected = tag("span");
        expected.text = Some(TextContent::Part(TextPart::plain("a}b")));
        assert_eq!(parse_body("span{a\\}b}"), Expr::Tag(expected));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_sibling() {
        assert_eq!(
            parse_body("em+strong"),
            Expr::Sibling {
                left: Box::new(Expr::Tag(tag("em"))),
                right: Box::new(Expr::Tag(tag("strong"))),
            }
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_parent_child() {
        assert_eq!(
            parse_body("em>strong"),
            Expr::ParentChild {
                parent: Box::new(Expr::Tag(tag("em"))),
                child: Box::new(Expr::Tag(tag("strong"))),
            }
        );
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_child_groups_sibling_chain() {
        // em>(strong+b), not (em>strong)+b
        let expected = Expr::ParentChild {
            parent: Box::new(Expr::Tag(tag("em"))),
            child: Box::new(Expr::Sibling {
                left: Box::new(Expr::Tag(tag("strong"))),
                right: Box::new(Expr::Tag(tag("b"))),
            }),
        };
        assert_eq!(parse_body("em>strong+b"), expected);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_multiplication_instantiates_numbering() {
        let body = parse_body("i.x$*2");
        let Expr::List(items) = body else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        let mut first = tag("i");
        first.classes.push(TextPart::plain("x1"));
        let mut second = tag("i");
        second.classes.push(TextPart::plain("x2"));
        assert_eq!(items[0], Expr::Tag(first));
        assert_eq!(items[1], Expr::Tag(second));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_group_multiplication() {
        let body = parse_body("(em+strong)*2");
        let Expr::List(items) = body else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], items[1]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_multiplied_parent_distributes_child() {
        let body = parse_body("i*2>{n $}");
        let Expr::List(items) = body else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        let texts: Vec<_> = items
            .iter()
            .map(|item| match item {
                Expr::ParentChild { child, .. } => match child.as_ref() {
                    Expr::Text(TextContent::Part(TextPart::Plain(s))) => s.clone(),
                    other => panic!("expected resolved text, got {:?}", other),
                },
                other => panic!("expected parent-child, got {:?}", other),
            })
            .collect();
        assert_eq!(texts, vec!["n 1", "n 2"]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unbound_numbering_stays_directive() {
        let body = parse_body("i.x$");
        let Expr::Tag(t) = body else {
            panic!("expected tag");
        };
        assert!(matches!(
            &t.classes[0],
            TextPart::Numberings(parts) if matches!(parts[1], NumberingPart::Numbering { .. })
        ));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_lorem_bare() {
        assert_eq!(parse_body("lorem5"), Expr::Text(TextContent::Lorem(5)));
        assert_eq!(parse_body("ipsum"), Expr::Text(TextContent::Lorem(30)));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_lorem_keeps_decorated_wrapper() {
        let body = parse_body("lorem4.intro");
        let Expr::ParentChild { parent, child } = body else {
            panic!("expected wrapped lorem");
        };
        let Expr::Tag(t) = *parent else {
            panic!("expected div wrapper");
        };
        assert_eq!(t.name, TextPart::plain("div"));
        assert_eq!(t.classes, vec![TextPart::plain("intro")]);
        assert_eq!(*child, Expr::Text(TextContent::Lorem(4)));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_alias_expands_and_merges() {
        let body = parse_body("bq#quote");
        let Expr::Tag(t) = body else {
            panic!("expected tag");
        };
        assert_eq!(t.name, TextPart::plain("blockquote"));
        assert_eq!(t.id, Some(TextPart::plain("quote")));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_trailing_plus_expands_alias() {
        let body = parse_body("ul+");
        let Expr::ParentChild { parent, child } = body else {
            panic!("expected ul>li, got something else");
        };
        assert_eq!(*parent, Expr::Tag(tag("ul")));
        assert_eq!(*child, Expr::Tag(tag("li")));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_alias_cache_is_stable() {
        let first = parse_body("bq");
        let second = parse_body("bq");
        assert_eq!(first, second);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_filter_chain_detached() {
        let Expr::Filter { filters, .. } = parse("div|haml|e", Tables::global()).unwrap() else {
            panic!("expected filter wrapper");
        };
        assert_eq!(filters, vec!["haml".to_string(), "e".to_string()]);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_pipe_inside_text_not_a_filter() {
        let Expr::Filter { filters, body } = parse("em{a|b}", Tables::global()).unwrap() else {
            panic!("expected filter wrapper");
        };
        assert!(filters.is_empty());
        let Expr::Tag(t) = *body else {
            panic!("expected tag");
        };
        assert_eq!(t.text, Some(TextContent::Part(TextPart::plain("a|b"))));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_bad_multiplier() {
        let err = parse("i*x", Tables::global()).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Expected { ref description } if description.contains("*n where n is a number")
        ));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unbalanced_text() {
        let err = parse("em{oops", Tables::global()).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::Expected { ref description } if description == "inner text"
        ));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_unclosed_group() {
        let err = parse("(em+strong", Tables::global()).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_trailing_garbage_reported() {
        let err = parse("em)", Tables::global()).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::TrailingInput { .. }));
    }
}
