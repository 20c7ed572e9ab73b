//! `$` numbering directives.
//!
//! A run of `k` dollar signs in any literal fragment becomes a width-`k`
//! zero-padded clone number. An optional `@` modifier adjusts it: `@-`
//! reverses direction, `@B` sets the base, `@-B` does both. `\$` is a
//! literal dollar.

use crate::ast::{Expr, NumberingPart, TagData, TextContent, TextPart};

/// Split a literal fragment into literal/directive parts. A fragment with
/// no directive stays a plain string, unwrapped.
pub(crate) fn split_numbering(s: &str) -> TextPart {
    let mut parts: Vec<NumberingPart> = Vec::new();
    let mut literal = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                literal.push('$');
            }
            '$' => {
                let mut digits = 1;
                while chars.peek() == Some(&'$') {
                    chars.next();
                    digits += 1;
                }
                let mut ascending = true;
                let mut base: i64 = 1;
                if chars.peek() == Some(&'@') {
                    // Look past the '@' before committing: a lone '@' with
                    // no '-' or digits is literal text.
                    let mut look = chars.clone();
                    look.next();
                    let descending = look.peek() == Some(&'-');
                    if descending {
                        look.next();
                    }
                    let mut digit_run = String::new();
                    while let Some(d) = look.peek().filter(|d| d.is_ascii_digit()) {
                        digit_run.push(*d);
                        look.next();
                    }
                    if descending || !digit_run.is_empty() {
                        ascending = !descending;
                        if !digit_run.is_empty() {
                            base = digit_run.parse().unwrap_or(1);
                        }
                        chars = look;
                    }
                }
                if !literal.is_empty() {
                    parts.push(NumberingPart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(NumberingPart::Numbering {
                    digits,
                    ascending,
                    base,
                });
            }
            _ => literal.push(c),
        }
    }

    if parts.is_empty() {
        return TextPart::Plain(literal);
    }
    if !literal.is_empty() {
        parts.push(NumberingPart::Literal(literal));
    }
    TextPart::Numberings(parts)
}

/// Render a part for clone `index` of `total`.
pub(crate) fn resolve(part: &TextPart, index: usize, total: usize) -> String {
    match part {
        TextPart::Plain(s) => s.clone(),
        TextPart::Numberings(parts) => {
            let mut out = String::new();
            for p in parts {
                match p {
                    NumberingPart::Literal(s) => out.push_str(s),
                    NumberingPart::Numbering {
                        digits,
                        ascending,
                        base,
                    } => {
                        let value = if *ascending {
                            *base + index as i64
                        } else {
                            (total as i64 + *base - 1) - index as i64
                        };
                        out.push_str(&format!("{:0width$}", value, width = *digits));
                    }
                }
            }
            out
        }
    }
}

fn instantiate_part(part: &TextPart, index: usize, total: usize) -> TextPart {
    match part {
        TextPart::Plain(_) => part.clone(),
        TextPart::Numberings(_) => TextPart::Plain(resolve(part, index, total)),
    }
}

fn instantiate_content(content: &TextContent, index: usize, total: usize) -> TextContent {
    match content {
        TextContent::Part(part) => TextContent::Part(instantiate_part(part, index, total)),
        TextContent::Lorem(n) => TextContent::Lorem(*n),
    }
}

fn instantiate_tag(tag: &TagData, index: usize, total: usize) -> TagData {
    TagData {
        name: instantiate_part(&tag.name, index, total),
        has_body: tag.has_body,
        id: tag.id.as_ref().map(|p| instantiate_part(p, index, total)),
        classes: tag
            .classes
            .iter()
            .map(|p| instantiate_part(p, index, total))
            .collect(),
        props: tag
            .props
            .iter()
            .map(|(k, v)| (k.clone(), instantiate_part(v, index, total)))
            .collect(),
        text: tag
            .text
            .as_ref()
            .map(|t| instantiate_content(t, index, total)),
    }
}

/// Deep-copy `expr` with every unbound numbering directive resolved for
/// clone `index` of `total`. Directives already resolved by an inner
/// multiplier are literals by this point and pass through untouched.
pub(crate) fn instantiate_expr(expr: &Expr, index: usize, total: usize) -> Expr {
    match expr {
        Expr::Filter { filters, body } => Expr::Filter {
            filters: filters.clone(),
            body: Box::new(instantiate_expr(body, index, total)),
        },
        Expr::List(items) => Expr::List(
            items
                .iter()
                .map(|e| instantiate_expr(e, index, total))
                .collect(),
        ),
        Expr::Tag(tag) => Expr::Tag(instantiate_tag(tag, index, total)),
        Expr::Text(content) => Expr::Text(instantiate_content(content, index, total)),
        Expr::ParentChild { parent, child } => Expr::ParentChild {
            parent: Box::new(instantiate_expr(parent, index, total)),
            child: Box::new(instantiate_expr(child, index, total)),
        },
        Expr::Sibling { left, right } => Expr::Sibling {
            left: Box::new(instantiate_expr(left, index, total)),
            right: Box::new(instantiate_expr(right, index, total)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbering(digits: usize, ascending: bool, base: i64) -> NumberingPart {
        NumberingPart::Numbering {
            digits,
            ascending,
            base,
        }
    }

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(split_numbering("item"), TextPart::Plain("item".into()));
    }

    #[test]
    fn test_escaped_dollar_is_literal() {
        assert_eq!(split_numbering("a\\$b"), TextPart::Plain("a$b".into()));
    }

    #[test]
    fn test_simple_run() {
        assert_eq!(
            split_numbering("item$$$"),
            TextPart::Numberings(vec![
                NumberingPart::Literal("item".into()),
                numbering(3, true, 1),
            ])
        );
    }

    #[test]
    fn test_base_modifier() {
        assert_eq!(
            split_numbering("a$@3"),
            TextPart::Numberings(vec![NumberingPart::Literal("a".into()), numbering(1, true, 3)])
        );
    }

    #[test]
    fn test_descending_modifier() {
        assert_eq!(
            split_numbering("a$@-"),
            TextPart::Numberings(vec![
                NumberingPart::Literal("a".into()),
                numbering(1, false, 1),
            ])
        );
    }

    #[test]
    fn test_descending_with_base() {
        assert_eq!(
            split_numbering("a$@-5"),
            TextPart::Numberings(vec![
                NumberingPart::Literal("a".into()),
                numbering(1, false, 5),
            ])
        );
    }

    #[test]
    fn test_bare_at_stays_literal() {
        assert_eq!(
            split_numbering("$@x"),
            TextPart::Numberings(vec![numbering(1, true, 1), NumberingPart::Literal("@x".into())])
        );
    }

    #[test]
    fn test_resolve_padding() {
        let part = split_numbering("a$$$");
        assert_eq!(resolve(&part, 0, 3), "a001");
        assert_eq!(resolve(&part, 2, 3), "a003");
    }

    #[test]
    fn test_resolve_descending() {
        let part = split_numbering("a$@-");
        assert_eq!(resolve(&part, 0, 3), "a3");
        assert_eq!(resolve(&part, 1, 3), "a2");
        assert_eq!(resolve(&part, 2, 3), "a1");
    }

    #[test]
    fn test_resolve_descending_base() {
        // 3 clones counting down from (3 + 4 - 1) = 6
        let part = split_numbering("a$@-4");
        assert_eq!(resolve(&part, 0, 3), "a6");
        assert_eq!(resolve(&part, 2, 3), "a4");
    }

    #[test]
    fn test_resolve_base() {
        let part = split_numbering("a$@10");
        assert_eq!(resolve(&part, 0, 2), "a10");
        assert_eq!(resolve(&part, 1, 2), "a11");
    }
}
