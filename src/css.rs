//! The CSS/Sass expansion pipeline.
//!
//! An abbreviation splits on `+` into property subexpressions; each one
//! is `[vendor-spec] key [args...] [!]`. Arguments are numbers with unit
//! aliases, `#`-colors, or raw keywords; rendering goes through the
//! snippet template for the key when one exists and falls back to
//! `key: args;` otherwise. Vendor-prefixed copies of the rendered line
//! are prepended last, after the important flag lands.

use crate::error::{ExpandError, ExpandResult};
use crate::options::{ColorCase, Options};
use crate::scanner::Scanner;
use crate::tables::{CssPiece, CssTemplate, Tables};

#[derive(Debug, Clone, PartialEq)]
enum VendorSpec {
    None,
    /// `-key`: prefixes come from the per-property table.
    Auto,
    /// `-wm-key`: an explicit subset of webkit/moz/ms/o.
    Explicit(Vec<char>),
}

#[derive(Debug, Clone, PartialEq)]
enum CssArg {
    Number { repr: String, unit: String },
    Color { hex: String, rgb_fn: bool },
    Raw(String),
}

pub(crate) fn expand_css(
    input: &str,
    sass: bool,
    opts: &Options,
    tables: &Tables,
) -> ExpandResult<String> {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Err(ExpandError::invalid_input("empty abbreviation"));
    }
    let lines: Vec<String> = tokens
        .iter()
        .map(|token| render_token(token, sass, opts, tables))
        .collect();
    Ok(lines.join("\n"))
}

/// Split on `+`, re-joining a part onto its predecessor when it starts
/// like an argument (space, `#`, `$`, digit, `-digit`) rather than a
/// property key. An empty part re-joins as a literal `+`, keeping keys
/// like `bd+` intact.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for part in input.split('+') {
        let continuation = part.is_empty()
            || part.starts_with([' ', '#', '$'])
            || part.chars().next().is_some_and(|c| c.is_ascii_digit())
            || (part.starts_with('-')
                && part[1..].chars().next().is_some_and(|c| c.is_ascii_digit()));
        match tokens.last_mut() {
            Some(last) if continuation => {
                if part.is_empty() {
                    last.push('+');
                } else {
                    last.push(' ');
                    last.push_str(part);
                }
            }
            _ => {
                if !part.trim().is_empty() {
                    tokens.push(part.to_string());
                }
            }
        }
    }
    tokens
}

fn render_token(token: &str, sass: bool, opts: &Options, tables: &Tables) -> String {
    let trimmed = token.trim();
    let (body, important) = match trimmed.strip_suffix('!') {
        Some(stripped) => (stripped, true),
        None => (trimmed, false),
    };
    let (vendor, body) = parse_vendor(body);
    let (key, args_tail) = split_key(body);
    if key.is_empty() {
        return body.to_string();
    }
    let args = parse_args(args_tail, tables);

    let (mut line, property) = match tables.css_snippet(key, sass) {
        Some(raw) => {
            let raw = raw.to_string();
            let property = match raw.split_once(':') {
                Some((prop, _)) => prop.trim().to_string(),
                None => key.to_string(),
            };
            let template = tables.css_template(&raw);
            (
                render_template(&template, &args, &property, opts, tables),
                property,
            )
        }
        None => {
            let unitless = tables.is_unitless(key);
            let rendered: Vec<String> = args
                .iter()
                .map(|arg| render_arg(arg, unitless, opts))
                .collect();
            (format!("{}: {};", key, rendered.join(" ")), key.to_string())
        }
    };

    if important {
        if let Some(stripped) = line.strip_suffix(';') {
            line = format!("{} !important;", stripped);
        }
    }
    if sass {
        if let Some(stripped) = line.strip_suffix(';') {
            line = stripped.to_string();
        }
    }
    apply_vendor(line, vendor, &property, tables)
}

fn parse_vendor(body: &str) -> (VendorSpec, &str) {
    let Some(rest) = body.strip_prefix('-') else {
        return (VendorSpec::None, body);
    };
    if let Some(end) = rest.find('-') {
        let letters = &rest[..end];
        if !letters.is_empty() && letters.chars().all(|c| matches!(c, 'w' | 'm' | 's' | 'o')) {
            return (VendorSpec::Explicit(letters.chars().collect()), &rest[end + 1..]);
        }
    }
    (VendorSpec::Auto, rest)
}

/// The key ends at the first character that can start an argument.
fn split_key(body: &str) -> (&str, &str) {
    for (i, c) in body.char_indices() {
        let next_is_digit = body[i + c.len_utf8()..]
            .chars()
            .next()
            .is_some_and(|n| n.is_ascii_digit());
        if c == ' '
            || c == '#'
            || c == '$'
            || c.is_ascii_digit()
            || (c == '-' && next_is_digit)
        {
            return (&body[..i], &body[i..]);
        }
    }
    (body, "")
}

fn parse_args(tail: &str, tables: &Tables) -> Vec<CssArg> {
    let mut s = Scanner::new(tail);
    let mut args = Vec::new();
    loop {
        s.take_while(|c| c == ' ');
        if s.eof() {
            break;
        }
        if let Some(arg) = parse_number(&mut s, tables) {
            args.push(arg);
            continue;
        }
        if s.starts_with("#") {
            parse_color(&mut s, tables, &mut args);
            continue;
        }
        let word = s.take_while(|c| c != ' ');
        let value = tables.keyword_alias(word).unwrap_or(word);
        args.push(CssArg::Raw(value.to_string()));
    }
    args
}

/// `-?[0-9.]+` plus a trailing unit: `-` is the px separator alias, a
/// letter run maps through the unit table, an empty unit picks the
/// int/float default.
fn parse_number(s: &mut Scanner, tables: &Tables) -> Option<CssArg> {
    let cp = s.checkpoint();
    let mut repr = String::new();
    if s.consume("-") {
        repr.push('-');
    }
    let digits = s.take_while(|c| c.is_ascii_digit() || c == '.');
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        s.restore(cp);
        return None;
    }
    repr.push_str(digits);

    let unit_raw = if s.consume("-") {
        "-".to_string()
    } else if s.consume("%") {
        "%".to_string()
    } else {
        s.take_while(|c| c.is_ascii_alphabetic()).to_string()
    };
    let unit = if unit_raw.is_empty() {
        if repr.contains('.') {
            tables.float_unit().to_string()
        } else {
            tables.int_unit().to_string()
        }
    } else {
        tables
            .unit_alias(&unit_raw)
            .map(str::to_string)
            .unwrap_or(unit_raw)
    };
    Some(CssArg::Number { repr, unit })
}

/// `#` + 1-6 hex digits, an optional fractional alpha (consumed and
/// dropped; there is no rgba output form), an optional `rgb` marker, and
/// an optional trailing keyword alias emitted as its own argument.
fn parse_color(s: &mut Scanner, tables: &Tables, args: &mut Vec<CssArg>) {
    s.consume("#");
    let mut hex = String::new();
    while hex.len() < 6 {
        match s.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(c);
                s.consume_char();
            }
            _ => break,
        }
    }
    if hex.is_empty() {
        let rest = s.take_while(|c| c != ' ');
        args.push(CssArg::Raw(format!("#{}", rest)));
        return;
    }

    let cp = s.checkpoint();
    if s.consume(".") {
        let alpha = s.take_while(|c| c.is_ascii_digit());
        if alpha.is_empty() {
            s.restore(cp);
        }
    }
    let rgb_fn = s.consume("rgb");
    args.push(CssArg::Color { hex, rgb_fn });

    if let Some((key, value)) = tables.color_trailing_alias(s.rest()) {
        let after = &s.rest()[key.len()..];
        let at_boundary = after
            .chars()
            .next()
            .map_or(true, |c| c == ' ' || c == '#' || c == '-' || c.is_ascii_digit());
        if at_boundary {
            s.consume(key);
            args.push(CssArg::Raw(value.to_string()));
        }
    }
}

fn render_template(
    template: &CssTemplate,
    args: &[CssArg],
    property: &str,
    opts: &Options,
    tables: &Tables,
) -> String {
    let unitless = tables.is_unitless(property);
    let mut out = String::new();
    for piece in &template.pieces {
        match piece {
            CssPiece::Literal(text) => out.push_str(text),
            CssPiece::Slot { index, default } => {
                let value = if *index == template.max_index && args.len() > template.max_index {
                    // the last slot absorbs excess arguments
                    args[*index - 1..]
                        .iter()
                        .map(|arg| render_arg(arg, unitless, opts))
                        .collect::<Vec<_>>()
                        .join(" ")
                } else {
                    match args.get(*index - 1) {
                        Some(arg) => {
                            let rendered = render_arg(arg, unitless, opts);
                            if rendered.is_empty() {
                                default.clone()
                            } else {
                                rendered
                            }
                        }
                        None => default.clone(),
                    }
                };
                out.push_str(&value);
            }
        }
    }
    out
}

fn render_arg(arg: &CssArg, unitless: bool, opts: &Options) -> String {
    match arg {
        CssArg::Number { repr, unit } => {
            if unitless {
                repr.clone()
            } else {
                format!("{}{}", repr, unit)
            }
        }
        CssArg::Color { hex, rgb_fn } => render_color(hex, *rgb_fn, opts),
        CssArg::Raw(text) => text.clone(),
    }
}

fn render_color(hex: &str, rgb_fn: bool, opts: &Options) -> String {
    let six: String = match hex.len() {
        1 => hex.repeat(6),
        2 => hex.repeat(3),
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        _ => {
            let mut padded = hex.to_string();
            while padded.len() < 6 {
                padded.push('0');
            }
            padded
        }
    };
    if rgb_fn {
        let r = u8::from_str_radix(&six[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&six[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&six[4..6], 16).unwrap_or(0);
        return format!("rgb({},{},{})", r, g, b);
    }
    let mut out = six;
    if opts.color_shorten {
        let b = out.as_bytes();
        if b[0] == b[1] && b[2] == b[3] && b[4] == b[5] {
            out = format!("{}{}{}", b[0] as char, b[2] as char, b[4] as char);
        }
    }
    match opts.color_case {
        ColorCase::Auto => {}
        ColorCase::Upper => out = out.to_uppercase(),
        ColorCase::Lower => out = out.to_lowercase(),
    }
    format!("#{}", out)
}

fn apply_vendor(line: String, vendor: VendorSpec, property: &str, tables: &Tables) -> String {
    let prefixes: Vec<String> = match vendor {
        VendorSpec::None => return line,
        VendorSpec::Auto => tables.vendor_prefixes_for(property),
        VendorSpec::Explicit(letters) => letters
            .iter()
            .filter_map(|c| match c {
                'w' => Some("webkit"),
                'm' => Some("moz"),
                's' => Some("ms"),
                'o' => Some("o"),
                _ => None,
            })
            .map(String::from)
            .collect(),
    };
    let mut lines: Vec<String> = prefixes
        .iter()
        .map(|prefix| format!("-{}-{}", prefix, line))
        .collect();
    lines.push(line);
    lines.join("\n")
}
