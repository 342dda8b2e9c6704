// ABOUTME: Reader module - turns source text into Values using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, take_while, take_while1},
    character::complete::{char, none_of, one_of},
    combinator::{not, peek, recognize, value},
    multi::many0,
    IResult, Parser,
};

use crate::value::{MapKey, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Skips whitespace, commas (treated as whitespace per the grammar), and `;`
/// line comments.
fn ws(input: &str) -> IResult<&str, ()> {
    let is_ws = |c: char| c.is_whitespace() || c == ',';
    let comment = |input| -> IResult<&str, ()> {
        let (input, _) = char(';')(input)?;
        let (input, _) = take_while(|c| c != '\n')(input)?;
        Ok((input, ()))
    };
    many0(alt((value((), take_while1(is_ws)), comment)))
        .map(|_| ())
        .parse(input)
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric()
        || "+-*/%<>=!?_.*&|^~$".contains(c)
}

/// Parses the whole token as an integer, requiring the entire thing to be
/// digits (with an optional leading `-`). A token like `1+` or `123abc`
/// isn't a number at all, even though it starts with a digit — it falls
/// through to `Symbol` below.
fn as_integer(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Reads the maximal run of symbol characters as one token, then classifies
/// it as a whole: an integer, one of the `true`/`false`/`nil` literals, or a
/// plain Symbol. Munching the whole token before classifying (rather than
/// trying to match digits first and falling back) is what keeps an atom like
/// `1+` from being split into a number and a separate symbol.
fn parse_atom(input: &str) -> IResult<&str, Value> {
    let (input, text) = recognize((
        not(peek(char('"'))),
        take_while1(is_symbol_char),
    ))
    .parse(input)?;
    let v = if let Some(n) = as_integer(text) {
        Value::Number(n)
    } else {
        match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "nil" => Value::Nil,
            _ => Value::Symbol(text.to_string()),
        }
    };
    Ok((input, v))
}

fn parse_keyword(input: &str) -> IResult<&str, Value> {
    let (input, _) = char(':')(input)?;
    let (input, name) = take_while1(is_symbol_char)(input)?;
    Ok((input, Value::Keyword(name.to_string())))
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::String(String::new())));
    }
    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\n"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut result = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    Ok((input, Value::String(result)))
}

fn wrap(name: &str, input: &str) -> IResult<&str, Value> {
    let (input, expr) = parse_expr(input)?;
    Ok((input, Value::list(vec![Value::symbol(name), expr])))
}

fn parse_prefixed(input: &str) -> IResult<&str, Value> {
    alt((
        |i| {
            let (i, _) = tag("~@")(i)?;
            wrap("splice-unquote", i)
        },
        |i| {
            let (i, _) = char('\'')(i)?;
            wrap("quote", i)
        },
        |i| {
            let (i, _) = char('`')(i)?;
            wrap("quasiquote", i)
        },
        |i| {
            let (i, _) = char('~')(i)?;
            wrap("unquote", i)
        },
        |i| {
            let (i, _) = char('@')(i)?;
            wrap("deref", i)
        },
        |i| {
            let (i, _) = char('^')(i)?;
            let (i, meta) = parse_expr(i)?;
            let (i, _) = ws(i)?;
            let (i, target) = parse_expr(i)?;
            Ok((i, Value::list(vec![Value::symbol("with-meta"), target, meta])))
        },
    ))
    .parse(input)
}

fn parse_collection(input: &str, open: char, close: char) -> IResult<&str, Vec<Value>> {
    let (input, _) = char(open)(input)?;
    let (input, _) = ws(input)?;
    let mut items = Vec::new();
    let mut remaining = input;
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(close)(remaining) {
            return Ok((rest, items));
        }
        if remaining.is_empty() {
            return Err(nom::Err::Error(nom::error::Error::new(remaining, nom::error::ErrorKind::Eof)));
        }
        let (rest, expr) = parse_expr(remaining)?;
        items.push(expr);
        let (rest, _) = ws(rest)?;
        remaining = rest;
    }
}

fn parse_list(input: &str) -> IResult<&str, Value> {
    parse_collection(input, '(', ')').map(|(rest, items)| (rest, Value::list(items)))
}

fn parse_vector(input: &str) -> IResult<&str, Value> {
    parse_collection(input, '[', ']').map(|(rest, items)| (rest, Value::vector(items)))
}

fn parse_map(input: &str) -> IResult<&str, Value> {
    let (input, items) = parse_collection(input, '{', '}')?;
    if items.len() % 2 != 0 {
        return Err(nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof)));
    }
    let mut map = HashMap::new();
    let mut it = items.into_iter();
    while let (Some(k), Some(v)) = (it.next(), it.next()) {
        let key = MapKey::from_value(&k)
            .ok_or_else(|| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Eof)))?;
        map.insert(key, v);
    }
    Ok((input, Value::Map(Rc::new(map))))
}

fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws(input)?;
    alt((
        parse_prefixed,
        parse_list,
        parse_vector,
        parse_map,
        parse_string,
        parse_keyword,
        parse_atom,
    ))
    .parse(input)
}

/// Reads one form from `input`, returning it along with the unconsumed
/// remainder (so a caller can loop over a multi-form script or REPL line).
pub fn read_str(input: &str) -> Result<(Value, &str), String> {
    let (rest, _) = ws(input).map_err(|e| format!("read error: {e}"))?;
    if rest.is_empty() {
        return Err("read error: unexpected EOF".to_string());
    }
    match parse_expr(rest) {
        Ok((rest, value)) => Ok((value, rest)),
        Err(e) => Err(format!("read error: {e}")),
    }
}

/// Reads exactly one form and requires nothing but whitespace afterward.
/// Used by the `read-string` builtin.
pub fn read(input: &str) -> Result<Value, String> {
    let (value, rest) = read_str(input)?;
    let (rest, _) = ws(rest).unwrap_or((rest, ()));
    if !rest.is_empty() {
        return Err(format!("read error: trailing input: '{rest}'"));
    }
    Ok(value)
}

/// True if `input` has no more forms left to read (only whitespace/comments).
pub fn is_exhausted(input: &str) -> bool {
    ws(input).map(|(rest, _)| rest.is_empty()).unwrap_or(false)
}
