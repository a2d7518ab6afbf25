//! Static literal evaluation.
//!
//! Turns a literal expression into JSON without resolving identifiers or
//! calling anything. The evaluator is written against [`SyntaxNode`] so any
//! parser can supply the tree; the grammar adapter decides what each node
//! looks like as a [`Literal`].

use std::iter::Peekable;
use std::str::Chars;

use serde_json::{Map, Number, Value};

/// A syntax node seen through the literal grammar.
pub enum Literal<N> {
    Str(String),
    Number(Number),
    Bool(bool),
    Null,
    Array(Vec<N>),
    /// Properties with static keys. `None` marks a value that cannot be
    /// evaluated statically, such as a shorthand property.
    Object(Vec<(String, Option<N>)>),
    /// Anything outside the literal grammar.
    Unsupported,
}

/// A node of some syntax tree that can be classified as a literal.
pub trait SyntaxNode: Sized {
    fn literal(&self) -> Literal<Self>;
}

/// Evaluate `node` as a static literal.
///
/// Unsupported sub-expressions become `null` inside objects and are dropped
/// from arrays; they never fail the evaluation.
pub fn evaluate<N: SyntaxNode>(node: &N) -> Value {
    match node.literal() {
        Literal::Str(text) => Value::String(text),
        Literal::Number(number) => Value::Number(number),
        Literal::Bool(flag) => Value::Bool(flag),
        Literal::Null | Literal::Unsupported => Value::Null,
        Literal::Array(elements) => Value::Array(
            elements
                .iter()
                .filter(|element| !matches!(element.literal(), Literal::Unsupported))
                .map(evaluate)
                .collect(),
        ),
        Literal::Object(properties) => {
            let mut object = Map::new();
            for (key, value) in properties {
                let value = value.as_ref().map(evaluate).unwrap_or(Value::Null);
                object.insert(key, value);
            }
            Value::Object(object)
        }
    }
}

/// Parse a JS numeric literal: decimal, `0x`/`0o`/`0b`, exponents and `_`
/// separators. Non-finite values and legacy octal forms such as `0755` are
/// rejected.
pub fn parse_number(text: &str, negative: bool) -> Option<Number> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };

    if let Some(radix) = radix {
        let magnitude = i64::from_str_radix(&lower[2..], radix).ok()?;
        return Some(Number::from(if negative { -magnitude } else { magnitude }));
    }

    if lower.starts_with('0') && lower[1..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let integral = !lower.contains(['.', 'e']);
    if integral {
        if let Ok(magnitude) = lower.parse::<i64>() {
            return Some(Number::from(if negative { -magnitude } else { magnitude }));
        }
    }

    let float: f64 = lower.parse().ok()?;
    Number::from_f64(if negative { -float } else { float })
}

/// Decode the escapes of a JS string or template body (quotes stripped).
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code(&mut out, &hex);
            }
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let hex: String = chars.by_ref().take_while(|&c| c != '}').collect();
                    push_code(&mut out, &hex);
                    continue;
                }
                let hex: String = chars.by_ref().take(4).collect();
                let Ok(high) = u32::from_str_radix(&hex, 16) else {
                    out.push('\u{fffd}');
                    continue;
                };
                if (0xD800..=0xDBFF).contains(&high) {
                    if let Some(low) = low_surrogate(&mut chars) {
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                        continue;
                    }
                }
                out.push(char::from_u32(high).unwrap_or('\u{fffd}'));
            }
            other => out.push(other),
        }
    }
    out
}

/// Consume a `\uXXXX` low surrogate if one follows.
fn low_surrogate(chars: &mut Peekable<Chars<'_>>) -> Option<u32> {
    let mut ahead = chars.clone();
    if ahead.next() != Some('\\') || ahead.next() != Some('u') {
        return None;
    }
    let hex: String = ahead.by_ref().take(4).collect();
    let low = u32::from_str_radix(&hex, 16).ok()?;
    if !(0xDC00..=0xDFFF).contains(&low) {
        return None;
    }
    *chars = ahead;
    Some(low)
}

fn push_code(out: &mut String, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => out.push('\u{fffd}'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Minimal tree for exercising the evaluator without a parser.
    enum Fake {
        Str(&'static str),
        Num(i64),
        Flag(bool),
        Ident,
        List(Vec<Fake>),
        Obj(Vec<(&'static str, Option<Fake>)>),
    }

    impl SyntaxNode for &Fake {
        fn literal(&self) -> Literal<Self> {
            match *self {
                Fake::Str(text) => Literal::Str(text.to_string()),
                Fake::Num(n) => Literal::Number(Number::from(*n)),
                Fake::Flag(flag) => Literal::Bool(*flag),
                Fake::Ident => Literal::Unsupported,
                Fake::List(items) => Literal::Array(items.iter().collect()),
                Fake::Obj(props) => Literal::Object(
                    props
                        .iter()
                        .map(|(key, value)| (key.to_string(), value.as_ref()))
                        .collect(),
                ),
            }
        }
    }

    #[test]
    fn evaluates_nested_literals() {
        let tree = Fake::Obj(vec![
            ("type", Some(Fake::Str("card"))),
            ("count", Some(Fake::Num(3))),
            (
                "schema",
                Some(Fake::Obj(vec![(
                    "required",
                    Some(Fake::List(vec![Fake::Str("title"), Fake::Flag(false)])),
                )])),
            ),
        ]);

        assert_eq!(
            evaluate(&&tree),
            json!({ "type": "card", "count": 3, "schema": { "required": ["title", false] } })
        );
    }

    #[test]
    fn unsupported_becomes_null_or_is_dropped() {
        let tree = Fake::Obj(vec![
            ("ref", Some(Fake::Ident)),
            ("short", None),
            ("items", Some(Fake::List(vec![Fake::Ident, Fake::Str("kept")]))),
        ]);

        assert_eq!(
            evaluate(&&tree),
            json!({ "ref": null, "short": null, "items": ["kept"] })
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(parse_number("42", false), Some(Number::from(42)));
        assert_eq!(parse_number("1_000", true), Some(Number::from(-1000)));
        assert_eq!(parse_number("0xFF", false), Some(Number::from(255)));
        assert_eq!(parse_number("0b101", false), Some(Number::from(5)));
        assert_eq!(parse_number("1.5", false), Number::from_f64(1.5));
        assert_eq!(parse_number("2e3", false), Number::from_f64(2000.0));
        assert_eq!(parse_number("1e999", false), None);
        assert_eq!(parse_number("0", false), Some(Number::from(0)));
        assert_eq!(parse_number("0.25", false), Number::from_f64(0.25));
        assert_eq!(parse_number("0755", false), None);
        assert_eq!(parse_number("08", true), None);
    }

    #[test]
    fn escapes() {
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(unescape(r"\x41B\u{1F600}"), "AB\u{1F600}");
        assert_eq!(unescape("line\\\ncontinued"), "linecontinued");
        assert_eq!(unescape(r"\uD83D\uDE00!"), "\u{1F600}!");
        assert_eq!(unescape(r"\uD83Dx"), "\u{fffd}x");
        assert_eq!(unescape(r"\uD83D\u0041"), "\u{fffd}A");
    }
}
