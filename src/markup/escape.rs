//! Pre-pass that neutralizes markup characters inside quoted attribute
//! values, and the CSS `expression()` stripper it applies to each value.

use std::sync::LazyLock;

use regex::Regex;

/// `<`, then anything but `>`, up to `=` and an opening quote.
static ATTR_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<[^>]*?=\s*?("|')"#).expect("valid attribute pattern"));

/// Next attribute of a tag whose previous quoted value was just closed.
static NEXT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[^<>]*?=\s*?("|')"#).expect("valid attribute pattern"));

/// A closing `"` followed by `/>`, `>`, whitespace or end of input.
static DOUBLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""\s*/\s*>|"\s*>|"\s+|"$"#).expect("valid quote pattern"));

static SINGLE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'\s*/\s*>|'\s*>|'\s+|'$").expect("valid quote pattern"));

static CSS_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid comment pattern"));

static EXPRESSION_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i):expression\s*\(").expect("valid expression pattern"));

/// Removed wherever it appears, including where an earlier removal joined
/// two halves into a new one.
const EXPRESSION: &str = ":expression";

/// Escape `<`, `"` and `>` inside every quoted attribute value so the tag
/// scanner cannot be tricked into ending a tag early.
///
/// A value with no closing quote runs to the end of input and is closed
/// with the quote it opened with.
pub(crate) fn escape_attribute_values(source: &str) -> String {
    let mut filtered = String::with_capacity(source.len());
    let mut remainder = source;
    let mut in_tag = false;

    loop {
        let caps = if in_tag {
            NEXT_ATTR_RE
                .captures(remainder)
                .or_else(|| ATTR_OPEN_RE.captures(remainder))
        } else {
            ATTR_OPEN_RE.captures(remainder)
        };
        let Some(caps) = caps else {
            break;
        };
        let (Some(open), Some(quote)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let quote = quote.as_str();
        let value_start = open.end();
        let closer = if quote == "\"" {
            &*DOUBLE_CLOSE_RE
        } else {
            &*SINGLE_CLOSE_RE
        };
        let close = closer.find(&remainder[value_start..]);
        let value_end = close.map_or(remainder.len(), |m| value_start + m.start());
        in_tag = close.is_some_and(|m| !m.as_str().ends_with('>'));

        filtered.push_str(&remainder[..value_start]);
        filtered.push_str(&strip_css_expressions(&escape_value(
            &remainder[value_start..value_end],
        )));
        filtered.push_str(quote);

        // Skip the closing quote itself.
        remainder = remainder.get(value_end + 1..).unwrap_or("");
    }

    filtered.push_str(remainder);
    filtered
}

fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '"' => escaped.push_str("&quot;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Defuse CSS `expression(...)`.
///
/// Comments are removed first so `:exp/**/ression(` cannot hide the call.
/// When a `:expression(` call is present, every `:expression` is removed,
/// including ones formed by an earlier removal. Otherwise the input is returned as is.
pub(crate) fn strip_css_expressions(source: &str) -> String {
    let uncommented = CSS_COMMENT_RE.replace_all(source, "");
    if !EXPRESSION_CALL_RE.is_match(&uncommented) {
        return source.to_string();
    }

    // Removing each match as soon as it is complete leaves the same text as
    // removing matches until none is left, in one pass.
    let mut stripped = String::with_capacity(uncommented.len());
    for c in uncommented.chars() {
        stripped.push(c);
        if ends_with_expression(&stripped) {
            stripped.truncate(stripped.len() - EXPRESSION.len());
        }
    }
    stripped
}

fn ends_with_expression(text: &str) -> bool {
    text.len()
        .checked_sub(EXPRESSION.len())
        .and_then(|at| text.get(at..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(EXPRESSION))
}
