//! Attribute splitting and per-attribute cleaning.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::FilterConfig;

/// Anything but letters, digits, hyphens and whitespace.
static NAME_JUNK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\-\s]").expect("valid name pattern"));

static SCRIPT_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:(?:java|vb|live)script|behaviour|mocha)\s*(?::|&colon;|&column;)")
        .expect("valid scheme pattern")
});

/// Split the part of a tag body after its name into attribute fragments.
///
/// Fragments are separated by whitespace outside `"`/`'` quotes. Whitespace
/// around `=` does not separate, so `href = "x"` stays one fragment. A
/// trailing self-closing `/` is dropped.
pub(crate) fn split_attributes(rest: &str) -> Vec<&str> {
    let rest = strip_self_closing(rest);
    let mut fragments = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;
    // Last character of the pending fragment, outside any whitespace run.
    let mut last: Option<char> = None;
    let mut chars = rest.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            last = Some(c);
            continue;
        }
        if c.is_whitespace() {
            while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
            let Some(s) = start else {
                continue;
            };
            let next = chars.peek().map(|&(_, c)| c);
            if last == Some('=') || next == Some('=') {
                continue;
            }
            fragments.push(&rest[s..i]);
            start = None;
            last = None;
            continue;
        }

        start.get_or_insert(i);
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        last = Some(c);
    }

    if let Some(s) = start {
        fragments.push(rest[s..].trim_end());
    }
    fragments
}

/// `<br/>`, `<img src="a" />` and `<hr />` end in a marker, not an
/// attribute. An unquoted value such as `href=/path/` keeps its slash.
fn strip_self_closing(rest: &str) -> &str {
    let trimmed = rest.trim_end();
    match trimmed.strip_suffix('/') {
        Some(before)
            if before.is_empty()
                || before.ends_with(char::is_whitespace)
                || before.ends_with(['"', '\'']) =>
        {
            before
        }
        _ => trimmed,
    }
}

/// Clean one `name=value` fragment, returning `name="value"` or `None` when
/// the attribute must be dropped.
pub(crate) fn clean_attribute(config: &FilterConfig, fragment: &str) -> Option<String> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return None;
    }

    let (raw_name, raw_value) = match fragment.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (fragment, None),
    };

    // Only the last word counts when stray text precedes the name.
    let raw_name = raw_name.split_whitespace().last().unwrap_or_default();
    let name = clean_name(config, raw_name);

    if !name.chars().next().is_some_and(char::is_alphabetic) {
        tracing::trace!("Dropping attribute with unusable name");
        return None;
    }
    if config.is_blocked_attribute(&name) {
        tracing::trace!("Dropping blocked attribute: {name}");
        return None;
    }

    // Bare attributes such as `checked` are not supported.
    let value = clean_value(config, raw_value?);

    if check_attribute(&name, &value) {
        tracing::trace!("Dropping script-bearing attribute: {name}");
        return None;
    }
    if !config.admits_attribute(&name) {
        return None;
    }

    Some(format!("{name}=\"{value}\""))
}

fn clean_name(config: &FilterConfig, raw: &str) -> String {
    let name = raw.to_lowercase();
    let name = html_escape::decode_html_entities(&name);
    let name = config.strip_blocked_chars(&name);
    let name = NAME_JUNK_RE.replace_all(&name, "");
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn clean_value(config: &FilterConfig, raw: &str) -> String {
    let value = config.strip_blocked_chars(raw);
    let value = value
        .trim()
        .replace("&#", "")
        .replace(['\r', '\n', '"'], "");
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value.as_str());
    strip_slashes(value)
}

/// Drop each backslash, keeping the character it escapes. `\\` becomes `\`.
fn strip_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether an attribute value carries script: a script URL scheme, CSS
/// `behaviour:`, or `expression` in a `style`.
///
/// The value is decoded, lower-cased and stripped of whitespace and control
/// characters first, since browsers ignore those inside a URL scheme.
pub fn check_attribute(name: &str, value: &str) -> bool {
    let decoded = html_escape::decode_html_entities(value);
    let probe: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase();

    (name.eq_ignore_ascii_case("style") && probe.contains("expression"))
        || SCRIPT_SCHEME_RE.is_match(&probe)
}
