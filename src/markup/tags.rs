//! One pass of the tag scanner: copy text through, rebuild admitted tags,
//! drop everything else.

use std::collections::HashMap;

use crate::config::{FilterConfig, is_tag_name};

use super::attributes::{clean_attribute, split_attributes};
use super::escape::escape_attribute_values;

/// Rebuild `source` keeping only admitted tags and attributes.
///
/// Cursor rules, for a `<` at `open`:
///
/// - no `>` after it: the `<` is dropped and scanning resumes right after
///   it, so the rest is kept as text;
/// - another `<` before the next `>`: the first `<` is dropped the same way,
///   which defeats `<<script>`;
/// - otherwise `open..=close` is a tag and the cursor moves past `close`.
///
/// Text between tags is copied verbatim, so the content of a rejected
/// element survives without its markup.
pub(crate) fn clean_tags(config: &FilterConfig, source: &str) -> String {
    let source = escape_attribute_values(source);
    let closing = ClosingTags::scan(&source);
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    while let Some(offset) = source[cursor..].find('<') {
        let open = cursor + offset;
        out.push_str(&source[cursor..open]);

        let body_start = open + 1;
        let delimiter = source[body_start..]
            .find(['<', '>'])
            .map(|i| body_start + i);

        match delimiter {
            Some(close) if source.as_bytes()[close] == b'>' => {
                let closed_later = |name: &str| closing.closes_after(name, close);
                emit_tag(config, &source[body_start..close], closed_later, &mut out);
                cursor = close + 1;
            }
            _ => {
                cursor = body_start;
            }
        }
    }

    out.push_str(&source[cursor..]);
    out
}

/// Append the rebuilt form of one tag body (the text between `<` and `>`),
/// or nothing when the tag is rejected. `closed_later` tells whether a
/// closing tag for a name follows, to choose between `<name>` and
/// `<name />`.
fn emit_tag(
    config: &FilterConfig,
    body: &str,
    closed_later: impl Fn(&str) -> bool,
    out: &mut String,
) {
    let (closing, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let name_end = body
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(name_end);

    if !is_tag_name(name) {
        tracing::trace!("Dropping malformed tag");
        return;
    }
    let name = name.to_ascii_lowercase();
    if config.is_blocked_tag(&name) {
        tracing::trace!("Dropping blocked tag: {name}");
        return;
    }
    if !config.admits_tag(&name) {
        return;
    }

    if closing {
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
        return;
    }

    out.push('<');
    out.push_str(&name);
    for attr in split_attributes(rest)
        .into_iter()
        .filter_map(|fragment| clean_attribute(config, fragment))
    {
        out.push(' ');
        out.push_str(&attr);
    }
    if closed_later(&name) {
        out.push('>');
    } else {
        out.push_str(" />");
    }
}

/// Where each closing tag name last appears in one pass's input.
///
/// Built once per pass so deciding `>` versus ` />` for an opening tag is a
/// lookup rather than a scan of the rest of the input.
struct ClosingTags {
    last: HashMap<String, usize>,
}

impl ClosingTags {
    /// Index every `</name`, keyed by the lower-cased name. The name is the
    /// whole alphanumeric run after `</`, so `</bold>` never counts as `</b`.
    fn scan(source: &str) -> Self {
        let mut last = HashMap::new();
        for (at, _) in source.match_indices("</") {
            let after = &source[at + 2..];
            let len = after
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(after.len());
            if len > 0 {
                last.insert(after[..len].to_ascii_lowercase(), at);
            }
        }
        Self { last }
    }

    /// Whether `</name` occurs after byte offset `offset`.
    fn closes_after(&self, name: &str, offset: usize) -> bool {
        self.last.get(name).is_some_and(|&at| at > offset)
    }
}
