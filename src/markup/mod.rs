//! Markup cleaning for the `string`/`html` filter types.
//!
//! The pipeline decodes HTML entities, then runs the tag scanner until the
//! output stops changing. The two steps repeat together until neither
//! changes anything, so the result is stable under a second cleaning.
//! Both loops are capped at a few rounds. Input that is still changing at
//! the cap loses every `<`, `>` and `&`.
//!
//! Stages, in the order one scanner pass applies them:
//!
//! - [`escape`] -- escapes markup characters inside quoted attribute values
//!   and defuses CSS `expression()`.
//! - [`tags`] -- splits the input into text and tags and rebuilds admitted
//!   tags.
//! - [`attributes`] -- cleans each attribute of an admitted tag.

mod attributes;
mod escape;
mod tags;

pub use attributes::check_attribute;

use crate::config::FilterConfig;

/// Trait for HTML content sanitizers.
///
/// Each sanitizer receives an HTML string and returns a transformed version.
/// Implementations must be `Send + Sync` so one instance can be shared
/// between threads.
pub trait Sanitizer: Send + Sync {
    /// Transform the given HTML content, returning the sanitized result.
    fn sanitize(&self, html: &str) -> String;
}

/// Rounds either loop may take before giving up and failing closed.
///
/// Well-formed markup settles in two or three rounds. Each extra round
/// undoes one layer of entity encoding or tag reassembly.
const MAX_ROUNDS: usize = 10;

/// Decode entities, then strip markup, until both are settled.
pub(crate) fn clean_markup(config: &FilterConfig, source: &str) -> String {
    settle(source, MAX_ROUNDS, "Markup", |current| {
        remove(config, &html_escape::decode_html_entities(current))
    })
}

/// Run the tag scanner until its output no longer changes.
///
/// Each pass can expose a tag that an earlier pass assembled from pieces
/// (`<sc<b>ript>`), so a single pass is not enough.
pub(crate) fn remove(config: &FilterConfig, source: &str) -> String {
    settle(source, MAX_ROUNDS, "Tag scanner", |current| {
        tags::clean_tags(config, current)
    })
}

/// Apply `step` until its output equals its input, at most `max_rounds`
/// times. Past the cap the last output is passed through [`fail_closed`].
fn settle(
    source: &str,
    max_rounds: usize,
    stage: &str,
    mut step: impl FnMut(&str) -> String,
) -> String {
    let mut current = source.to_string();
    for round in 0..max_rounds {
        let next = step(&current);
        if next == current {
            return current;
        }
        tracing::trace!("{stage} round {round} changed the text");
        current = next;
    }
    tracing::warn!("{stage} did not settle after {max_rounds} rounds, stripping all markup");
    fail_closed(&current)
}

/// Last resort when a loop hits its cap. With no `<`, `>` or `&` left,
/// neither entity decoding nor the tag scanner can change the text again.
fn fail_closed(markup: &str) -> String {
    markup.replace(['<', '>', '&'], "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputFilterBuilder;

    fn config(tags: &[&str], attrs: &[&str]) -> FilterConfig {
        InputFilterBuilder::new()
            .allow_tags(tags.iter().copied())
            .allow_attributes(attrs.iter().copied())
            .build()
            .unwrap()
            .config()
            .clone()
    }

    #[test]
    fn remove_reaches_fixed_point_on_reassembled_tags() {
        let config = config(&["b"], &[]);
        let out = remove(&config, "<scr<b>ipt>alert(1)</scr</b>ipt>");
        assert!(!out.contains("<script"));
        assert_eq!(tags::clean_tags(&config, &out), out);
    }

    #[test]
    fn remove_leaves_clean_markup_alone() {
        let config = config(&["p"], &[]);
        assert_eq!(remove(&config, "<p>fine</p>"), "<p>fine</p>");
    }

    #[test]
    fn entity_encoded_tags_are_decoded_then_stripped() {
        let config = config(&["b"], &[]);
        assert_eq!(
            clean_markup(&config, "&lt;script&gt;alert(1)&lt;/script&gt;<b>ok</b>"),
            "alert(1)<b>ok</b>"
        );
        assert_eq!(clean_markup(&config, "&#x3c;i&#x3e;x"), "x");
    }

    #[test]
    fn double_encoded_entities_are_resolved() {
        let config = config(&[], &[]);
        assert_eq!(clean_markup(&config, "&amp;lt;script&amp;gt;x"), "x");
    }

    #[test]
    fn entity_split_by_a_tag_is_resolved() {
        let config = config(&[], &[]);
        assert_eq!(clean_markup(&config, "&l<i>t;i&g</i>t;x"), "x");
    }

    #[test]
    fn clean_markup_is_stable() {
        let config = config(&["a", "p"], &["href", "title"]);
        let inputs = [
            r#"<p title="1 > 0">text</p>"#,
            r#"<a href="/x" title='it"s'>x</a>"#,
            "&amp;amp; &quot;quoted&quot;",
            "<p>unclosed <a href=/x>link",
        ];
        for input in inputs {
            let once = clean_markup(&config, input);
            assert_eq!(clean_markup(&config, &once), once, "input: {input}");
        }
    }

    #[test]
    fn fail_closed_strips_angle_brackets_and_entities() {
        assert_eq!(fail_closed("<b>x</b>"), "bx/b");
        assert_eq!(fail_closed("&lt;i&gt;y"), "lt;igt;y");
    }

    #[test]
    fn settle_stops_at_cap_and_fails_closed() {
        let mut rounds = 0;
        let out = settle("x", 4, "Test", |s| {
            rounds += 1;
            format!("<{s}>&amp;")
        });
        assert_eq!(rounds, 4);
        assert!(!out.contains(['<', '>', '&']), "{out}");
    }

    #[test]
    fn settle_returns_as_soon_as_stable() {
        let mut rounds = 0;
        let out = settle("aaa", 4, "Test", |s| {
            rounds += 1;
            match s.len() {
                0 | 1 => s.to_string(),
                _ => s[1..].to_string(),
            }
        });
        assert_eq!(out, "a");
        assert_eq!(rounds, 3);
    }

    #[test]
    fn remove_fails_closed_when_passes_run_out() {
        let config = config(&["b"], &[]);
        let out = settle("<<b>x", 1, "Tag scanner", |s| tags::clean_tags(&config, s));
        assert_eq!(out, "b /x");
    }

    #[test]
    fn deep_layering_fails_closed_and_stays_stable() {
        let config = config(&["a"], &["title"]);
        let out = clean_markup(&config, &"<a=\"".repeat(1_000));
        assert!(!out.contains(['<', '>', '&']));
        assert_eq!(clean_markup(&config, &out), out);
    }
}
