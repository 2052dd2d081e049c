//! Builder for configuring an [`InputFilter`].

use std::collections::HashSet;

use regex::Regex;

use crate::error::{FilterError, Result};
use crate::filter::InputFilter;

/// Elements that can run script or rewrite the document. Always dropped
/// when XSS auto-protection is on, whatever the configured lists say.
pub const BLOCKED_TAGS: &[&str] = &[
    "applet", "base", "bgsound", "body", "canvas", "embed", "frame", "frameset", "head", "html",
    "id", "iframe", "ilayer", "layer", "link", "meta", "name", "object", "script", "style",
    "title", "xml",
];

/// Attributes that load or submit to a URL outside the usual `href`/`src`
/// pair. Always dropped when XSS auto-protection is on.
pub const BLOCKED_ATTRIBUTES: &[&str] = &[
    "action",
    "background",
    "codebase",
    "dynsrc",
    "formaction",
    "lowsrc",
];

/// Entity spellings stripped from attribute names and values before they
/// are inspected.
pub const BLOCKED_CHARS: &[&str] = &["&tab;", "&space;", "&colon;", "&column;"];

/// Whether a configured name list admits or excludes its members.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Policy {
    /// Only names in the list are kept.
    #[default]
    AllowOnlyListed,
    /// Every name except those in the list is kept.
    BlockListed,
}

impl Policy {
    /// Decide whether a name passes, given whether it was found in the list.
    pub fn admits(self, listed: bool) -> bool {
        match self {
            Policy::AllowOnlyListed => listed,
            Policy::BlockListed => !listed,
        }
    }
}

/// Immutable settings shared by every stage of the markup pipeline.
#[derive(Clone, Debug)]
pub(crate) struct FilterConfig {
    pub(crate) tags: HashSet<String>,
    pub(crate) attributes: HashSet<String>,
    pub(crate) tags_policy: Policy,
    pub(crate) attrs_policy: Policy,
    pub(crate) xss_auto: bool,
    pub(crate) blocked_chars: Option<Regex>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tags: HashSet::new(),
            attributes: HashSet::new(),
            tags_policy: Policy::default(),
            attrs_policy: Policy::default(),
            xss_auto: true,
            blocked_chars: blocked_chars_matcher(BLOCKED_CHARS)
                .expect("built-in blocked chars compile"),
        }
    }
}

impl FilterConfig {
    pub(crate) fn admits_tag(&self, name: &str) -> bool {
        self.tags_policy.admits(self.tags.contains(name))
    }

    pub(crate) fn admits_attribute(&self, name: &str) -> bool {
        self.attrs_policy.admits(self.attributes.contains(name))
    }

    pub(crate) fn is_blocked_tag(&self, name: &str) -> bool {
        self.xss_auto && BLOCKED_TAGS.contains(&name)
    }

    /// Event handlers (`on*`) are caught by prefix.
    pub(crate) fn is_blocked_attribute(&self, name: &str) -> bool {
        self.xss_auto && (BLOCKED_ATTRIBUTES.contains(&name) || name.starts_with("on"))
    }

    /// Remove every blocked-char spelling, case-insensitively.
    pub(crate) fn strip_blocked_chars(&self, input: &str) -> String {
        match &self.blocked_chars {
            Some(re) => re.replace_all(input, "").into_owned(),
            None => input.to_string(),
        }
    }
}

/// Builder for an [`InputFilter`].
///
/// Defaults: no allowed tags, no allowed attributes, both policies
/// [`Policy::AllowOnlyListed`], XSS auto-protection on and the
/// [`BLOCKED_CHARS`] list. With those defaults every tag is stripped.
///
/// # Example
///
/// ```
/// use input_filter::{InputFilterBuilder, Policy};
///
/// let filter = InputFilterBuilder::new()
///     .allow_tags(["p", "a", "b"])
///     .allow_attributes(["href", "title"])
///     .build()
///     .unwrap();
/// assert_eq!(
///     filter.clean_html(r#"<p onclick="x()">Hi <a href="/home">home</a></p>"#),
///     r#"<p>Hi <a href="/home">home</a></p>"#,
/// );
///
/// let permissive = InputFilterBuilder::new()
///     .allow_tags(["marquee"])
///     .tags_policy(Policy::BlockListed)
///     .build()
///     .unwrap();
/// assert_eq!(permissive.clean_html("<marquee>hi</marquee><i>x</i>"), "hi<i>x</i>");
/// ```
#[derive(Clone, Debug)]
pub struct InputFilterBuilder {
    tags: Vec<String>,
    attributes: Vec<String>,
    tags_policy: Policy,
    attrs_policy: Policy,
    xss_auto: bool,
    blocked_chars: Vec<String>,
}

impl InputFilterBuilder {
    /// Create a builder with the defaults described above.
    pub fn new() -> Self {
        Self {
            tags: Vec::new(),
            attributes: Vec::new(),
            tags_policy: Policy::default(),
            attrs_policy: Policy::default(),
            xss_auto: true,
            blocked_chars: BLOCKED_CHARS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Tag names the tag policy applies to.
    pub fn allow_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Attribute names the attribute policy applies to.
    pub fn allow_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Whether the tag list is an allow-list or a block-list.
    pub fn tags_policy(mut self, policy: Policy) -> Self {
        self.tags_policy = policy;
        self
    }

    /// Whether the attribute list is an allow-list or a block-list.
    pub fn attrs_policy(mut self, policy: Policy) -> Self {
        self.attrs_policy = policy;
        self
    }

    /// Toggle the built-in [`BLOCKED_TAGS`] / [`BLOCKED_ATTRIBUTES`] lists
    /// and the `on*` event-handler rule.
    pub fn xss_auto(mut self, enabled: bool) -> Self {
        self.xss_auto = enabled;
        self
    }

    /// Replace the blocked-char list. An empty list disables the stripping.
    pub fn blocked_chars<I, S>(mut self, chars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_chars = chars.into_iter().map(Into::into).collect();
        self
    }

    /// Validate the configuration and produce an immutable [`InputFilter`].
    ///
    /// Returns [`FilterError::Config`] for a tag name outside
    /// `[A-Za-z][A-Za-z0-9]*` or an attribute name that could not appear in
    /// markup.
    pub fn build(self) -> Result<InputFilter> {
        let tags = self
            .tags
            .iter()
            .map(|tag| {
                if is_tag_name(tag) {
                    Ok(tag.to_ascii_lowercase())
                } else {
                    Err(FilterError::Config(format!("invalid tag name `{tag}`")))
                }
            })
            .collect::<Result<HashSet<_>>>()?;

        let attributes = self
            .attributes
            .iter()
            .map(|attr| {
                if is_attribute_name(attr) {
                    Ok(attr.to_lowercase())
                } else {
                    Err(FilterError::Config(format!("invalid attribute name `{attr}`")))
                }
            })
            .collect::<Result<HashSet<_>>>()?;

        Ok(InputFilter::from_config(FilterConfig {
            tags,
            attributes,
            tags_policy: self.tags_policy,
            attrs_policy: self.attrs_policy,
            xss_auto: self.xss_auto,
            blocked_chars: blocked_chars_matcher(self.blocked_chars.as_slice())?,
        }))
    }
}

impl Default for InputFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One case-insensitive alternation over the literal blocked chars, or
/// `None` when there is nothing to strip.
fn blocked_chars_matcher<S: AsRef<str>>(chars: &[S]) -> Result<Option<Regex>> {
    let alternatives = chars
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| !c.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>();
    if alternatives.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(&format!("(?i){}", alternatives.join("|")))?))
}

/// `[A-Za-z][A-Za-z0-9]*`
pub(crate) fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '=' | '"' | '\'' | '<' | '>' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_admission_table() {
        assert!(Policy::AllowOnlyListed.admits(true));
        assert!(!Policy::AllowOnlyListed.admits(false));
        assert!(!Policy::BlockListed.admits(true));
        assert!(Policy::BlockListed.admits(false));
    }

    #[test]
    fn names_are_lowercased_at_build_time() {
        let filter = InputFilterBuilder::new()
            .allow_tags(["P", "Strong"])
            .allow_attributes(["HREF"])
            .build()
            .unwrap();
        let config = filter.config();
        assert!(config.tags.contains("p"));
        assert!(config.tags.contains("strong"));
        assert!(config.attributes.contains("href"));
        assert!(!config.tags.contains("P"));
    }

    #[test]
    fn invalid_tag_name_is_rejected() {
        let err = InputFilterBuilder::new()
            .allow_tags(["p", "1h"])
            .build()
            .unwrap_err();
        assert!(matches!(err, FilterError::Config(ref msg) if msg.contains("1h")));
    }

    #[test]
    fn invalid_attribute_name_is_rejected() {
        for bad in ["", "on click", "a=b", "x\"y", "a/b"] {
            let result = InputFilterBuilder::new().allow_attributes([bad]).build();
            assert!(result.is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn hyphenated_attribute_names_are_accepted() {
        let filter = InputFilterBuilder::new()
            .allow_attributes(["data-id", "aria-label"])
            .build();
        assert!(filter.is_ok());
    }

    #[test]
    fn blocked_chars_are_stripped_case_insensitively() {
        let filter = InputFilterBuilder::new().build().unwrap();
        let config = filter.config();
        assert_eq!(
            config.strip_blocked_chars("java&TAB;script&Colon;x&column;"),
            "javascriptx"
        );
    }

    #[test]
    fn empty_blocked_chars_disables_stripping() {
        let filter = InputFilterBuilder::new()
            .blocked_chars(Vec::<String>::new())
            .build()
            .unwrap();
        assert!(filter.config().blocked_chars.is_none());
        assert_eq!(filter.config().strip_blocked_chars("a&tab;b"), "a&tab;b");
    }

    #[test]
    fn blocked_lists_only_apply_with_xss_auto() {
        let on = InputFilterBuilder::new().build().unwrap();
        assert!(on.config().is_blocked_tag("script"));
        assert!(on.config().is_blocked_attribute("onload"));
        assert!(on.config().is_blocked_attribute("formaction"));

        let off = InputFilterBuilder::new().xss_auto(false).build().unwrap();
        assert!(!off.config().is_blocked_tag("script"));
        assert!(!off.config().is_blocked_attribute("onload"));
    }

    #[test]
    fn tag_name_grammar() {
        assert!(is_tag_name("h1"));
        assert!(is_tag_name("B"));
        assert!(!is_tag_name(""));
        assert!(!is_tag_name("1h"));
        assert!(!is_tag_name("my-tag"));
        assert!(!is_tag_name("!--"));
    }
}
