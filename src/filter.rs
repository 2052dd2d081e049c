//! [`InputFilter`]: the entry point that routes a value to a coercer or to
//! the markup pipeline.

use crate::coerce;
use crate::config::{FilterConfig, InputFilterBuilder};
use crate::error::Result;
use crate::markup::{self, Sanitizer};
use crate::value::{FilterType, Value};

/// Cleans untrusted input into a value that is safe for its declared type.
///
/// The configuration is fixed at construction, so one instance can be shared
/// freely between threads. Cleaning never fails: anything that cannot be
/// made safe is dropped.
///
/// # Example
///
/// ```
/// use input_filter::{InputFilter, Value};
///
/// let filter = InputFilter::new(["p", "b"], ["href"]).unwrap();
///
/// assert_eq!(filter.clean("-42xyz", "int"), Value::Int(-42));
/// assert_eq!(
///     filter.clean("<p>ok</p><script>alert(1)</script>", "html"),
///     Value::from("<p>ok</p>alert(1)"),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct InputFilter {
    config: FilterConfig,
}

impl InputFilter {
    /// Filter with the given allow-lists and every other setting at its
    /// default. See [`InputFilterBuilder`] for the rest.
    pub fn new<T, A>(tags: T, attributes: A) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        InputFilterBuilder::new()
            .allow_tags(tags)
            .allow_attributes(attributes)
            .build()
    }

    /// Start an [`InputFilterBuilder`] for policies, XSS auto-protection and
    /// blocked chars.
    pub fn builder() -> InputFilterBuilder {
        InputFilterBuilder::new()
    }

    pub(crate) fn from_config(config: FilterConfig) -> Self {
        Self { config }
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Clean `source` as `filter_type`, keeping its shape.
    ///
    /// - `array` and `raw` return the input unchanged;
    /// - lists and maps are cleaned element by element with the same type,
    ///   keys and order kept;
    /// - scalars go to the coercer for the type;
    /// - for `string`/`html` (and unknown names) a non-empty string goes
    ///   through the markup pipeline and anything else is returned as is.
    pub fn clean(&self, source: impl Into<Value>, filter_type: impl Into<FilterType>) -> Value {
        self.clean_value(source.into(), filter_type.into())
    }

    fn clean_value(&self, source: Value, filter_type: FilterType) -> Value {
        if filter_type.is_passthrough() {
            return source;
        }

        match source {
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.clean_value(item, filter_type))
                    .collect(),
            ),
            Value::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, self.clean_value(item, filter_type)))
                    .collect(),
            ),
            scalar if filter_type.is_markup() => match scalar {
                Value::String(s) if !s.is_empty() => Value::String(self.clean_html(&s)),
                other => other,
            },
            scalar => self.coerce(&scalar, filter_type),
        }
    }

    fn coerce(&self, scalar: &Value, filter_type: FilterType) -> Value {
        if filter_type == FilterType::Bool {
            return Value::Bool(match scalar {
                Value::Bool(b) => *b,
                Value::Int(n) => *n != 0,
                Value::Float(f) => *f != 0.0,
                Value::String(s) => coerce::to_bool(s),
                _ => false,
            });
        }

        let raw = scalar.scalar_text().unwrap_or_default();
        match filter_type {
            FilterType::Int => Value::Int(coerce::to_int(&raw)),
            FilterType::Uint => Value::Int(coerce::to_uint(&raw)),
            FilterType::Float => Value::Float(coerce::to_float(&raw)),
            FilterType::Word => Value::String(coerce::to_word(&raw)),
            FilterType::Alnum => Value::String(coerce::to_alnum(&raw)),
            FilterType::Cmd => Value::String(coerce::to_cmd(&raw)),
            FilterType::Base64 => Value::String(coerce::to_base64(&raw)),
            FilterType::Path => Value::String(coerce::to_path(&raw)),
            FilterType::Trim => Value::String(coerce::to_trim(&raw)),
            FilterType::Username => Value::String(coerce::to_username(&raw)),
            FilterType::Bool
            | FilterType::String
            | FilterType::Html
            | FilterType::Array
            | FilterType::Raw => scalar.clone(),
        }
    }

    /// Run the markup pipeline on one string.
    ///
    /// Only markup is filtered. Text between tags is kept as text, so
    /// `javascript:alert(1)` outside any tag survives (it cannot run there).
    /// Callers placing the result somewhere other than HTML body content,
    /// such as a URL or a script block, must escape it for that context.
    pub fn clean_html(&self, html: &str) -> String {
        markup::clean_markup(&self.config, html)
    }
}

impl Default for InputFilter {
    /// Strips every tag.
    fn default() -> Self {
        Self::from_config(FilterConfig::default())
    }
}

impl Sanitizer for InputFilter {
    fn sanitize(&self, html: &str) -> String {
        self.clean_html(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> InputFilter {
        InputFilter::new(["p", "b", "a"], ["href", "title"]).unwrap()
    }

    #[test]
    fn raw_and_array_pass_through() {
        let filter = filter();
        let payload = "<script>alert(1)</script>";
        assert_eq!(filter.clean(payload, "raw"), Value::from(payload));
        assert_eq!(filter.clean(payload, "ARRAY"), Value::from(payload));

        let list = Value::from(vec!["<b>1</b>", "x"]);
        assert_eq!(filter.clean(list.clone(), "array"), list);
    }

    #[test]
    fn unknown_type_uses_markup_pipeline() {
        let filter = filter();
        assert_eq!(
            filter.clean("<i>x</i><b>y</b>", "email"),
            Value::from("x<b>y</b>")
        );
    }

    #[test]
    fn empty_and_non_string_scalars_skip_markup() {
        let filter = filter();
        assert_eq!(filter.clean("", "html"), Value::from(""));
        assert_eq!(filter.clean(5, "html"), Value::Int(5));
        assert_eq!(filter.clean(Value::Null, "string"), Value::Null);
        assert_eq!(filter.clean(true, "string"), Value::Bool(true));
    }

    #[test]
    fn coercers_are_dispatched() {
        let filter = filter();
        assert_eq!(filter.clean("abc", "int"), Value::Int(0));
        assert_eq!(filter.clean("-5", "uint"), Value::Int(5));
        assert_eq!(filter.clean("3.14e2abc", "double"), Value::Float(314.0));
        assert_eq!(filter.clean("yes", "bool"), Value::Bool(true));
        assert_eq!(filter.clean("a b-c", "word"), Value::from("abc"));
        assert_eq!(filter.clean("a b-c1", "alnum"), Value::from("abc1"));
        assert_eq!(filter.clean("../x", "cmd"), Value::from("x"));
        assert_eq!(filter.clean("a b", "base64"), Value::from("ab"));
        assert_eq!(filter.clean("a//b", "path"), Value::from("a/b"));
        assert_eq!(filter.clean(" x ", "trim"), Value::from("x"));
        assert_eq!(filter.clean("<bob>", "username"), Value::from("bob"));
    }

    #[test]
    fn non_string_scalars_are_coerced_from_their_text() {
        let filter = filter();
        assert_eq!(filter.clean(3.9, "int"), Value::Int(3));
        assert_eq!(filter.clean(-8, "uint"), Value::Int(8));
        assert_eq!(filter.clean(true, "int"), Value::Int(1));
        assert_eq!(filter.clean(Value::Null, "float"), Value::Float(0.0));
        assert_eq!(filter.clean(7, "word"), Value::from(""));
        assert_eq!(filter.clean(0, "bool"), Value::Bool(false));
        assert_eq!(filter.clean(2, "bool"), Value::Bool(true));
        assert_eq!(filter.clean(Value::Null, "bool"), Value::Bool(false));
    }

    #[test]
    fn lists_and_maps_keep_shape() {
        let filter = filter();
        let input = Value::Map(vec![
            ("b".to_string(), Value::from("12 apples")),
            ("a".to_string(), Value::from(vec!["1", "x2", "-3"])),
        ]);
        let expected = Value::Map(vec![
            ("b".to_string(), Value::Int(12)),
            (
                "a".to_string(),
                Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(-3)]),
            ),
        ]);
        assert_eq!(filter.clean(input, "int"), expected);
    }

    #[test]
    fn default_filter_strips_every_tag() {
        let filter = InputFilter::default();
        assert_eq!(
            filter.clean_html("<p>Hello <b>world</b></p>"),
            "Hello world"
        );
    }

    #[test]
    fn text_between_tags_is_not_filtered() {
        let filter = filter();
        assert_eq!(
            filter.clean_html("<p>see javascript:alert(1)</p><b onclick=\"x()\">b</b>"),
            "<p>see javascript:alert(1)</p><b>b</b>"
        );
    }

    #[test]
    fn usable_as_dyn_sanitizer() {
        let sanitizer: Box<dyn Sanitizer> = Box::new(filter());
        assert_eq!(
            sanitizer.sanitize(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }
}
