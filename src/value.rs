//! The [`Value`] tree that [`InputFilter::clean`](crate::InputFilter::clean)
//! walks, and the [`FilterType`] names it accepts.

use std::fmt;

/// Untrusted input of any shape, or the cleaned result.
///
/// Lists and maps are cleaned element by element; [`Value::Map`] keeps its
/// keys and their order.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Indexed values, cleaned in order.
    List(Vec<Value>),
    /// Keyed values. Duplicate keys are kept as given.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// The text of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number in a [`Value::Int`]. Floats are not converted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The number in a [`Value::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The flag in a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Text form of a scalar, as handed to the scalar coercers.
    ///
    /// `true` becomes `"1"`, `false` and `Null` become `""`. Lists and maps
    /// have no scalar text and yield `None`.
    pub(crate) fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Null | Value::Bool(false) => Some(String::new()),
            Value::Bool(true) => Some("1".to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// What a value should be cleaned into.
///
/// Parsed from a type name with [`FilterType::from_name`]; unknown names
/// fall back to [`FilterType::String`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// First signed integer in the text, else `0`.
    Int,
    /// Absolute value of [`FilterType::Int`].
    Uint,
    /// First decimal number (with optional exponent), else `0.0`.
    Float,
    /// `1`/`true`/`yes`/`on` are true, everything else is false.
    Bool,
    /// Letters (Latin and Cyrillic) and `_` only.
    Word,
    /// ASCII letters and digits only.
    Alnum,
    /// `[A-Za-z0-9_.-]` with leading dots removed.
    Cmd,
    /// `[A-Za-z0-9/+=]` only.
    Base64,
    /// Markup with every disallowed tag and attribute removed.
    #[default]
    String,
    /// Same pipeline as [`FilterType::String`].
    Html,
    /// Returned unchanged.
    Array,
    /// Unix or Windows path, or empty when neither grammar matches.
    Path,
    /// Whitespace trimmed, including U+3000 and U+00A0.
    Trim,
    /// Control characters and `<>"'%&` removed.
    Username,
    /// Returned unchanged. No filtering at all.
    Raw,
}

impl FilterType {
    /// Parse a type name case-insensitively. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => FilterType::Int,
            "uint" => FilterType::Uint,
            "float" | "double" => FilterType::Float,
            "bool" | "boolean" => FilterType::Bool,
            "word" => FilterType::Word,
            "alnum" => FilterType::Alnum,
            "cmd" => FilterType::Cmd,
            "base64" => FilterType::Base64,
            "html" => FilterType::Html,
            "array" => FilterType::Array,
            "path" => FilterType::Path,
            "trim" => FilterType::Trim,
            "username" => FilterType::Username,
            "raw" => FilterType::Raw,
            _ => FilterType::String,
        }
    }

    /// Canonical lower-case name, accepted back by [`FilterType::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            FilterType::Int => "int",
            FilterType::Uint => "uint",
            FilterType::Float => "float",
            FilterType::Bool => "bool",
            FilterType::Word => "word",
            FilterType::Alnum => "alnum",
            FilterType::Cmd => "cmd",
            FilterType::Base64 => "base64",
            FilterType::String => "string",
            FilterType::Html => "html",
            FilterType::Array => "array",
            FilterType::Path => "path",
            FilterType::Trim => "trim",
            FilterType::Username => "username",
            FilterType::Raw => "raw",
        }
    }

    /// `Array` and `Raw` hand the input back untouched.
    pub(crate) fn is_passthrough(self) -> bool {
        matches!(self, FilterType::Array | FilterType::Raw)
    }

    /// Types cleaned by the markup pipeline rather than a scalar coercer.
    pub(crate) fn is_markup(self) -> bool {
        matches!(self, FilterType::String | FilterType::Html)
    }
}

impl From<&str> for FilterType {
    fn from(name: &str) -> Self {
        FilterType::from_name(name)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_are_case_insensitive() {
        assert_eq!(FilterType::from_name("INT"), FilterType::Int);
        assert_eq!(FilterType::from_name("Integer"), FilterType::Int);
        assert_eq!(FilterType::from_name("Double"), FilterType::Float);
        assert_eq!(FilterType::from_name("BOOLEAN"), FilterType::Bool);
        assert_eq!(FilterType::from_name("Raw"), FilterType::Raw);
    }

    #[test]
    fn unknown_type_falls_back_to_string() {
        assert_eq!(FilterType::from_name("email"), FilterType::String);
        assert_eq!(FilterType::from_name(""), FilterType::String);
        assert_eq!(FilterType::from("nonsense"), FilterType::String);
    }

    #[test]
    fn every_name_round_trips() {
        for ty in [
            FilterType::Int,
            FilterType::Uint,
            FilterType::Float,
            FilterType::Bool,
            FilterType::Word,
            FilterType::Alnum,
            FilterType::Cmd,
            FilterType::Base64,
            FilterType::String,
            FilterType::Html,
            FilterType::Array,
            FilterType::Path,
            FilterType::Trim,
            FilterType::Username,
            FilterType::Raw,
        ] {
            assert_eq!(FilterType::from_name(ty.name()), ty);
        }
    }

    #[test]
    fn scalar_text_of_each_variant() {
        assert_eq!(Value::Null.scalar_text().as_deref(), Some(""));
        assert_eq!(Value::Bool(true).scalar_text().as_deref(), Some("1"));
        assert_eq!(Value::Bool(false).scalar_text().as_deref(), Some(""));
        assert_eq!(Value::Int(-7).scalar_text().as_deref(), Some("-7"));
        assert_eq!(Value::Float(2.5).scalar_text().as_deref(), Some("2.5"));
        assert_eq!(Value::List(vec![]).scalar_text(), None);
    }

    #[test]
    fn map_lookup() {
        let map = Value::Map(vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::from("two")),
        ]);
        assert_eq!(map.get("b").and_then(Value::as_str), Some("two"));
        assert!(map.get("c").is_none());
        assert!(Value::Int(1).get("a").is_none());
    }
}
