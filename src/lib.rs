//! # input_filter
//!
//! Cleans untrusted request input into values that are safe for a declared
//! purpose: a typed scalar, or markup with dangerous constructs removed.
//!
//! ## Overview
//!
//! An [`InputFilter`] is configured once with the tags and attributes it
//! admits, then [`clean`](InputFilter::clean)s values by type name:
//!
//! - `int`, `uint`, `float`, `bool`, `word`, `alnum`, `cmd`, `base64`,
//!   `path`, `trim` and `username` coerce a scalar (see [`coerce`]);
//! - `string`, `html` and any unknown name strip markup down to the admitted
//!   tags and attributes (see [`markup`]);
//! - `array` and `raw` return the input untouched.
//!
//! Lists and maps are cleaned element by element. Cleaning never fails.
//!
//! ## Quick start
//!
//! ```rust
//! use input_filter::{InputFilterBuilder, Value};
//!
//! let filter = InputFilterBuilder::new()
//!     .allow_tags(["p", "a"])
//!     .allow_attributes(["href"])
//!     .build()
//!     .unwrap();
//!
//! let html = r#"<p>Hi</p><script>steal()</script><a href="javascript:x()">link</a>"#;
//! assert_eq!(filter.clean_html(html), "<p>Hi</p>steal()<a>link</a>");
//!
//! let form = Value::Map(vec![
//!     ("id".into(), Value::from("17; DROP TABLE users")),
//!     ("page".into(), Value::from("-2")),
//! ]);
//! let cleaned = filter.clean(form, "uint");
//! assert_eq!(cleaned.get("id"), Some(&Value::Int(17)));
//! assert_eq!(cleaned.get("page"), Some(&Value::Int(2)));
//! ```
//!
//! ## Shared instance
//!
//! [`init`] registers one configured filter for the whole process and
//! [`global`] hands it out. Without [`init`], [`global`] returns a filter
//! that strips every tag.

pub mod coerce;
pub mod config;
pub mod error;
pub mod filter;
pub mod markup;
pub mod value;

pub use config::{BLOCKED_ATTRIBUTES, BLOCKED_CHARS, BLOCKED_TAGS, InputFilterBuilder, Policy};
pub use error::{FilterError, Result};
pub use filter::InputFilter;
pub use markup::{Sanitizer, check_attribute};
pub use value::{FilterType, Value};

use std::sync::OnceLock;

static GLOBAL: OnceLock<InputFilter> = OnceLock::new();

/// Register the process-wide [`InputFilter`].
///
/// Call once at application startup, before the first [`global()`].
///
/// # Errors
///
/// Returns [`FilterError::AlreadyInitialized`] if a filter was already
/// registered, or if [`global()`] already handed out the default one.
pub fn init(filter: InputFilter) -> Result<()> {
    GLOBAL
        .set(filter)
        .map_err(|_| FilterError::AlreadyInitialized)
}

/// The filter registered with [`init()`], or the strip-all default.
pub fn global() -> &'static InputFilter {
    GLOBAL.get_or_init(InputFilter::default)
}
