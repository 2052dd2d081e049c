//! Scalar coercers: raw text in, typed value out. None of them can fail.

use std::sync::LazyLock;

use regex::Regex;

static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?[0-9]+").expect("valid int pattern"));

static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?").expect("valid float pattern")
});

static NOT_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z_\p{Cyrillic}]").expect("valid word pattern"));

static NOT_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("valid alnum pattern"));

static NOT_CMD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("valid cmd pattern"));

static NOT_BASE64_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9/+=]").expect("valid base64 pattern"));

static UNIX_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/*[A-Za-z0-9_.\-]+(/+[A-Za-z0-9_.\-]+)*/*$").expect("valid unix path pattern")
});

static WINDOWS_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]:[\\/]+)?[A-Za-z0-9_.\-]+([\\/]+[A-Za-z0-9_.\-]+)*[\\/]*$")
        .expect("valid windows path pattern")
});

static UNIX_SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/+").expect("valid separator pattern"));

static WINDOWS_SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\\/]+").expect("valid separator pattern"));

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\x00-\x1F\x7F<>"'%&]"#).expect("valid username pattern")
});

/// First signed integer run in `raw`, or `0`. Runs too long for `i64`
/// saturate.
pub fn to_int(raw: &str) -> i64 {
    let Some(m) = INT_RE.find(raw) else {
        return 0;
    };
    let digits = m.as_str();
    digits.parse().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Absolute value of [`to_int`], saturating at `i64::MAX`.
pub fn to_uint(raw: &str) -> i64 {
    to_int(raw).saturating_abs()
}

/// First decimal number in `raw`, or `0.0`.
pub fn to_float(raw: &str) -> f64 {
    FLOAT_RE
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Only an explicit yes is true: `1`, `true`, `yes` or `on`, trimmed and
/// case-insensitive.
pub fn to_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Only letters (Latin and Cyrillic) and `_` are kept.
pub fn to_word(raw: &str) -> String {
    NOT_WORD_RE.replace_all(raw, "").into_owned()
}

/// Only ASCII letters and digits are kept.
pub fn to_alnum(raw: &str) -> String {
    NOT_ALNUM_RE.replace_all(raw, "").into_owned()
}

/// Command token. Leading dots are removed so `..` cannot climb out of a
/// directory.
pub fn to_cmd(raw: &str) -> String {
    NOT_CMD_RE
        .replace_all(raw, "")
        .trim_start_matches('.')
        .to_string()
}

/// Only the base64 alphabet `[A-Za-z0-9/+=]` is kept.
pub fn to_base64(raw: &str) -> String {
    NOT_BASE64_RE.replace_all(raw, "").into_owned()
}

/// Unix path with `/` runs collapsed, else Windows path with separator runs
/// collapsed to `\`, else empty.
///
/// This is a character-class check. `..` segments pass, so the result is
/// not safe against directory traversal on its own.
pub fn to_path(raw: &str) -> String {
    if UNIX_PATH_RE.is_match(raw) {
        return UNIX_SEPARATORS_RE.replace_all(raw, "/").into_owned();
    }
    if WINDOWS_PATH_RE.is_match(raw) {
        return WINDOWS_SEPARATORS_RE.replace_all(raw, "\\").into_owned();
    }
    String::new()
}

/// ASCII whitespace, NUL, ideographic space and no-break space trimmed from
/// both ends.
pub fn to_trim(raw: &str) -> String {
    raw.trim_matches(|c| {
        matches!(
            c,
            ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B' | '\u{3000}' | '\u{00A0}'
        )
    })
    .to_string()
}

/// Control characters and `<>"'%&` removed.
pub fn to_username(raw: &str) -> String {
    USERNAME_RE.replace_all(raw, "").into_owned()
}
