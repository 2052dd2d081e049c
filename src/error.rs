//! Error types for the `input_filter` crate.
//!
//! Only configuration can fail. Cleaning input never returns an error.

/// All errors that can occur while configuring an [`InputFilter`](crate::InputFilter).
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// The blocked-character matcher could not be compiled.
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// [`init`](crate::init) was called more than once.
    #[error("Global InputFilter already initialized")]
    AlreadyInitialized,
}

/// A type alias for `Result<T, FilterError>`.
pub type Result<T> = std::result::Result<T, FilterError>;
