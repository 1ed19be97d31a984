//! Error types for DSN parsing.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::escape::EscapeError;

/// Result type for DSN operations.
pub type DsnResult<T> = Result<T, DsnError>;

/// Errors that can occur while reading or parsing a DSN.
///
/// Every variant is fatal: parsing stops at the first problem and no partial
/// record is returned.
#[derive(Error, Debug, Diagnostic)]
pub enum DsnError {
    /// A non-empty DSN has no `/` before the database name.
    #[error("invalid DSN: missing the slash separating the database name")]
    #[diagnostic(
        code(prax::dsn::no_slash),
        help("a DSN looks like `user:pass@tcp(host:port)/dbname`; add `/` before the database name")
    )]
    NoSlash {
        /// The DSN that failed to parse.
        #[source_code]
        src: String,
        /// Location of the problem in `src`.
        #[label("no `/` in here")]
        span: SourceSpan,
    },

    /// The network address was opened with `(` but the character before
    /// the database separator is not `)`.
    #[error("invalid DSN: network address not terminated (missing closing brace)")]
    #[diagnostic(code(prax::dsn::unterminated_address))]
    UnterminatedAddress {
        /// The DSN that failed to parse.
        #[source_code]
        src: String,
        /// Location of the problem in `src`.
        #[label("address opened here is never closed")]
        span: SourceSpan,
    },

    /// Same shape as [`DsnError::UnterminatedAddress`], but a `)` was found
    /// inside the address span, which usually means a parameter value
    /// containing `/` or `)` was not escaped.
    #[error("invalid DSN: did you forget to escape a param value?")]
    #[diagnostic(
        code(prax::dsn::unescaped_value),
        help("percent-encode `/` as %2F and `)` as %29 inside parameter values")
    )]
    UnescapedValue {
        /// The DSN that failed to parse.
        #[source_code]
        src: String,
        /// Location of the problem in `src`.
        #[label("stray `)` before the database separator")]
        span: SourceSpan,
    },

    /// A parameter value is not a valid query-escaped string.
    #[error("invalid DSN: cannot decode value of parameter `{key}`")]
    #[diagnostic(code(prax::dsn::query_decode))]
    QueryDecode {
        /// Key of the offending parameter.
        key: String,
        /// Why the value could not be decoded.
        #[source]
        source: EscapeError,
        /// The DSN that failed to parse.
        #[source_code]
        src: String,
        /// Location of the problem in `src`.
        #[label("cannot be decoded")]
        span: SourceSpan,
    },

    /// The environment variable holding a DSN is not set.
    #[error("environment variable not found: {0}")]
    #[diagnostic(code(prax::dsn::env_not_found))]
    EnvNotFound(String),

    /// An environment reference inside a DSN could not be expanded.
    #[error("invalid environment variable '{name}': {message}")]
    #[diagnostic(code(prax::dsn::invalid_env_value))]
    InvalidEnvValue {
        /// Variable name.
        name: String,
        /// What went wrong.
        message: String,
    },
}

impl DsnError {
    /// Create a missing-slash error covering the whole input.
    pub fn no_slash(src: impl Into<String>) -> Self {
        let src = src.into();
        let span = (0, src.len()).into();
        Self::NoSlash { src, span }
    }

    /// Create an unterminated-address error spanning from the opening `(`
    /// up to the database separator.
    pub fn unterminated_address(src: impl Into<String>, open: usize, slash: usize) -> Self {
        Self::UnterminatedAddress {
            src: src.into(),
            span: (open, slash - open).into(),
        }
    }

    /// Create an unescaped-value error pointing at the stray `)`.
    pub fn unescaped_value(src: impl Into<String>, close: usize) -> Self {
        Self::UnescapedValue {
            src: src.into(),
            span: (close, 1).into(),
        }
    }

    /// Create a query-decode error for the value at `offset..offset + len`.
    pub fn query_decode(
        src: impl Into<String>,
        key: impl Into<String>,
        source: EscapeError,
        offset: usize,
        len: usize,
    ) -> Self {
        Self::QueryDecode {
            key: key.into(),
            source,
            src: src.into(),
            span: (offset, len).into(),
        }
    }

    /// Create an invalid environment value error.
    pub fn invalid_env(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvValue {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from the DSN grammar itself rather than
    /// from loading it.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::NoSlash { .. }
                | Self::UnterminatedAddress { .. }
                | Self::UnescapedValue { .. }
                | Self::QueryDecode { .. }
        )
    }

    /// Byte range of the offending input, for syntax errors.
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::NoSlash { span, .. }
            | Self::UnterminatedAddress { span, .. }
            | Self::UnescapedValue { span, .. }
            | Self::QueryDecode { span, .. } => Some(*span),
            Self::EnvNotFound(_) | Self::InvalidEnvValue { .. } => None,
        }
    }
}
