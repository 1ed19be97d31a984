//! Loading DSNs from the environment.
//!
//! A DSN kept in an environment variable may reference other variables, so
//! that secrets can live apart from the rest of the connection string:
//!
//! ```text
//! DATABASE_DSN='app:${DB_PASSWORD}@tcp(${DB_HOST:-localhost}:3306)/app'
//! ```
//!
//! Supported references:
//! - `$VAR` and `${VAR}` - required variable
//! - `${VAR:-default}` - fallback when unset or empty
//! - `${VAR:?message}` - required, failing with `message`
//!
//! A `$` not followed by a name or `{` is kept literally, and `$$` produces a
//! single `$`.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::dsn::Dsn;
use crate::error::{DsnError, DsnResult};

/// Default variable read by [`Dsn::from_default_env`].
pub const DEFAULT_DSN_VAR: &str = "DATABASE_DSN";

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;
}

/// Environment source using the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a map, mostly useful in tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Expands variable references inside a DSN string.
#[derive(Debug, Clone, Default)]
pub struct EnvExpander<S: EnvSource = StdEnvSource> {
    source: S,
}

impl EnvExpander<StdEnvSource> {
    /// Create an expander over the process environment.
    pub fn new() -> Self {
        Self {
            source: StdEnvSource,
        }
    }
}

impl<S: EnvSource> EnvExpander<S> {
    /// Create an expander over a custom source.
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// Get a variable straight from the source, without expansion.
    pub fn lookup(&self, name: &str) -> DsnResult<String> {
        self.source
            .get(name)
            .ok_or_else(|| DsnError::EnvNotFound(name.to_string()))
    }

    /// Expand every variable reference in `input`.
    ///
    /// ```rust
    /// use prax_dsn::env::{EnvExpander, MapEnvSource};
    ///
    /// let expander = EnvExpander::with_source(MapEnvSource::new().set("DB_PASS", "s3cret"));
    /// assert_eq!(
    ///     expander.expand("root:${DB_PASS}@tcp(${DB_HOST:-localhost})/app").unwrap(),
    ///     "root:s3cret@tcp(localhost)/app"
    /// );
    /// ```
    pub fn expand(&self, input: &str) -> DsnResult<String> {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(dollar) = rest.find('$') {
            out.push_str(&rest[..dollar]);
            let after = &rest[dollar + 1..];

            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
            } else if let Some(body) = after.strip_prefix('{') {
                let close = body.find('}').ok_or_else(|| {
                    DsnError::invalid_env(body, "unterminated `${` reference")
                })?;
                out.push_str(&self.expand_braced(&body[..close])?);
                rest = &body[close + 1..];
            } else {
                let name_len = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                if name_len == 0 || after.starts_with(|c: char| c.is_ascii_digit()) {
                    out.push('$');
                    rest = after;
                } else {
                    out.push_str(&self.lookup(&after[..name_len])?);
                    rest = &after[name_len..];
                }
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Expand the inside of a `${...}` reference.
    fn expand_braced(&self, reference: &str) -> DsnResult<String> {
        let (name, modifier) = match reference.find(':') {
            Some(colon) => (&reference[..colon], Some(&reference[colon + 1..])),
            None => (reference, None),
        };

        if name.is_empty() {
            return Err(DsnError::invalid_env("", "empty variable name"));
        }

        let value = self.source.get(name).filter(|v| !v.is_empty());
        trace!(variable = name, found = value.is_some(), "expanding variable");

        match (value, modifier) {
            (Some(value), _) => Ok(value),
            (None, Some(m)) if m.starts_with('-') => Ok(m[1..].to_string()),
            (None, Some(m)) if m.starts_with('?') => {
                let message = match &m[1..] {
                    "" => format!("required variable '{}' is not set", name),
                    custom => custom.to_string(),
                };
                Err(DsnError::invalid_env(name, message))
            }
            (None, Some(m)) => Err(DsnError::invalid_env(
                name,
                format!("unsupported modifier ':{}'", m),
            )),
            (None, None) => Err(DsnError::EnvNotFound(name.to_string())),
        }
    }
}

impl Dsn {
    /// Read a DSN from an environment variable, expanding any references it
    /// contains, and parse it.
    pub fn from_env(var: &str) -> DsnResult<Self> {
        Self::from_env_with(&EnvExpander::new(), var)
    }

    /// Read a DSN from the `DATABASE_DSN` environment variable.
    pub fn from_default_env() -> DsnResult<Self> {
        Self::from_env(DEFAULT_DSN_VAR)
    }

    /// Read a DSN through a specific expander.
    pub fn from_env_with<S: EnvSource>(expander: &EnvExpander<S>, var: &str) -> DsnResult<Self> {
        debug!(variable = var, "Loading DSN from environment");
        let raw = expander.lookup(var)?;
        let expanded = expander.expand(&raw)?;
        let dsn = Dsn::parse(&expanded)?;
        debug!(variable = var, dsn = %dsn.redacted(), "DSN loaded from environment");
        Ok(dsn)
    }
}
