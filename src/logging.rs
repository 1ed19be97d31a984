//! Logging setup.
//!
//! The crate only emits `tracing` events; nothing is printed unless a
//! subscriber is installed. Applications that have no subscriber of their own
//! can call [`init`] with the `tracing-subscriber` feature enabled.
//!
//! # Environment Variables
//!
//! - `PRAX_DEBUG=true|1|yes` - enable debug logging
//! - `PRAX_LOG_LEVEL=trace|debug|info|warn|error` - set a specific level
//! - `PRAX_LOG_FORMAT=json|pretty|compact` - output format (default: json)
//!
//! Events never contain passwords; whole DSNs are logged through
//! [`Dsn::redacted`](crate::Dsn::redacted).

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `PRAX_DEBUG`.
pub fn is_debug_enabled() -> bool {
    debug_flag(env::var("PRAX_DEBUG").ok().as_deref())
}

/// Get the configured log level.
///
/// Defaults to "debug" if `PRAX_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    resolve_level(env::var("PRAX_LOG_LEVEL").ok().as_deref(), is_debug_enabled())
}

/// Get the configured log format. Defaults to "json".
pub fn get_log_format() -> &'static str {
    resolve_format(env::var("PRAX_LOG_FORMAT").ok().as_deref())
}

fn debug_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
}

fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

fn resolve_format(requested: Option<&str>) -> &'static str {
    match requested.map(str::to_lowercase).as_deref() {
        Some("pretty") => "pretty",
        Some("compact") => "compact",
        _ => "json",
    }
}

/// Install a global subscriber for the DSN crate's events.
///
/// Does nothing unless `PRAX_DEBUG` or `PRAX_LOG_LEVEL` is set, or when the
/// `tracing-subscriber` feature is disabled. Only the first installation
/// takes effect; later calls to [`init`] or [`init_with_level`] are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("PRAX_LOG_LEVEL").is_err() {
        return;
    }
    install_once(get_log_level());
}

/// Install a global subscriber at a specific level.
///
/// Unknown levels fall back the same way `PRAX_LOG_LEVEL` does. The
/// process environment is left untouched.
///
/// ```rust,no_run
/// use prax_dsn::logging;
///
/// logging::init_with_level("trace");
/// ```
pub fn init_with_level(level: &str) {
    install_once(resolve_level(Some(level), is_debug_enabled()));
}

/// Whether a logging installation has already run.
pub fn is_initialized() -> bool {
    INIT.is_completed()
}

fn install_once(level: &'static str) {
    INIT.call_once(|| install(level));
}

#[cfg(feature = "tracing-subscriber")]
fn install(level: &'static str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_new(format!("prax_dsn={}", level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(filter);
    // Another subscriber may already be installed by the application.
    let installed = match get_log_format() {
        "json" => registry.with(fmt::layer().json()).try_init(),
        "compact" => registry.with(fmt::layer().compact()).try_init(),
        _ => registry.with(fmt::layer().pretty()).try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            level = level,
            format = get_log_format(),
            "prax-dsn logging initialized"
        );
    }
}

#[cfg(not(feature = "tracing-subscriber"))]
fn install(_level: &'static str) {}
