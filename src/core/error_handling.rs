//! Generic error handling utilities
//!
//! Unified reporting for errors that surface at the binary's top level, plus
//! the containment used at handler dispatch boundaries.

use std::any::Any;

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a helpful, actionable message; otherwise `None`.
pub trait ContextualError: std::error::Error {
    /// True if this error carries a message the user can act on directly,
    /// such as a malformed or out-of-range configuration value
    fn is_user_actionable(&self) -> bool;

    fn user_message(&self) -> Option<&str>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// User-actionable errors show their own message; system errors show the
/// operation context, with the full error available at debug level.
///
/// # Examples
/// ```rust,no_run
/// use seda::core::config::SedaConfig;
/// use seda::core::error_handling::log_error_with_context;
/// use std::path::Path;
///
/// if let Err(e) = SedaConfig::load(Path::new("missing.toml")) {
///     log_error_with_context(&e, "Configuration loading");
/// }
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Best-effort text of a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
