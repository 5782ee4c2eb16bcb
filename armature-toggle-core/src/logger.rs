//! Optional logging capability for strategies
//!
//! Strategies receive an `Option<SharedLogger>` at construction. Logging is
//! fire-and-forget: no strategy reads anything back from a logger, so a
//! missing logger never changes an evaluation result.

use std::fmt::Write as _;
use std::sync::Arc;

/// Structured key/value fields attached to a log message
pub type LogFields<'a> = &'a [(&'a str, String)];

/// Shared handle to a logger
pub type SharedLogger = Arc<dyn Logger>;

/// Logging sink used by strategies.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, fields: LogFields<'_>);

    fn warning(&self, message: &str, fields: LogFields<'_>);

    fn error(&self, message: &str, fields: LogFields<'_>);
}

/// Logger that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }

    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str, fields: LogFields<'_>) {
        tracing::debug!(target: "armature_toggle", fields = %render_fields(fields), "{}", message);
    }

    fn warning(&self, message: &str, fields: LogFields<'_>) {
        tracing::warn!(target: "armature_toggle", fields = %render_fields(fields), "{}", message);
    }

    fn error(&self, message: &str, fields: LogFields<'_>) {
        tracing::error!(target: "armature_toggle", fields = %render_fields(fields), "{}", message);
    }
}

/// Render fields as `key=value` pairs separated by spaces
pub fn render_fields(fields: LogFields<'_>) -> String {
    let mut out = String::new();
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}={}", key, value);
    }
    out
}

/// Thin wrapper that makes the logger optional at call sites.
#[derive(Clone, Default)]
pub(crate) struct OptionalLogger(Option<SharedLogger>);

impl OptionalLogger {
    pub(crate) fn new(logger: Option<SharedLogger>) -> Self {
        Self(logger)
    }

    pub(crate) fn debug(&self, message: &str, fields: LogFields<'_>) {
        if let Some(logger) = &self.0 {
            logger.debug(message, fields);
        }
    }

    pub(crate) fn warning(&self, message: &str, fields: LogFields<'_>) {
        if let Some(logger) = &self.0 {
            logger.warning(message, fields);
        }
    }

    pub(crate) fn error(&self, message: &str, fields: LogFields<'_>) {
        if let Some(logger) = &self.0 {
            logger.error(message, fields);
        }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> Option<SharedLogger> {
        self.0.clone()
    }
}

impl std::fmt::Debug for OptionalLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OptionalLogger")
            .field(&self.0.is_some())
            .finish()
    }
}
