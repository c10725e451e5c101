//! Tracing initialization and the request logger sink

use tracing::Span;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Initialize tracing with JSON formatting and env-filter
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = config.service.log_level.clone();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

/// Structured-logging sink handed to the router at startup
///
/// The router refuses to build without one; each request gets its own span
/// created from this logger and carried in the request context.
#[derive(Debug, Clone)]
pub struct Logger {
    service: std::sync::Arc<str>,
}

impl Logger {
    /// Create a logger for a named service
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into().into(),
        }
    }

    /// Logger named after the configured service
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.service.name.clone())
    }

    /// The service name this logger reports under
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Span covering one request
    pub(crate) fn request_span(&self, method: &http::Method, path: &str) -> Span {
        tracing::info_span!(
            "request",
            service = %self.service,
            method = %method,
            path = %path,
        )
    }
}
