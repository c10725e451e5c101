//! Per-request context
//!
//! The context carries the request's logger span and cancellation token. It
//! is created at most once per inbound request: re-wrapping a request whose
//! extensions already hold a context returns the existing instance. The
//! context is passed explicitly through every pipeline stage and into the
//! business function; it is never retained beyond its request.

use std::sync::Arc;

use http::{Extensions, Method};
use tokio_util::sync::CancellationToken;
use tracing::Span;

use crate::observability::Logger;

/// Per-request carrier of the logger span and cancellation token
///
/// Cloning shares the same inner state; [`RequestContext::same`] compares
/// instance identity.
#[derive(Debug, Clone)]
pub struct RequestContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    span: Span,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Create a fresh context for one request
    pub fn new(logger: &Logger, method: &Method, path: &str) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                span: logger.request_span(method, path),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Get the request's context, creating and storing it on first use
    ///
    /// Idempotent: a second call on the same extensions returns the
    /// already-stored instance.
    pub fn obtain(
        extensions: &mut Extensions,
        logger: &Logger,
        method: &Method,
        path: &str,
    ) -> Self {
        if let Some(existing) = extensions.get::<RequestContext>() {
            return existing.clone();
        }
        let ctx = Self::new(logger, method, path);
        extensions.insert(ctx.clone());
        ctx
    }

    /// The request's logger span
    pub fn span(&self) -> &Span {
        &self.inner.span
    }

    /// The request's cancellation token
    ///
    /// Business functions that can block arbitrarily should observe it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// Completes when the request is cancelled
    pub async fn cancelled(&self) {
        self.inner.cancel.cancelled().await;
    }

    /// Whether the request has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Whether two contexts are the same instance
    pub fn same(&self, other: &RequestContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> Logger {
        Logger::new("test-service")
    }

    #[test]
    fn test_obtain_is_idempotent() {
        let mut extensions = Extensions::new();
        let first = RequestContext::obtain(&mut extensions, &logger(), &Method::GET, "/users");
        let second = RequestContext::obtain(&mut extensions, &logger(), &Method::GET, "/users");
        let third = RequestContext::obtain(&mut extensions, &logger(), &Method::POST, "/other");

        assert!(first.same(&second));
        assert!(first.same(&third));
    }

    #[test]
    fn test_fresh_contexts_are_distinct() {
        let a = RequestContext::new(&logger(), &Method::GET, "/a");
        let b = RequestContext::new(&logger(), &Method::GET, "/a");
        assert!(!a.same(&b));
    }

    #[test]
    fn test_clone_shares_identity() {
        let ctx = RequestContext::new(&logger(), &Method::GET, "/a");
        let cloned = ctx.clone();
        assert!(ctx.same(&cloned));
    }

    #[tokio::test]
    async fn test_cancellation_observable() {
        let ctx = RequestContext::new(&logger(), &Method::GET, "/a");
        assert!(!ctx.is_cancelled());

        ctx.cancellation().cancel();
        assert!(ctx.is_cancelled());
        // Completes immediately once cancelled
        ctx.cancelled().await;
    }
}
