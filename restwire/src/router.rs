//! Route registration and the frozen route table
//!
//! Routes are collected as `(method, path, handler)` triples and frozen at
//! [`Router::build`], which wires every handler into an `axum::Router`,
//! injects the request context, and layers request-id tracking and tracing
//! on top. The build step never panics: it fails with a `Bootstrap`-kind
//! fault when a required shared dependency (the logger) is missing or the
//! route table is inconsistent.
//!
//! # Example
//!
//! ```rust,ignore
//! use restwire::prelude::*;
//!
//! let app = Router::new()
//!     .with_logger(Logger::new("users"))
//!     .get("/user/{user_id}", get_user)
//!     .post("/user", create_user)
//!     .build()?;
//!
//! Server::new(Config::load()?).serve(app).await?;
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{RawPathParams, Request},
    middleware::{self, Next},
    response::Response,
    routing::{on, MethodFilter},
};
use http::Method;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::bind::{Binder, RequestParts};
use crate::context::RequestContext;
use crate::error::{Fault, FaultKind, Result};
use crate::handlers::{classify, Handler};
use crate::observability::Logger;

/// Collects routes and shared dependencies until the table freezes
pub struct Router {
    routes: Vec<Route>,
    logger: Option<Logger>,
    binder: Binder,
}

struct Route {
    method: Method,
    path: String,
    handler: Arc<dyn Handler>,
}

impl Router {
    /// Start an empty router with the default binder
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            logger: None,
            binder: Binder::new(),
        }
    }

    /// Supply the logger sink; required before [`Router::build`]
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replace the binder, e.g. to add custom providers
    #[must_use]
    pub fn with_binder(mut self, binder: Binder) -> Self {
        self.binder = binder;
        self
    }

    /// Register a GET route
    #[must_use]
    pub fn get(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.route(Method::GET, path, handler)
    }

    /// Register a POST route
    #[must_use]
    pub fn post(self, path: impl Into<String>, handler: impl Handler) -> Self {
        self.route(Method::POST, path, handler)
    }

    /// Register a route for an arbitrary method
    #[must_use]
    pub fn route(
        mut self,
        method: Method,
        path: impl Into<String>,
        handler: impl Handler,
    ) -> Self {
        self.routes.push(Route {
            method,
            path: path.into(),
            handler: Arc::new(handler),
        });
        self
    }

    /// Freeze the route table and produce the transport router
    ///
    /// Fails with a `Bootstrap` fault when the logger is missing, a route
    /// is registered twice, or a method is unsupported by the transport.
    pub fn build(self) -> Result<axum::Router> {
        let logger = self
            .logger
            .ok_or_else(|| Fault::bootstrap("router requires a logger before build"))?;
        let binder = Arc::new(self.binder);

        let mut seen = HashSet::new();
        let mut app = axum::Router::new();

        for route in self.routes {
            if !seen.insert((route.method.clone(), route.path.clone())) {
                return Err(Fault::bootstrap(format!(
                    "duplicate route {} {}",
                    route.method, route.path
                )));
            }

            let filter = MethodFilter::try_from(route.method.clone()).map_err(|err| {
                Fault::wrap(err, format!("unsupported method {}", route.method))
                    .with_kind(FaultKind::Bootstrap)
            })?;

            tracing::debug!(
                method = %route.method,
                path = %route.path,
                input = route.handler.input_shape(),
                output = route.handler.output_shape(),
                "registering route"
            );

            let handler = route.handler;
            let route_binder = Arc::clone(&binder);
            let route_logger = logger.clone();
            let service = on(filter, move |params: RawPathParams, request: Request| {
                let handler = Arc::clone(&handler);
                let binder = Arc::clone(&route_binder);
                let logger = route_logger.clone();
                async move { dispatch(handler, binder, logger, params, request).await }
            });

            app = app.route(&route.path, service);
        }

        let layer_logger = logger;
        let context_layer = middleware::from_fn(move |mut request: Request, next: Next| {
            let logger = layer_logger.clone();
            async move {
                let method = request.method().clone();
                let path = request.uri().path().to_owned();
                RequestContext::obtain(request.extensions_mut(), &logger, &method, &path);
                next.run(request).await
            }
        });

        // Layers apply bottom-up: request-id assignment first, then
        // propagation, tracing, and context injection.
        Ok(app
            .layer(context_layer)
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<String> = self
            .routes
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        f.debug_struct("Router")
            .field("routes", &routes)
            .field("logger", &self.logger)
            .finish()
    }
}

/// Per-request transport glue: assemble parts, read the body, run the
/// handler
async fn dispatch(
    handler: Arc<dyn Handler>,
    binder: Arc<Binder>,
    logger: Logger,
    params: RawPathParams,
    request: Request,
) -> Response {
    let (mut head, body) = request.into_parts();
    let ctx = RequestContext::obtain(&mut head.extensions, &logger, &head.method, head.uri.path());

    let path_params = params
        .iter()
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .collect();
    let raw_query = head.uri.query().unwrap_or("").to_owned();
    let parts = RequestParts::new(path_params, &raw_query, head.headers);

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return classify::respond(
                &ctx,
                Fault::wrap(err, "failed to read request body")
                    .with_kind(FaultKind::Infra)
                    .into(),
            )
        }
    };

    handler.call(ctx, binder, parts, bytes).await
}
