//! # restwire
//!
//! Declarative REST request handling over axum: give it a typed business
//! function and it wires the full per-request pipeline of typed parameter
//! extraction, validation, invocation, and classified error responses.
//!
//! ## Features
//!
//! - **Declarative binding**: fields declare their sources with tags
//!   (`path:"user_id" query:"id" header:"X-Token"`), tried in declared
//!   order; schemas are built once at startup and reused per request
//! - **Typed coercion**: scalars, optionals, and sequences of every integer
//!   width, bool, and float; out-of-range input is a parse failure
//! - **Handler shapes**: `Query` (200 + JSON body) and `Command` (202, no
//!   body) around plain async functions
//! - **Error classification**: a kind-carrying fault type mapped to status,
//!   log severity, and a structured body; internals never leak
//! - **Frozen route table**: `Router::build()` fails with a bootstrap fault
//!   (never panics) when required dependencies are missing
//!
//! ## Example
//!
//! ```rust,no_run
//! use once_cell::sync::Lazy;
//! use restwire::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct GetUser {
//!     id: String,
//! }
//!
//! static GET_USER_SCHEMA: Lazy<BindSchema<GetUser>> = Lazy::new(|| {
//!     BindSchema::builder()
//!         .field("id", r#"path:"user_id""#, |r: &mut GetUser| &mut r.id)
//!         .build()
//! });
//!
//! impl Bind for GetUser {
//!     fn schema() -> &'static BindSchema<Self> {
//!         &GET_USER_SCHEMA
//!     }
//! }
//!
//! impl Validate for GetUser {}
//!
//! #[derive(Debug, Serialize)]
//! struct Greeting {
//!     greet: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let get_user = Query::new(|_ctx: RequestContext, input: GetUser| async move {
//!         Ok::<_, Fault>(Greeting {
//!             greet: format!("hello user {}", input.id),
//!         })
//!     });
//!
//!     let app = Router::new()
//!         .with_logger(Logger::from_config(&config))
//!         .get("/user/{user_id}", get_user)
//!         .build()?;
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod bind;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod router;
pub mod server;
pub mod validate;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bind::{
        Bind, BindError, BindSchema, Binder, CoerceError, FromToken, FromTokens,
        ProviderRegistry, RequestParts, SchemaBuilder, HEADER, PATH, QUERY,
    };
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{BoxError, Fault, FaultKind, Result};
    pub use crate::handlers::{
        classify, Classified, Command, ErrorBody, Handler, Query, Severity,
    };
    pub use crate::observability::{init_tracing, Logger};
    pub use crate::router::Router;
    pub use crate::server::Server;
    pub use crate::validate::{rules, Checks, FieldError, Validate, ValidationFailure};

    pub use axum::http::{HeaderMap, HeaderValue, StatusCode};

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros and types
    pub use tracing::{debug, error, info, instrument, trace, warn, Level, Span};

    // Re-export tokio for async runtime
    pub use tokio;

    // Re-export async-trait for async trait definitions
    pub use async_trait::async_trait;

    // Re-export lazy statics for binding schemas
    pub use once_cell::sync::Lazy;

    // Re-export HTTP types
    pub use http::{Method, Uri};
}
