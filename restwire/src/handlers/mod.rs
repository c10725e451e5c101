//! Declarative request handlers
//!
//! A handler wraps a typed business function and owns the per-request
//! pipeline: defaults → body decode → tag binding → validation → invocation
//! → response serialization. Every failure along the way is routed to the
//! [classifier](classify), which alone decides status, log severity, and
//! body; no stage writes a response of its own except the final success
//! path.
//!
//! Two shapes are built in: [`Query`] replies 200 with the serialized
//! output, [`Command`] replies 202 with no body.
//!
//! # Example
//!
//! ```rust,ignore
//! use restwire::prelude::*;
//!
//! let get_user = Query::new(|_ctx: RequestContext, input: GetUser| async move {
//!     Ok::<_, Fault>(UserReply {
//!         greet: format!("hello user {}", input.id),
//!     })
//! });
//!
//! let app = Router::new()
//!     .with_logger(Logger::new("users"))
//!     .get("/user/{user_id}", get_user)
//!     .build()?;
//! ```

pub mod classify;
mod command;
mod query;

pub use classify::{classify, Classified, ErrorBody, Severity};
pub use command::Command;
pub use query::Query;

use std::sync::Arc;

use axum::{body::Bytes, response::Response};
use serde::de::DeserializeOwned;

use crate::bind::{Bind, Binder, RequestParts};
use crate::context::RequestContext;
use crate::error::BoxError;
use crate::validate::{Validate, ValidationFailure};

/// Object-safe handler contract the router registers routes against
///
/// Implementations report their declared input and output shapes, logged at
/// registration time, and serve one request per call.
#[async_trait::async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Declared input shape
    fn input_shape(&self) -> &'static str;

    /// Declared output shape
    fn output_shape(&self) -> &'static str;

    /// Run the pipeline for one request and produce the response
    async fn call(
        &self,
        ctx: RequestContext,
        binder: Arc<Binder>,
        parts: RequestParts,
        body: Bytes,
    ) -> Response;
}

/// Shared bind stage: defaults, body decode, tag binding, validation
///
/// The input starts from its `Default` value, a non-empty body overlays it,
/// and tag-sourced values bind last so declared path/query/header
/// parameters are authoritative.
pub(crate) fn bind_input<In>(
    binder: &Binder,
    parts: &RequestParts,
    body: &[u8],
) -> Result<In, BoxError>
where
    In: DeserializeOwned + Bind + Validate + Default,
{
    let mut input: In = if body.is_empty() {
        In::default()
    } else {
        serde_json::from_slice(body).map_err(BoxError::from)?
    };

    binder.resolve(parts, &mut input).map_err(BoxError::from)?;

    if let Err(errors) = input.validate() {
        return Err(ValidationFailure::from(errors).into());
    }

    Ok(input)
}
