//! Command handler: bind, invoke, acknowledge with 202 and no body
//!
//! The write-side counterpart of [`Query`](super::Query): the business
//! function produces no output value, only success or failure. Success is
//! acknowledged with 202 Accepted and an empty body; failures run through
//! the same classifier as queries.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::bind::{Bind, Binder, RequestParts};
use crate::context::RequestContext;
use crate::error::BoxError;
use crate::validate::Validate;

use super::{bind_input, classify, Handler};

/// Write-side handler shape: `f(ctx, In) -> Result<(), E>` answered with
/// 202 Accepted, no body
pub struct Command<In, F> {
    handle: F,
    _marker: PhantomData<fn(In)>,
}

impl<In, F> Command<In, F> {
    /// Wrap a business function as a command handler
    pub fn new(handle: F) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<In, F, Fut, E> Handler for Command<In, F>
where
    In: DeserializeOwned + Bind + Validate + Default + Send + 'static,
    F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn input_shape(&self) -> &'static str {
        std::any::type_name::<In>()
    }

    fn output_shape(&self) -> &'static str {
        "()"
    }

    async fn call(
        &self,
        ctx: RequestContext,
        binder: Arc<Binder>,
        parts: RequestParts,
        body: Bytes,
    ) -> Response {
        let span = ctx.span().clone();
        async move {
            tracing::debug!("handling command request");

            let input = match bind_input::<In>(&binder, &parts, &body) {
                Ok(input) => input,
                Err(err) => return classify::respond(&ctx, err),
            };

            let result = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    tracing::info!("request cancelled before completion");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
                result = (self.handle)(ctx.clone(), input) => result,
            };

            match result {
                Ok(()) => StatusCode::ACCEPTED.into_response(),
                Err(err) => classify::respond(&ctx, err.into()),
            }
        }
        .instrument(span)
        .await
    }
}
