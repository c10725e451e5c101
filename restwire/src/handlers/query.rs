//! Query handler: bind, invoke, reply 200 with the serialized output

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    body::Bytes,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::Instrument;

use crate::bind::{Bind, Binder, RequestParts};
use crate::context::RequestContext;
use crate::error::{BoxError, Fault, FaultKind};
use crate::validate::Validate;

use super::{bind_input, classify, Handler};

/// Read-side handler shape: `f(ctx, In) -> Result<Out, E>` answered with
/// 200 and the JSON-serialized output
///
/// The input type declares its binding schema ([`Bind`]), its defaults
/// (`Default`), its body shape (`Deserialize`), and its rules
/// ([`Validate`]); the handler wires the full pipeline around the business
/// function.
pub struct Query<In, Out, F> {
    handle: F,
    _marker: PhantomData<fn(In) -> Out>,
}

impl<In, Out, F> Query<In, Out, F> {
    /// Wrap a business function as a query handler
    pub fn new(handle: F) -> Self {
        Self {
            handle,
            _marker: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<In, Out, F, Fut, E> Handler for Query<In, Out, F>
where
    In: DeserializeOwned + Bind + Validate + Default + Send + 'static,
    Out: Serialize + Send + 'static,
    F: Fn(RequestContext, In) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn input_shape(&self) -> &'static str {
        std::any::type_name::<In>()
    }

    fn output_shape(&self) -> &'static str {
        std::any::type_name::<Out>()
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
            tracing::debug!("handling query request");

            let input = match bind_input::<In>(&binder, &parts, &body) {
                Ok(input) => input,
                Err(err) => return classify::respond(&ctx, err),
            };

            // Nothing has been written yet, so cancellation here is safe to
            // abandon; the business function may also observe the token.
            let result = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    tracing::info!("request cancelled before completion");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
                result = (self.handle)(ctx.clone(), input) => result,
            };

            match result {
                Ok(output) => match serde_json::to_vec(&output) {
                    Ok(payload) => (
                        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                        payload,
                    )
                        .into_response(),
                    Err(err) => classify::respond(
                        &ctx,
                        Fault::wrap(err, "failed to serialize response")
                            .with_kind(FaultKind::Infra)
                            .into(),
                    ),
                },
                Err(err) => classify::respond(&ctx, err.into()),
            }
        }
        .instrument(span)
        .await
    }
}
