#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]

//! A function invoker and the runtime that feeds it.
//!
//! The core is [`invoke`]: it prints the `env` and `args` fields of an
//! [`InvocationInput`] to stdout and returns the input unchanged. The
//! runtime half pulls invocations from a host over HTTP, passes each one
//! to a [`Handler`] and posts the result back.
//!
//! ```no_run
//! use fn_invoker::{echo, handler_fn, run, Error};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     run(handler_fn(echo)).await
//! }
//! ```
pub use crate::{
    config::Config,
    invoker::{echo, invoke, invoke_with, ARGS_KEY, ENV_KEY},
    render::render,
    types::{Context, Diagnostic, InvocationInput},
};
use client::Client;
#[cfg(feature = "derive")]
pub use fn_invoker_attributes::function;
use futures_core::stream::Stream;
use futures_util::stream::StreamExt;
use hyper::Body;
use serde::{de::DeserializeOwned, Serialize};
use std::{any, convert::TryFrom, fmt, future::Future};
use tracing::{error, info_span, trace};
use tracing_futures::Instrument;

mod client;
mod config;
mod invoker;
mod render;
mod requests;
#[cfg(test)]
mod simulated;
mod types;

use requests::{EventCompletionRequest, EventErrorRequest, IntoRequest, NextEventRequest};

/// Error type that handlers may return.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

const INVALID_EVENT: &str = "InvalidEventDataError";

tokio::task_local! {
    /// The context of the invocation currently being handled.
    pub static INVOCATION_CTX: Context;
}

/// A trait describing an asynchronous function `A` to `B`.
pub trait Handler<A, B> {
    /// Errors returned by this handler.
    type Error;
    /// Response of this handler.
    type Fut: Future<Output = Result<B, Self::Error>>;
    /// Handle the incoming event.
    fn call(&mut self, event: A, context: Context) -> Self::Fut;
}

/// Returns a new [`HandlerFn`] with the given closure.
pub fn handler_fn<F>(f: F) -> HandlerFn<F> {
    HandlerFn { f }
}

/// A [`Handler`] implemented by a closure.
#[derive(Clone, Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, A, B, Error, Fut> Handler<A, B> for HandlerFn<F>
where
    F: Fn(A, Context) -> Fut,
    Fut: Future<Output = Result<B, Error>> + Send,
    Error: Into<Box<dyn std::error::Error + Send + Sync + 'static>> + fmt::Display,
{
    type Error = Error;
    type Fut = Fut;
    fn call(&mut self, req: A, ctx: Context) -> Self::Fut {
        (self.f)(req, ctx)
    }
}

/// Starts the runtime and begins polling for events on the runtime API.
///
/// The endpoint and function metadata come from [`Config::from_env`]. Only
/// failures talking to the runtime API end the loop, including a non-2xx
/// reply to a posted result; a bad event body or a handler error is
/// reported back to the host as a [`Diagnostic`].
pub async fn run<A, B, F>(handler: F) -> Result<(), Error>
where
    F: Handler<A, B>,
    <F as Handler<A, B>>::Error: fmt::Display,
    A: DeserializeOwned,
    B: Serialize,
{
    trace!("Loading config from env");
    let config = Config::from_env()?;
    let runtime = Runtime::new(client::endpoint_uri(&config.endpoint)?);
    let incoming = incoming(&runtime.client);
    runtime.run(incoming, handler, &config).await
}

struct Runtime {
    client: Client,
}

impl Runtime {
    fn new(endpoint: http::Uri) -> Self {
        Self {
            client: Client::new(endpoint),
        }
    }

    async fn run<A, B, F>(
        &self,
        incoming: impl Stream<Item = Result<http::Response<Body>, Error>> + Send,
        mut handler: F,
        config: &Config,
    ) -> Result<(), Error>
    where
        F: Handler<A, B>,
        <F as Handler<A, B>>::Error: fmt::Display,
        A: DeserializeOwned,
        B: Serialize,
    {
        let client = &self.client;
        tokio::pin!(incoming);
        while let Some(event) = incoming.next().await {
            trace!("New event arrived (run loop)");
            let event = event?;
            let (parts, body) = event.into_parts();

            let ctx = Context::try_from(parts.headers)?.with_config(config);
            let body = hyper::body::to_bytes(body).await?;
            trace!("{}", String::from_utf8_lossy(&body)); // this may be very verbose

            let request_id = ctx.request_id.clone();
            let span = info_span!("invocation", request_id = %request_id);

            let req = match parse_event::<A>(&body) {
                Ok(event) => {
                    let f = INVOCATION_CTX.scope(ctx.clone(), handler.call(event, ctx));
                    match f.instrument(span).await {
                        Ok(res) => EventCompletionRequest {
                            request_id: &request_id,
                            body: res,
                        }
                        .into_req()?,
                        Err(e) => {
                            error!(request_id = %request_id, "{}", e);
                            EventErrorRequest {
                                request_id: &request_id,
                                diagnostic: Diagnostic {
                                    error_type: type_name_of_val(&e).to_owned(),
                                    error_message: format!("{}", e),
                                },
                            }
                            .into_req()?
                        }
                    }
                }
                Err(diagnostic) => {
                    error!(request_id = %request_id, "{}", diagnostic.error_message);
                    EventErrorRequest {
                        request_id: &request_id,
                        diagnostic,
                    }
                    .into_req()?
                }
            };

            let rsp = client.call(req).await?;
            if !rsp.status().is_success() {
                error!(request_id = %request_id, status = %rsp.status(), "runtime API rejected the result");
                return Err(format!(
                    "runtime API rejected the result of {} with status {}",
                    request_id,
                    rsp.status()
                )
                .into());
            }
        }
        Ok(())
    }
}

fn incoming(client: &Client) -> impl Stream<Item = Result<http::Response<Body>, Error>> + Send + '_ {
    async_stream::stream! {
        loop {
            trace!("Waiting for next event (incoming loop)");
            let res = match NextEventRequest.into_req() {
                Ok(req) => client.call(req).await,
                Err(e) => Err(e),
            };
            yield res;
        }
    }
}

fn parse_event<A: DeserializeOwned>(body: &[u8]) -> Result<A, Diagnostic> {
    let de = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(de).map_err(|e| Diagnostic {
        error_type: INVALID_EVENT.to_owned(),
        error_message: format!("Error parsing event data: {}", e),
    })
}

fn type_name_of_val<T>(_: &T) -> &'static str {
    any::type_name::<T>()
}
