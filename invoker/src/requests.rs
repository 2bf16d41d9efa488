use crate::{types::Diagnostic, Error};
use http::{Method, Request, Uri};
use hyper::Body;
use serde::Serialize;
use std::str::FromStr;

const USER_AGENT_HEADER: &str = "User-Agent";
const USER_AGENT: &str = concat!("fn-invoker/", env!("CARGO_PKG_VERSION"));

pub(crate) trait IntoRequest {
    fn into_req(self) -> Result<Request<Body>, Error>;
}

// GET /v1/invocation/next
#[derive(Debug, PartialEq)]
pub(crate) struct NextEventRequest;

impl IntoRequest for NextEventRequest {
    fn into_req(self) -> Result<Request<Body>, Error> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(Uri::from_static("/v1/invocation/next"))
            .header(USER_AGENT_HEADER, USER_AGENT)
            .body(Body::empty())?;
        Ok(req)
    }
}

// POST /v1/invocation/{request_id}/response
pub(crate) struct EventCompletionRequest<'a, T> {
    pub(crate) request_id: &'a str,
    pub(crate) body: T,
}

impl<'a, T> IntoRequest for EventCompletionRequest<'a, T>
where
    T: Serialize,
{
    fn into_req(self) -> Result<Request<Body>, Error> {
        let uri = format!("/v1/invocation/{}/response", urlencoding::encode(self.request_id));
        let uri = Uri::from_str(&uri)?;
        let body = serde_json::to_vec(&self.body)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .body(Body::from(body))?;
        Ok(req)
    }
}

// POST /v1/invocation/{request_id}/error
pub(crate) struct EventErrorRequest<'a> {
    pub(crate) request_id: &'a str,
    pub(crate) diagnostic: Diagnostic,
}

impl<'a> IntoRequest for EventErrorRequest<'a> {
    fn into_req(self) -> Result<Request<Body>, Error> {
        let uri = format!("/v1/invocation/{}/error", urlencoding::encode(self.request_id));
        let uri = Uri::from_str(&uri)?;
        let body = serde_json::to_vec(&self.diagnostic)?;
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(USER_AGENT_HEADER, USER_AGENT)
            .body(Body::from(body))?;
        Ok(req)
    }
}
