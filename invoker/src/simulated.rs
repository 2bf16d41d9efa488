//! An in-process runtime API for exercising the run loop over real HTTP.

use crate::{
    types::{Diagnostic, DEADLINE_HEADER, FUNCTION_ID_HEADER, REQUEST_ID_HEADER},
    Error,
};
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use hyper::{
    service::{make_service_fn, service_fn},
    Body,
};
use serde_json::Value;
use std::{
    collections::VecDeque,
    convert::Infallible,
    net::{SocketAddr, TcpListener},
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::oneshot;

const DEADLINE_MS: u64 = 4_102_444_800_000;

pub(crate) struct Invocation {
    request_id: String,
    body: Vec<u8>,
}

impl Invocation {
    pub(crate) fn new(request_id: &str, body: Value) -> Self {
        Self {
            request_id: request_id.to_string(),
            body: body.to_string().into_bytes(),
        }
    }
}

#[derive(Default)]
pub(crate) struct State {
    pending: VecDeque<Invocation>,
    pub(crate) responses: Vec<(String, Value)>,
    pub(crate) errors: Vec<(String, Diagnostic)>,
    pub(crate) user_agents: Vec<String>,
    reject_results: bool,
}

pub(crate) struct Server {
    addr: SocketAddr,
    state: Arc<Mutex<State>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl State {
    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Server {
    /// Bind a loopback port and serve `events` in order. Must be called inside a tokio runtime.
    pub(crate) fn start(events: Vec<Invocation>) -> Result<Self, Error> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(State {
            pending: events.into(),
            ..Default::default()
        }));

        let shared = Arc::clone(&state);
        let make_svc = make_service_fn(move |_conn| {
            let state = Arc::clone(&shared);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle(Arc::clone(&state), req)))
            }
        });

        let (tx, rx) = oneshot::channel::<()>();
        let server = hyper::Server::from_tcp(listener)?
            .serve(make_svc)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            });
        tokio::spawn(server);

        Ok(Self {
            addr,
            state,
            shutdown: Some(tx),
        })
    }

    pub(crate) fn endpoint(&self) -> String {
        self.addr.to_string()
    }

    /// Answer every posted result or error with a 500.
    pub(crate) fn reject_results(&self) {
        self.state().reject_results = true;
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("simulated state poisoned")
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(state: Arc<Mutex<State>>, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = hyper::body::to_bytes(body).await.unwrap_or_default();
    let mut state = state.lock().expect("simulated state poisoned");
    if let Some(ua) = parts.headers.get("user-agent").and_then(|v| v.to_str().ok()) {
        state.user_agents.push(ua.to_string());
    }
    Ok(route(&mut state, &parts.method, parts.uri.path(), body))
}

fn route(state: &mut State, method: &Method, path: &str, body: Bytes) -> Response<Body> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let builder = Response::builder();
    let rsp = match (method, segments.as_slice()) {
        (&Method::GET, ["v1", "invocation", "next"]) => match state.pending.pop_front() {
            Some(invocation) => builder
                .header(REQUEST_ID_HEADER, invocation.request_id)
                .header(DEADLINE_HEADER, DEADLINE_MS.to_string())
                .header(FUNCTION_ID_HEADER, "fn:simulated")
                .body(Body::from(invocation.body)),
            None => builder.status(StatusCode::NOT_FOUND).body(Body::empty()),
        },
        (&Method::POST, ["v1", "invocation", _, _]) if state.reject_results => builder
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::empty()),
        (&Method::POST, ["v1", "invocation", id, "response"]) => match serde_json::from_slice(&body) {
            Ok(value) => {
                state.responses.push((decode(id), value));
                builder.status(StatusCode::ACCEPTED).body(Body::empty())
            }
            Err(_) => builder.status(StatusCode::BAD_REQUEST).body(Body::empty()),
        },
        (&Method::POST, ["v1", "invocation", id, "error"]) => match serde_json::from_slice(&body) {
            Ok(diagnostic) => {
                state.errors.push((decode(id), diagnostic));
                builder.status(StatusCode::ACCEPTED).body(Body::empty())
            }
            Err(_) => builder.status(StatusCode::BAD_REQUEST).body(Body::empty()),
        },
        _ => builder.status(StatusCode::NOT_FOUND).body(Body::empty()),
    };
    rsp.expect("static response parts are valid")
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|id| id.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}
