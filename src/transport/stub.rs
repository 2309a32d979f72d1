use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::TransportError;

use super::{Request, Responder, Transport};

/// A request waiting for the test to answer it.
pub struct PendingRequest {
    pub request: Request,
    respond: Responder,
}

impl PendingRequest {
    pub fn respond(self, result: Result<Value, TransportError>) {
        (self.respond)(result)
    }
}

impl fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct StubState {
    pending: VecDeque<PendingRequest>,
    history: Vec<Request>,
    auto_reply: Option<Value>,
}

/// Deterministic in-memory transport for tests.
///
/// Every request is logged and queued in FIFO order until the test resolves
/// it with [`respond_next`](Self::respond_next) or
/// [`fail_next`](Self::fail_next). With [`reply_with`](Self::reply_with) set,
/// requests are answered immediately instead. Clones share one queue, so a
/// test can keep a handle after moving another into an adapter.
///
/// ```
/// use model_rust::{Callbacks, Model, RestPersistence, StubTransport};
/// use serde_json::json;
///
/// let transport = StubTransport::new();
/// let post = Model::builder("post")
///     .persistence(RestPersistence::new("/posts", transport.clone()))
///     .build();
///
/// let record = post.build(json!({ "title": "Foo" }));
/// record.save(Callbacks::new()).unwrap();
///
/// assert_eq!(transport.requests()[0].url, "/posts");
/// transport.respond_next(json!({ "id": 1 }));
/// assert_eq!(record.id(), Some(json!(1)));
/// ```
#[derive(Clone, Default)]
pub struct StubTransport {
    state: Arc<Mutex<StubState>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that answers every request at once with `body`.
    pub fn replying(body: Value) -> Self {
        let transport = Self::new();
        transport.reply_with(Some(body));
        transport
    }

    /// Answer future requests immediately with `body`, or queue them again
    /// when `None`.
    pub fn reply_with(&self, body: Option<Value>) {
        self.lock().auto_reply = body;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Requests still waiting for an answer, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.lock()
            .pending
            .iter()
            .map(|pending| pending.request.clone())
            .collect()
    }

    /// Every request ever sent, answered or not.
    pub fn history(&self) -> Vec<Request> {
        self.lock().history.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Take the oldest pending request out of the queue.
    pub fn take_next(&self) -> Option<PendingRequest> {
        self.lock().pending.pop_front()
    }

    /// Answer the oldest pending request with `body`. `false` if none waited.
    pub fn respond_next(&self, body: Value) -> bool {
        self.resolve_next(Ok(body))
    }

    /// Fail the oldest pending request with `error`. `false` if none waited.
    pub fn fail_next(&self, error: TransportError) -> bool {
        self.resolve_next(Err(error))
    }

    /// Answer every pending request, including ones queued while answering,
    /// with `body`. Returns how many were answered.
    pub fn respond_all(&self, body: Value) -> usize {
        let mut answered = 0;
        while self.respond_next(body.clone()) {
            answered += 1;
        }
        answered
    }

    fn resolve_next(&self, result: Result<Value, TransportError>) -> bool {
        match self.take_next() {
            Some(pending) => {
                pending.respond(result);
                true
            }
            None => false,
        }
    }
}

impl Transport for StubTransport {
    fn send(&self, request: Request, respond: Responder) {
        let body = {
            let mut state = self.lock();
            state.history.push(request.clone());
            match state.auto_reply.clone() {
                Some(body) => body,
                None => {
                    state.pending.push_back(PendingRequest { request, respond });
                    return;
                }
            }
        };

        respond(Ok(body));
    }
}

impl fmt::Debug for StubTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("StubTransport")
            .field("pending", &state.pending.len())
            .field("sent", &state.history.len())
            .finish()
    }
}
