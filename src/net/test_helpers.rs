//! Scripted in-memory transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::ClientError;

/// Replays queued responses in order and records every request it sees.
///
/// When the queue is empty the mock answers `404` so a test that forgot to
/// script a call fails on its assertions rather than hanging.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ClientError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    cookies: Mutex<HashMap<String, String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a JSON or text body.
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        lock(&self.responses).push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    /// Queue a JSON response built from a `serde_json::Value`.
    pub fn respond_json(&self, status: u16, body: &serde_json::Value) -> &Self {
        self.respond(status, body.to_string())
    }

    /// Queue a transport failure (no response received).
    pub fn fail(&self, message: &str) -> &Self {
        lock(&self.responses).push_back(Err(ClientError::Transport(message.to_owned())));
        self
    }

    pub fn set_cookie(&self, name: &str, value: &str) {
        lock(&self.cookies).insert(name.to_owned(), value.to_owned());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn paths(&self) -> Vec<String> {
        lock(&self.requests).iter().map(|r| r.path.clone()).collect()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn pending(&self) -> usize {
        lock(&self.responses).len()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "{\"error\":\"unscripted\"}")))
    }

    fn cookie(&self, name: &str) -> Option<String> {
        lock(&self.cookies).get(name).cloned()
    }
}
