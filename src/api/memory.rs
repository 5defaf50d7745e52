//! In-memory [`Transport`] with canned responses.
//!
//! Used by tests and by local development without a running finance API.
//! Every request is recorded; requests with no canned response fail with a
//! network error, so a fresh transport behaves like an unreachable server.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::api::transport::{ApiRequest, Method, Transport};
use crate::error::FetchError;

#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<(Method, String), Result<Value, FetchError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `body`.
    pub fn respond(&self, method: Method, path: impl Into<String>, body: Value) -> &Self {
        lock(&self.routes).insert((method, path.into()), Ok(body));
        self
    }

    /// Answer `method path` with `error`.
    pub fn fail(&self, method: Method, path: impl Into<String>, error: FetchError) -> &Self {
        lock(&self.routes).insert((method, path.into()), Err(error));
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    /// Number of requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Number of requests of any kind.
    pub fn total(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, FetchError> {
        let key = (request.method, request.path.clone());
        lock(&self.requests).push(request);
        lock(&self.routes)
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Network(format!("no route for {} {}", key.0, key.1))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_and_answers() {
        let t = MemoryTransport::new();
        t.respond(Method::Get, "/a", json!({ "ok": true }));

        assert_eq!(t.send(ApiRequest::get("/a")).await.unwrap(), json!({ "ok": true }));
        assert!(matches!(
            t.send(ApiRequest::get("/b")).await,
            Err(FetchError::Network(_))
        ));
        assert_eq!(t.total(), 2);
        assert_eq!(t.count(Method::Get, "/a"), 1);
    }
}
