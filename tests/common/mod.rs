//! Shared helpers for integration tests

use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::BoxFuture;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use unicorn_maker::crudcrud::http::{RawResponse, RemoteClient, TransportError};

/// Remote that answers every route with one fixed response (404 when
/// unregistered) and records the methods it was called with.
#[derive(Default)]
pub struct StubRemote {
    routes: HashMap<(Method, String), RawResponse>,
    calls: Mutex<Vec<Method>>,
}

impl StubRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, method: Method, path: &str, status: u16, body: Value) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.routes
            .insert((method, path.to_string()), RawResponse::new(status, body.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_with(&self, method: &Method) -> usize {
        self.calls.lock().unwrap().iter().filter(|m| *m == method).count()
    }
}

impl RemoteClient for StubRemote {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        _body: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        self.calls.lock().unwrap().push(method.clone());
        let reply = self
            .routes
            .get(&(method, path.to_string()))
            .cloned()
            .unwrap_or_else(|| RawResponse::new(StatusCode::NOT_FOUND, ""));
        Box::pin(async move { Ok(reply) })
    }
}
