//! In-memory [`RemoteClient`] for tests
//!
//! Responses are registered per `(method, path)`. When several responses are
//! queued for the same route they are returned in order and the last one
//! sticks. Unregistered routes answer `404`. Every call is recorded so tests
//! can assert that no request was issued.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use futures::future::BoxFuture;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use super::http::{RawResponse, RemoteClient, TransportError};

type Reply = Result<RawResponse, TransportError>;

/// A request seen by [`MockRemote`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockRemote {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue a JSON response
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.respond_raw(method, path, status, &body.to_string())
    }

    /// Queue a response with a literal body
    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.push(method, path, Ok(RawResponse::new(status, body)));
        self
    }

    /// Queue a transport failure
    pub fn fail(&self, method: Method, path: &str, error: TransportError) -> &Self {
        self.push(method, path, Err(error));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn calls_with(&self, method: &Method) -> usize {
        self.calls()
            .iter()
            .filter(|c| &c.method == method)
            .count()
    }

    fn reply(&self, method: &Method, path: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        let reply = routes
            .get_mut(&(method.clone(), path.to_string()))
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });
        reply.unwrap_or_else(|| Ok(RawResponse::new(StatusCode::NOT_FOUND, "")))
    }
}

impl RemoteClient for MockRemote {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        body: Option<&'a Value>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                method: method.clone(),
                path: path.to_string(),
                body: body.cloned(),
            });
        let reply = self.reply(&method, path);
        Box::pin(async move { reply })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_route_is_not_found() {
        let mock = MockRemote::new();
        let reply = tokio_test::block_on(mock.request(Method::GET, "/x", None)).unwrap();
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn test_queued_replies_then_last_sticks() {
        let mock = MockRemote::new();
        mock.respond_raw(Method::GET, "/a", 404, "")
            .respond_raw(Method::GET, "/a", 200, "{}");

        let statuses: Vec<u16> = (0..3)
            .map(|_| {
                tokio_test::block_on(mock.request(Method::GET, "/a", None))
                    .unwrap()
                    .status
                    .as_u16()
            })
            .collect();
        assert_eq!(statuses, vec![404, 200, 200]);
    }
}
