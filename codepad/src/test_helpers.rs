//! Shared test doubles for the transport and provider seams.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::error::TransportError;
use crate::http::{ApiRequest, ApiResponse, Transport};
use crate::identity::Identity;

pub fn identity(uid: &str) -> Identity {
    Identity::new(uid, Some(format!("{uid}@example.com")), "password")
}

pub fn role_body(role: &str) -> ApiResponse {
    ApiResponse::new(200, serde_json::json!({ "role": role }).to_string())
}

/// Yield to the executor enough times for spawned local tasks to settle.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// =========================================================================
// RecordingTransport
// =========================================================================

/// Replays scripted responses in order and records every request.
/// Answers `200 {}` once the script runs out.
#[derive(Default)]
pub struct RecordingTransport {
    requests: RefCell<Vec<ApiRequest>>,
    responses: RefCell<VecDeque<Result<ApiResponse, TransportError>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<Result<ApiResponse, TransportError>>) -> Self {
        Self { requests: RefCell::default(), responses: RefCell::new(responses.into()) }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(200, "{}")))
    }
}

// =========================================================================
// GatedTransport
// =========================================================================

/// Holds each request until the test releases the gate registered for its
/// bearer token, so completion order can be chosen per test.
#[derive(Default)]
pub struct GatedTransport {
    requests: RefCell<Vec<ApiRequest>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<ApiResponse>>>,
}

impl GatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gate for `token`; send on the returned sender to complete it.
    pub fn gate(&self, token: &str) -> oneshot::Sender<ApiResponse> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(token.to_owned(), rx);
        tx
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

#[async_trait(?Send)]
impl Transport for GatedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let token = request.bearer_token().unwrap_or_default().to_owned();
        self.requests.borrow_mut().push(request);
        let gate = self.gates.borrow_mut().remove(&token);
        match gate {
            Some(rx) => rx.await.map_err(|_| TransportError::Request("gate dropped".to_owned())),
            None => Err(TransportError::Request(format!("no gate for token {token}"))),
        }
    }
}
