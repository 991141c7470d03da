//! Scripted transport for unit tests

use crate::error::GatewayError;
use crate::gateway::{Transport, TransportResponse};
use crate::provider::OutboundRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, GatewayError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
    calls: AtomicUsize,
    panics: bool,
}

impl MockTransport {
    pub fn scripted(responses: Vec<Result<TransportResponse, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            panics: false,
        })
    }

    pub fn replying(status: u16, body: Value) -> Arc<Self> {
        Self::replying_raw(status, &body.to_string())
    }

    pub fn replying_raw(status: u16, body: &str) -> Arc<Self> {
        Self::scripted(vec![Ok(TransportResponse {
            status,
            body: body.to_string(),
        })])
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::scripted(vec![Err(GatewayError::Transport(message.to_string()))])
    }

    /// Panics on the first call, for exercising panic handling upstream
    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            panics: true,
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, request: &OutboundRequest) -> Result<TransportResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("scripted transport panic");
        }
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no scripted response left".to_string())))
    }
}
