//! Executes connector requests.
//!
//! `Transport` is the I/O seam between the pure `Connector` and the network.
//! `UreqTransport` is the production implementation; tests substitute
//! scripted transports.

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one blocking round trip.
///
/// Non-2xx statuses must come back as `Ok(HttpResponse)` so the connector
/// can interpret them; `Err` is reserved for failures that produced no
/// response at all.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// Blocking transport backed by a shared `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are data here; the connector decides what they mean.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder
            .send(request.body.as_bytes())
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
