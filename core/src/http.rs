//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Every connector call is the same physical request: a form-encoded `POST`
//! with `method` and `parameters` fields and the token in `X-BLToken`. These
//! types describe that request and its response as plain data. `Connector`
//! builds and parses them without touching the network; a `Transport`
//! executes the round trip.

use serde_json::Value;

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-BLToken";

/// Content type of every connector request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A connector request described as plain data. Always sent as `POST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form-encoded body (`method=...&parameters=...`).
    pub body: String,
}

impl HttpRequest {
    /// Decode one field of the form body.
    pub fn form_field(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.body.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// The connector method name this request invokes.
    pub fn method_name(&self) -> Option<String> {
        self.form_field("method")
    }

    /// The decoded `parameters` JSON object.
    pub fn parameters(&self) -> Option<Value> {
        self.form_field("parameters")
            .and_then(|raw| serde_json::from_str(&raw).ok())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A connector response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// A `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}
