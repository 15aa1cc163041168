//! Error types for the Baselinker client.
//!
//! # Design
//! Transport, HTTP-status and JSON-shape failures keep the raw detail as text
//! so front-ends can print them as-is. `Api` carries the upstream
//! `error_code`/`error_message` pair. The two update preconditions get their
//! own variants because front-ends report them differently from upstream
//! failures.

use thiserror::Error;

/// Errors returned by `Connector` parse methods and `BaselinkerClient`
/// operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, TLS or read failure before a response was received.
    #[error("network error: {0}")]
    Transport(String),

    /// The connector answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body was not the JSON shape we expected.
    #[error("invalid JSON response: {0}")]
    DeserializationError(String),

    /// The request parameters could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The connector replied with a status other than `SUCCESS`.
    #[error("API error: {message}")]
    Api {
        code: Option<String>,
        message: String,
    },

    #[error("inventory {inventory_id} defines {found} extra field(s), at least 2 are required")]
    NotEnoughExtraFields { inventory_id: i64, found: usize },

    #[error("product {product_id} not found in inventory {inventory_id}")]
    ProductNotFound { product_id: i64, inventory_id: i64 },
}
