//! Blocking client core for the Baselinker inventory API.
//!
//! # Overview
//! Lists inventories, products and extra-field definitions, reads product
//! detail records, and edits an inventory's second extra field through
//! `addInventoryProduct`.
//!
//! # Design
//! - `Connector` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Transport` executes the round trip; `UreqTransport` is the blocking
//!   production implementation.
//! - `BaselinkerClient` composes the two and owns the update workflow.
//! - Upstream list-vs-keyed collections are normalized in `normalize` only.
//! - `table` holds the row/diff helpers shared by the front-ends.

pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod http;
pub mod normalize;
pub mod table;
pub mod transport;
pub mod types;
pub mod update;

pub use client::BaselinkerClient;
pub use config::{ConfigError, Settings};
pub use connector::Connector;
pub use error::ApiError;
pub use http::{HttpRequest, HttpResponse};
pub use table::{diff_field2, EditedValue, ExtraFieldSlots, FieldChange, ProductRow, ProductTable};
pub use transport::{Transport, UreqTransport};
pub use types::{DetailMap, ExtraFieldDef, Inventory, ProductDetail, ProductSummary, TextFields, UpsertProduct};
pub use update::FieldUpdate;
