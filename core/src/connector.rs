//! Stateless request builder and response parser for `connector.php`.
//!
//! # Design
//! `Connector` holds only the endpoint and the token. Each operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. Every call has the same physical
//! shape, so all builders go through [`Connector::build_call`] and all
//! parsers through the envelope check in `open_envelope`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, FORM_CONTENT_TYPE, TOKEN_HEADER};
use crate::normalize;
use crate::types::{DetailMap, ExtraFieldDef, Inventory, ProductSummary, UpsertProduct};

pub const GET_INVENTORIES: &str = "getInventories";
pub const GET_PRODUCTS_LIST: &str = "getInventoryProductsList";
pub const GET_EXTRA_FIELDS: &str = "getInventoryExtraFields";
pub const GET_PRODUCTS_DATA: &str = "getInventoryProductsData";
pub const ADD_PRODUCT: &str = "addInventoryProduct";

const STATUS_SUCCESS: &str = "SUCCESS";

#[derive(Serialize)]
struct InventoryParams {
    inventory_id: i64,
}

#[derive(Serialize)]
struct ProductsDataParams<'a> {
    inventory_id: i64,
    products: &'a [i64],
}

/// Builds connector requests and parses connector responses without touching
/// the network.
#[derive(Debug, Clone)]
pub struct Connector {
    endpoint: String,
    token: String,
}

impl Connector {
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            endpoint: endpoint.trim().to_string(),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the single physical request shape: form fields `method` and
    /// `parameters` (JSON text), token header.
    pub fn build_call<P: Serialize + ?Sized>(
        &self,
        method: &str,
        parameters: &P,
    ) -> Result<HttpRequest, ApiError> {
        let parameters =
            serde_json::to_string(parameters).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("method", method)
            .append_pair("parameters", &parameters)
            .finish();
        Ok(HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![
                (TOKEN_HEADER.to_string(), self.token.clone()),
                ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ],
            body,
        })
    }

    pub fn build_list_inventories(&self) -> Result<HttpRequest, ApiError> {
        self.build_call(GET_INVENTORIES, &Map::new())
    }

    pub fn build_list_products(&self, inventory_id: i64) -> Result<HttpRequest, ApiError> {
        self.build_call(GET_PRODUCTS_LIST, &InventoryParams { inventory_id })
    }

    pub fn build_list_extra_fields(&self, inventory_id: i64) -> Result<HttpRequest, ApiError> {
        self.build_call(GET_EXTRA_FIELDS, &InventoryParams { inventory_id })
    }

    pub fn build_products_data(
        &self,
        product_ids: &[i64],
        inventory_id: i64,
    ) -> Result<HttpRequest, ApiError> {
        self.build_call(
            GET_PRODUCTS_DATA,
            &ProductsDataParams {
                inventory_id,
                products: product_ids,
            },
        )
    }

    pub fn build_add_product(&self, upsert: &UpsertProduct) -> Result<HttpRequest, ApiError> {
        self.build_call(ADD_PRODUCT, upsert)
    }

    pub fn parse_list_inventories(&self, response: HttpResponse) -> Result<Vec<Inventory>, ApiError> {
        let mut envelope = open_envelope(&response)?;
        normalize::into_sequence(take(&mut envelope, "inventories"))
    }

    pub fn parse_list_products(&self, response: HttpResponse) -> Result<Vec<ProductSummary>, ApiError> {
        let mut envelope = open_envelope(&response)?;
        normalize::into_sequence(take(&mut envelope, "products"))
    }

    pub fn parse_list_extra_fields(&self, response: HttpResponse) -> Result<Vec<ExtraFieldDef>, ApiError> {
        let mut envelope = open_envelope(&response)?;
        normalize::into_sequence(take(&mut envelope, "extra_fields"))
    }

    pub fn parse_products_data(&self, response: HttpResponse) -> Result<DetailMap, ApiError> {
        let mut envelope = open_envelope(&response)?;
        normalize::into_keyed(take(&mut envelope, "products"))
    }

    pub fn parse_add_product(&self, response: HttpResponse) -> Result<(), ApiError> {
        open_envelope(&response).map(|_| ())
    }
}

fn take(envelope: &mut Map<String, Value>, key: &str) -> Value {
    envelope.remove(key).unwrap_or(Value::Null)
}

/// Check HTTP status, JSON shape and the `status` field; return the body
/// object on `SUCCESS`.
fn open_envelope(response: &HttpResponse) -> Result<Map<String, Value>, ApiError> {
    if !(200..300).contains(&response.status) {
        return Err(ApiError::HttpError {
            status: response.status,
            body: response.body.clone(),
        });
    }
    let value: Value =
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    let Value::Object(envelope) = value else {
        return Err(ApiError::DeserializationError(
            "response is not a JSON object".to_string(),
        ));
    };
    match envelope.get("status").and_then(Value::as_str) {
        Some(STATUS_SUCCESS) => Ok(envelope),
        status => {
            let code = envelope
                .get("error_code")
                .and_then(Value::as_str)
                .map(str::to_string);
            let message = envelope
                .get("error_message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| match status {
                    Some(status) => format!("unexpected status {status}"),
                    None => "response has no status".to_string(),
                });
            Err(ApiError::Api { code, message })
        }
    }
}
