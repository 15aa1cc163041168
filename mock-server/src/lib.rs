//! In-memory stand-in for Baselinker's `connector.php`.
//!
//! Implements the five inventory methods the client uses, with upstream
//! quirks kept on purpose: product lists come back keyed by stringified ID,
//! empty collections come back as `[]`, and `addInventoryProduct` replaces
//! `text_fields` wholesale.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const CONNECTOR_PATH: &str = "/connector.php";
pub const TOKEN_HEADER: &str = "x-bltoken";

#[derive(Deserialize)]
pub struct ConnectorForm {
    pub method: String,
    #[serde(default)]
    pub parameters: String,
}

/// Shape of `getInventoryProductsData` responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetailShape {
    /// Object keyed by stringified product ID, records without `id`.
    #[default]
    Keyed,
    /// Array of records carrying `id`.
    List,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MockProduct {
    pub id: i64,
    pub sku: String,
    pub ean: String,
    pub name: String,
    pub prices: Vec<(String, f64)>,
    pub text_fields: Map<String, Value>,
}

impl MockProduct {
    pub fn new(id: i64, sku: &str, name: &str) -> Self {
        let mut text_fields = Map::new();
        text_fields.insert("name".to_string(), Value::from(name));
        Self {
            id,
            sku: sku.to_string(),
            ean: String::new(),
            name: name.to_string(),
            prices: Vec::new(),
            text_fields,
        }
    }

    pub fn ean(mut self, ean: &str) -> Self {
        self.ean = ean.to_string();
        self
    }

    pub fn price(mut self, group: &str, price: f64) -> Self {
        self.prices.push((group.to_string(), price));
        self
    }

    pub fn text(mut self, key: &str, value: &str) -> Self {
        self.text_fields.insert(key.to_string(), Value::from(value));
        self
    }

    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.text_fields.get(key).and_then(Value::as_str)
    }

    fn prices_json(&self) -> Value {
        if self.prices.is_empty() {
            return json!([]);
        }
        Value::Object(
            self.prices
                .iter()
                .map(|(group, price)| (group.clone(), json!(price)))
                .collect(),
        )
    }

    fn summary_json(&self) -> Value {
        json!({
            "id": self.id,
            "ean": self.ean,
            "sku": self.sku,
            "name": self.name,
            "prices": self.prices_json(),
            "stock": [],
        })
    }

    fn detail_json(&self, with_id: bool) -> Value {
        let mut detail = json!({
            "sku": self.sku,
            "ean": self.ean,
            "prices": self.prices_json(),
            "text_fields": if self.text_fields.is_empty() {
                json!([])
            } else {
                Value::Object(self.text_fields.clone())
            },
        });
        if with_id {
            detail["id"] = json!(self.id);
        }
        detail
    }
}

#[derive(Clone, Debug)]
struct MockInventory {
    id: i64,
    name: String,
    extra_fields: Vec<(i64, String)>,
    products: BTreeMap<i64, MockProduct>,
}

/// Connector state. Build it with the chained setters, then share it with
/// [`Store::into_shared`].
#[derive(Clone, Debug)]
pub struct Store {
    token: String,
    inventories: Vec<MockInventory>,
    detail_shape: DetailShape,
    calls: Vec<String>,
}

pub type SharedStore = Arc<RwLock<Store>>;

type Reply = Result<Map<String, Value>, (&'static str, String)>;

impl Store {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            inventories: Vec::new(),
            detail_shape: DetailShape::default(),
            calls: Vec::new(),
        }
    }

    /// A small catalogue for running the front-ends locally.
    pub fn demo(token: &str) -> Self {
        Self::new(token)
            .inventory(307, "Main warehouse")
            .extra_field(307, 467, "Supplier")
            .extra_field(307, 484, "Warehouse note")
            .product(
                307,
                MockProduct::new(1001, "MUG-01", "Enamel mug")
                    .ean("5901234123457")
                    .price("105", 39.0)
                    .text("extra_field_467", "Acme"),
            )
            .product(
                307,
                MockProduct::new(1002, "CUP-02", "Camping cup")
                    .price("105", 24.5)
                    .text("extra_field_467", "Acme")
                    .text("extra_field_484", "shelf B2"),
            )
            .product(307, MockProduct::new(1003, "PLT-03", "Tin plate").price("105", 18.0))
            .inventory(308, "Outlet")
    }

    pub fn inventory(mut self, id: i64, name: &str) -> Self {
        self.inventories.push(MockInventory {
            id,
            name: name.to_string(),
            extra_fields: Vec::new(),
            products: BTreeMap::new(),
        });
        self
    }

    /// Panics if the inventory was not added first.
    pub fn extra_field(mut self, inventory_id: i64, field_id: i64, name: &str) -> Self {
        self.inventory_mut(inventory_id)
            .expect("inventory must be added before its extra fields")
            .extra_fields
            .push((field_id, name.to_string()));
        self
    }

    /// Panics if the inventory was not added first.
    pub fn product(mut self, inventory_id: i64, product: MockProduct) -> Self {
        self.inventory_mut(inventory_id)
            .expect("inventory must be added before its products")
            .products
            .insert(product.id, product);
        self
    }

    pub fn detail_shape(mut self, shape: DetailShape) -> Self {
        self.detail_shape = shape;
        self
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Method names received so far, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn find_product(&self, inventory_id: i64, product_id: i64) -> Option<&MockProduct> {
        self.inventories
            .iter()
            .find(|inv| inv.id == inventory_id)?
            .products
            .get(&product_id)
    }

    fn inventory_mut(&mut self, inventory_id: i64) -> Option<&mut MockInventory> {
        self.inventories.iter_mut().find(|inv| inv.id == inventory_id)
    }

    /// Handle one connector call and produce the response body.
    pub fn dispatch(&mut self, token: Option<&str>, method: &str, parameters: &str) -> Value {
        self.calls.push(method.to_string());
        let reply = if token != Some(self.token.as_str()) {
            Err(("ERROR_BAD_TOKEN", "Invalid user token".to_string()))
        } else {
            parse_parameters(parameters).and_then(|params| self.route(method, &params))
        };
        match reply {
            Ok(mut body) => {
                let mut envelope = Map::new();
                envelope.insert("status".to_string(), json!("SUCCESS"));
                envelope.append(&mut body);
                Value::Object(envelope)
            }
            Err((code, message)) => json!({
                "status": "ERROR",
                "error_code": code,
                "error_message": message,
            }),
        }
    }

    fn route(&mut self, method: &str, params: &Value) -> Reply {
        match method {
            "getInventories" => Ok(self.get_inventories()),
            "getInventoryExtraFields" => self.get_extra_fields(params),
            "getInventoryProductsList" => self.get_products_list(params),
            "getInventoryProductsData" => self.get_products_data(params),
            "addInventoryProduct" => self.add_product(params),
            other => Err(("ERROR_UNKNOWN_METHOD", format!("Unknown method: {other}"))),
        }
    }

    fn find_inventory(&self, params: &Value) -> Result<&MockInventory, (&'static str, String)> {
        let id = id_param(params, "inventory_id")?;
        self.inventories
            .iter()
            .find(|inv| inv.id == id)
            .ok_or(("ERROR_INVENTORY_NOT_FOUND", format!("Inventory {id} not found")))
    }

    fn get_inventories(&self) -> Map<String, Value> {
        let inventories: Vec<Value> = self
            .inventories
            .iter()
            .map(|inv| {
                json!({
                    "inventory_id": inv.id,
                    "name": inv.name,
                    "description": "",
                    "is_default": inv.id == self.inventories[0].id,
                })
            })
            .collect();
        reply("inventories", Value::Array(inventories))
    }

    fn get_extra_fields(&self, params: &Value) -> Reply {
        let inventory = self.find_inventory(params)?;
        let fields: Vec<Value> = inventory
            .extra_fields
            .iter()
            .map(|(id, name)| json!({"extra_field_id": id, "name": name, "kind": 0, "editor_type": "text"}))
            .collect();
        Ok(reply("extra_fields", Value::Array(fields)))
    }

    fn get_products_list(&self, params: &Value) -> Reply {
        let inventory = self.find_inventory(params)?;
        let products: Map<String, Value> = inventory
            .products
            .values()
            .map(|p| (p.id.to_string(), p.summary_json()))
            .collect();
        Ok(reply("products", keyed_or_empty_list(products)))
    }

    fn get_products_data(&self, params: &Value) -> Reply {
        let inventory = self.find_inventory(params)?;
        let ids: Vec<i64> = params
            .get("products")
            .and_then(Value::as_array)
            .ok_or(("ERROR_PARAMETERS", "products must be a list of IDs".to_string()))?
            .iter()
            .filter_map(as_id)
            .collect();
        let found = ids.iter().filter_map(|id| inventory.products.get(id));
        let products = match self.detail_shape {
            DetailShape::Keyed => keyed_or_empty_list(
                found.map(|p| (p.id.to_string(), p.detail_json(false))).collect(),
            ),
            DetailShape::List => Value::Array(found.map(|p| p.detail_json(true)).collect()),
        };
        Ok(reply("products", products))
    }

    fn add_product(&mut self, params: &Value) -> Reply {
        let inventory_id = self.find_inventory(params)?.id;
        let product_id = id_param(params, "product_id")?;
        let product = self
            .inventory_mut(inventory_id)
            .and_then(|inv| inv.products.get_mut(&product_id))
            .ok_or(("ERROR_PRODUCT_NOT_FOUND", format!("Product {product_id} not found")))?;

        if let Some(sku) = params.get("sku").and_then(Value::as_str) {
            product.sku = sku.to_string();
        }
        if let Some(ean) = params.get("ean").and_then(Value::as_str) {
            product.ean = ean.to_string();
        }
        if let Some(fields) = params.get("text_fields").and_then(Value::as_object) {
            product.text_fields = fields.clone();
            if let Some(name) = fields.get("name").and_then(Value::as_str) {
                product.name = name.to_string();
            }
        }
        let mut body = reply("product_id", json!(product_id));
        body.insert("warnings".to_string(), json!({}));
        Ok(body)
    }
}

fn reply(key: &str, value: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    body
}

/// PHP serializes an empty associative array as `[]`.
fn keyed_or_empty_list(map: Map<String, Value>) -> Value {
    if map.is_empty() {
        json!([])
    } else {
        Value::Object(map)
    }
}

fn parse_parameters(raw: &str) -> Result<Value, (&'static str, String)> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(("ERROR_PARAMETERS", "parameters must be a JSON object".to_string())),
        Err(e) => Err(("ERROR_PARAMETERS", format!("invalid parameters: {e}"))),
    }
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn id_param(params: &Value, key: &str) -> Result<i64, (&'static str, String)> {
    params
        .get(key)
        .and_then(as_id)
        .ok_or(("ERROR_PARAMETERS", format!("{key} is required")))
}

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route(CONNECTOR_PATH, post(connector))
        .with_state(store)
}

pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

async fn connector(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Form(form): Form<ConnectorForm>,
) -> Json<Value> {
    let token = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());
    tracing::debug!(method = %form.method, "connector call");
    let body = store
        .write()
        .await
        .dispatch(token, &form.method, &form.parameters);
    Json(body)
}
