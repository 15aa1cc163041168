//! Blocking Baselinker client.
//!
//! # Design
//! `BaselinkerClient` pairs a `Connector` (pure build/parse) with a
//! `Transport` (the round trip). It holds no mutable state, so one instance
//! can serve any number of sequential or concurrent callers. Every operation
//! is a single independent call except `update_second_extra_field`, which
//! chains reads before its one write, and `product_table`, which joins three
//! reads for the front-ends.

use crate::config::Settings;
use crate::connector::Connector;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::table::{build_rows, ExtraFieldSlots, ProductTable};
use crate::transport::{Transport, UreqTransport};
use crate::types::{DetailMap, ExtraFieldDef, Inventory, ProductDetail, ProductSummary};
use crate::update::{plan_upsert, FieldUpdate, ProductSource};

pub struct BaselinkerClient<T = UreqTransport> {
    connector: Connector,
    transport: T,
}

impl BaselinkerClient<UreqTransport> {
    pub fn new(settings: &Settings) -> Self {
        Self::with_transport(
            Connector::new(&settings.endpoint, &settings.token),
            UreqTransport::new(),
        )
    }
}

impl<T: Transport> BaselinkerClient<T> {
    pub fn with_transport(connector: Connector, transport: T) -> Self {
        Self {
            connector,
            transport,
        }
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&Connector, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let request = request?;
        let method = request.method_name().unwrap_or_default();
        tracing::debug!(method = %method, "connector call");
        let response = self.transport.send(&request)?;
        parse(&self.connector, response).inspect_err(|e| {
            tracing::debug!(method = %method, error = %e, "connector call failed");
        })
    }

    pub fn list_inventories(&self) -> Result<Vec<Inventory>, ApiError> {
        self.call(
            self.connector.build_list_inventories(),
            Connector::parse_list_inventories,
        )
    }

    pub fn list_products(&self, inventory_id: i64) -> Result<Vec<ProductSummary>, ApiError> {
        self.call(
            self.connector.build_list_products(inventory_id),
            Connector::parse_list_products,
        )
    }

    pub fn list_extra_fields(&self, inventory_id: i64) -> Result<Vec<ExtraFieldDef>, ApiError> {
        self.call(
            self.connector.build_list_extra_fields(inventory_id),
            Connector::parse_list_extra_fields,
        )
    }

    /// Detail records for `product_ids`, keyed by stringified product ID.
    /// Products the server does not know are simply absent.
    pub fn products_detailed(
        &self,
        product_ids: &[i64],
        inventory_id: i64,
    ) -> Result<DetailMap, ApiError> {
        self.call(
            self.connector.build_products_data(product_ids, inventory_id),
            Connector::parse_products_data,
        )
    }

    pub fn product_detail(
        &self,
        product_id: i64,
        inventory_id: i64,
    ) -> Result<Option<ProductDetail>, ApiError> {
        let mut details = self.products_detailed(&[product_id], inventory_id)?;
        Ok(details.remove(&product_id.to_string()))
    }

    /// Set the inventory's second extra field on one product.
    ///
    /// Fails without writing anything when the inventory defines fewer than
    /// two extra fields or when the product is found neither in the detail
    /// data nor in the product list.
    pub fn update_second_extra_field(
        &self,
        product_id: i64,
        inventory_id: i64,
        value: &str,
    ) -> Result<FieldUpdate, ApiError> {
        let definitions = self.list_extra_fields(inventory_id)?;
        let target = ExtraFieldSlots::from_definitions(&definitions)
            .second
            .ok_or(ApiError::NotEnoughExtraFields {
                inventory_id,
                found: definitions.len(),
            })?;
        tracing::debug!(field = %target.name, field_id = target.extra_field_id, "resolved target field");

        let upsert = match self.product_detail(product_id, inventory_id)? {
            Some(detail) => {
                let summary_name = if detail.text_fields.name().is_some_and(|n| !n.is_empty()) {
                    None
                } else {
                    self.summary_name(product_id, inventory_id)
                };
                plan_upsert(
                    inventory_id,
                    product_id,
                    &target,
                    ProductSource::Detail {
                        detail: &detail,
                        summary_name: summary_name.as_deref(),
                    },
                    value,
                )
            }
            None => {
                tracing::debug!(product_id, "no detail record, falling back to product list");
                let products = self.list_products(inventory_id)?;
                let summary = products
                    .iter()
                    .find(|p| p.id == product_id)
                    .ok_or(ApiError::ProductNotFound {
                        product_id,
                        inventory_id,
                    })?;
                plan_upsert(
                    inventory_id,
                    product_id,
                    &target,
                    ProductSource::Summary(summary),
                    value,
                )
            }
        };

        self.call(
            self.connector.build_add_product(&upsert),
            Connector::parse_add_product,
        )
        .inspect_err(|e| tracing::warn!(product_id, inventory_id, error = %e, "update failed"))?;

        tracing::info!(product_id, inventory_id, field = %target.name, "extra field updated");
        Ok(FieldUpdate {
            product_id,
            inventory_id,
            field: target,
            value: value.to_string(),
        })
    }

    /// Name from the product list, for detail records without one. A failed
    /// lookup leaves the name unresolved rather than failing the update.
    fn summary_name(&self, product_id: i64, inventory_id: i64) -> Option<String> {
        tracing::debug!(product_id, "detail record has no name, looking it up in the product list");
        match self.list_products(inventory_id) {
            Ok(products) => products
                .into_iter()
                .find(|p| p.id == product_id)
                .map(|p| p.name)
                .filter(|n| !n.is_empty()),
            Err(e) => {
                tracing::warn!(product_id, inventory_id, error = %e, "could not look up product name");
                None
            }
        }
    }

    /// Load everything a front-end needs to render an inventory.
    ///
    /// A failed detail fetch degrades to empty extra-field columns instead of
    /// failing the whole table.
    pub fn product_table(&self, inventory_id: i64) -> Result<ProductTable, ApiError> {
        let slots = ExtraFieldSlots::from_definitions(&self.list_extra_fields(inventory_id)?);
        self.table_with_slots(inventory_id, slots)
    }

    /// Like [`Self::product_table`], but fails with `NotEnoughExtraFields`
    /// before listing any products when there is no second field to edit.
    pub fn editable_product_table(&self, inventory_id: i64) -> Result<ProductTable, ApiError> {
        let definitions = self.list_extra_fields(inventory_id)?;
        let slots = ExtraFieldSlots::from_definitions(&definitions);
        if slots.second.is_none() {
            return Err(ApiError::NotEnoughExtraFields {
                inventory_id,
                found: definitions.len(),
            });
        }
        self.table_with_slots(inventory_id, slots)
    }

    fn table_with_slots(
        &self,
        inventory_id: i64,
        slots: ExtraFieldSlots,
    ) -> Result<ProductTable, ApiError> {
        let products = self.list_products(inventory_id)?;
        let details = if products.is_empty() {
            DetailMap::new()
        } else {
            let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
            self.products_detailed(&ids, inventory_id)
                .unwrap_or_else(|e| {
                    tracing::warn!(inventory_id, error = %e, "could not fetch detail data, showing basic data only");
                    DetailMap::new()
                })
        };
        let rows = build_rows(&products, &details, &slots);
        Ok(ProductTable {
            inventory_id,
            slots,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::{json, Value};

    use super::*;
    use crate::connector::{ADD_PRODUCT, GET_EXTRA_FIELDS, GET_PRODUCTS_DATA, GET_PRODUCTS_LIST};

    /// Answers each connector method with a canned body and records requests.
    #[derive(Default)]
    struct Scripted {
        replies: HashMap<&'static str, Value>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(mut self, method: &'static str, body: Value) -> Self {
            self.replies.insert(method, body);
            self
        }

        fn methods(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.method_name().unwrap())
                .collect()
        }

        fn last_parameters(&self, method: &str) -> Option<Value> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|r| r.method_name().as_deref() == Some(method))
                .and_then(HttpRequest::parameters)
        }
    }

    impl Transport for Scripted {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent.lock().unwrap().push(request.clone());
            let method = request.method_name().unwrap_or_default();
            match self.replies.get(method.as_str()) {
                Some(body) => Ok(HttpResponse::ok(body.to_string())),
                None => Err(ApiError::Transport(format!("no reply scripted for {method}"))),
            }
        }
    }

    fn client(transport: Scripted) -> BaselinkerClient<Scripted> {
        BaselinkerClient::with_transport(Connector::new("http://connector.test", "t"), transport)
    }

    fn two_fields() -> Value {
        json!({"status": "SUCCESS", "extra_fields": [
            {"extra_field_id": 10, "name": "Color"},
            {"extra_field_id": 11, "name": "Note"}
        ]})
    }

    fn widget_detail() -> Value {
        json!({"status": "SUCCESS", "products": {"123": {"sku": "W", "ean": "", "text_fields": {"name": "Widget"}}}})
    }

    #[test]
    fn update_targets_second_field_and_succeeds() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(GET_PRODUCTS_DATA, widget_detail())
                .reply(ADD_PRODUCT, json!({"status": "SUCCESS"})),
        );
        let update = c.update_second_extra_field(123, 7, "urgent").unwrap();
        assert_eq!(update.field.extra_field_id, 11);

        let params = c.transport.last_parameters(ADD_PRODUCT).unwrap();
        assert_eq!(params["inventory_id"], "7");
        assert_eq!(params["product_id"], "123");
        assert_eq!(
            params["text_fields"],
            json!({"name": "Widget", "extra_field_11": "urgent"})
        );
        assert_eq!(
            c.transport.last_parameters(GET_PRODUCTS_DATA).unwrap(),
            json!({"inventory_id": 7, "products": [123]})
        );
    }

    #[test]
    fn update_fails_on_error_status() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(GET_PRODUCTS_DATA, widget_detail())
                .reply(ADD_PRODUCT, json!({"status": "ERROR"})),
        );
        let err = c.update_second_extra_field(123, 7, "urgent").unwrap_err();
        assert!(matches!(err, ApiError::Api { .. }));
    }

    #[test]
    fn update_needs_two_extra_fields() {
        let c = client(Scripted::default().reply(
            GET_EXTRA_FIELDS,
            json!({"status": "SUCCESS", "extra_fields": [{"extra_field_id": 10, "name": "Color"}]}),
        ));
        let err = c.update_second_extra_field(123, 7, "x").unwrap_err();
        assert!(matches!(
            err,
            ApiError::NotEnoughExtraFields { inventory_id: 7, found: 1 }
        ));
        assert_eq!(c.transport.methods(), vec![GET_EXTRA_FIELDS]);
    }

    #[test]
    fn update_falls_back_to_product_list() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(GET_PRODUCTS_DATA, json!({"status": "SUCCESS", "products": []}))
                .reply(
                    GET_PRODUCTS_LIST,
                    json!({"status": "SUCCESS", "products": {"123": {"id": 123, "sku": "S", "name": "Listed"}}}),
                )
                .reply(ADD_PRODUCT, json!({"status": "SUCCESS"})),
        );
        c.update_second_extra_field(123, 7, "v").unwrap();
        let params = c.transport.last_parameters(ADD_PRODUCT).unwrap();
        assert_eq!(params["sku"], "S");
        assert_eq!(params["text_fields"], json!({"name": "Listed", "extra_field_11": "v"}));
    }

    #[test]
    fn update_takes_name_from_list_when_detail_has_none() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(
                    GET_PRODUCTS_DATA,
                    json!({"status": "SUCCESS", "products": {"123": {"sku": "W", "text_fields": {"extra_field_10": "red"}}}}),
                )
                .reply(
                    GET_PRODUCTS_LIST,
                    json!({"status": "SUCCESS", "products": {"123": {"id": 123, "sku": "W", "name": "Widget"}}}),
                )
                .reply(ADD_PRODUCT, json!({"status": "SUCCESS"})),
        );
        c.update_second_extra_field(123, 7, "urgent").unwrap();
        let params = c.transport.last_parameters(ADD_PRODUCT).unwrap();
        assert_eq!(params["text_fields"]["name"], "Widget");
        assert_eq!(params["text_fields"]["extra_field_10"], "red");
        assert_eq!(params["text_fields"]["extra_field_11"], "urgent");
    }

    #[test]
    fn update_without_any_name_leaves_name_out() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(
                    GET_PRODUCTS_DATA,
                    json!({"status": "SUCCESS", "products": {"123": {"sku": "W", "text_fields": {"extra_field_10": "red"}}}}),
                )
                .reply(ADD_PRODUCT, json!({"status": "SUCCESS"})),
        );
        c.update_second_extra_field(123, 7, "urgent").unwrap();
        let params = c.transport.last_parameters(ADD_PRODUCT).unwrap();
        assert_eq!(
            params["text_fields"],
            json!({"extra_field_10": "red", "extra_field_11": "urgent"})
        );
    }

    #[test]
    fn update_unknown_product_issues_no_upsert() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(GET_PRODUCTS_DATA, json!({"status": "SUCCESS", "products": {}}))
                .reply(GET_PRODUCTS_LIST, json!({"status": "SUCCESS", "products": []})),
        );
        let err = c.update_second_extra_field(123, 7, "v").unwrap_err();
        assert!(matches!(err, ApiError::ProductNotFound { product_id: 123, inventory_id: 7 }));
        assert!(!c.transport.methods().iter().any(|m| m == ADD_PRODUCT));
    }

    #[test]
    fn update_propagates_detail_failure() {
        let c = client(Scripted::default().reply(GET_EXTRA_FIELDS, two_fields()));
        let err = c.update_second_extra_field(123, 7, "v").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!c.transport.methods().iter().any(|m| m == ADD_PRODUCT));
    }

    #[test]
    fn product_table_degrades_without_details() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(
                    GET_PRODUCTS_LIST,
                    json!({"status": "SUCCESS", "products": {"5": {"id": 5, "sku": "A"}, "9": {"id": 9, "sku": "B"}}}),
                ),
        );
        let table = c.product_table(7).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows.iter().all(|r| r.field2.is_none()));
        assert_eq!(table.slots.second_label(), "Note");
    }

    #[test]
    fn product_table_skips_detail_call_when_empty() {
        let c = client(
            Scripted::default()
                .reply(GET_EXTRA_FIELDS, two_fields())
                .reply(GET_PRODUCTS_LIST, json!({"status": "SUCCESS", "products": []})),
        );
        let table = c.product_table(7).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(c.transport.methods(), vec![GET_EXTRA_FIELDS, GET_PRODUCTS_LIST]);
    }

    #[test]
    fn editable_table_stops_after_extra_fields() {
        let c = client(Scripted::default().reply(
            GET_EXTRA_FIELDS,
            json!({"status": "SUCCESS", "extra_fields": [{"extra_field_id": 10, "name": "Color"}]}),
        ));
        let err = c.editable_product_table(7).unwrap_err();
        assert!(matches!(
            err,
            ApiError::NotEnoughExtraFields { inventory_id: 7, found: 1 }
        ));
        assert_eq!(c.transport.methods(), vec![GET_EXTRA_FIELDS]);
    }

    #[test]
    fn failed_call_does_not_affect_next_one() {
        let c = client(Scripted::default().reply(
            GET_PRODUCTS_LIST,
            json!({"status": "SUCCESS", "products": [{"id": 1}]}),
        ));
        assert!(c.list_inventories().is_err());
        assert_eq!(c.list_products(7).unwrap().len(), 1);
    }
}
