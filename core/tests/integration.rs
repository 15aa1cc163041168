//! End-to-end flow against the mock connector over real HTTP.
//!
//! Starts the mock server on a random port, then drives `BaselinkerClient`
//! with the production `UreqTransport`.

use baselinker_core::{ApiError, BaselinkerClient, Settings};
use mock_server::{DetailShape, MockProduct, SharedStore, Store, CONNECTOR_PATH};

const TOKEN: &str = "integration-token";

fn catalogue() -> Store {
    Store::new(TOKEN)
        .inventory(7, "Main")
        .extra_field(7, 10, "Color")
        .extra_field(7, 11, "Note")
        .product(
            7,
            MockProduct::new(123, "W-1", "Widget")
                .ean("5901234123457")
                .price("105", 19.9)
                .text("extra_field_10", "red"),
        )
        .product(7, MockProduct::new(124, "G-2", "Gadget"))
        .inventory(8, "Single field")
        .extra_field(8, 20, "Only")
        .product(8, MockProduct::new(200, "S-1", "Solo"))
}

/// Serve `store` on a random local port and return its connector URL.
fn serve(store: SharedStore) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, store).await
        })
        .unwrap();
    });

    format!("http://{addr}{CONNECTOR_PATH}")
}

fn client(endpoint: &str, token: &str) -> BaselinkerClient {
    BaselinkerClient::new(&Settings::new(token, endpoint))
}

#[test]
fn read_and_update_lifecycle() {
    let store = catalogue().into_shared();
    let endpoint = serve(store.clone());
    let client = client(&endpoint, TOKEN);

    // Step 1: inventories.
    let inventories = client.list_inventories().unwrap();
    assert_eq!(inventories.len(), 2);
    assert_eq!(inventories[0].id, 7);

    // Step 2: products arrive keyed and come out as a sequence.
    let products = client.list_products(7).unwrap();
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![123, 124]);
    assert_eq!(products[0].ean, "5901234123457");
    assert_eq!(products[0].prices.first(), Some(19.9));

    // Step 3: table with both extra-field columns.
    let table = client.product_table(7).unwrap();
    assert_eq!(table.slots.second_label(), "Note");
    let widget = table.row(123).unwrap();
    assert_eq!(widget.field1.as_deref(), Some("red"));
    assert_eq!(widget.field2, None);

    // Step 4: update the second field.
    let update = client.update_second_extra_field(123, 7, "urgent").unwrap();
    assert_eq!(update.field.extra_field_id, 11);

    // Step 5: the new value is visible and the first field survived the
    // server's replace-all semantics.
    let detail = client.product_detail(123, 7).unwrap().unwrap();
    assert_eq!(detail.text_fields.extra_field(11), Some("urgent"));
    assert_eq!(detail.text_fields.extra_field(10), Some("red"));
    assert_eq!(detail.text_fields.name(), Some("Widget"));

    let guard = store.blocking_read();
    let product = guard.find_product(7, 123).unwrap();
    assert_eq!(product.text_field("extra_field_11"), Some("urgent"));
}

#[test]
fn update_preconditions_issue_no_upsert() {
    let store = catalogue().into_shared();
    let endpoint = serve(store.clone());
    let client = client(&endpoint, TOKEN);

    let err = client.update_second_extra_field(200, 8, "x").unwrap_err();
    assert!(matches!(err, ApiError::NotEnoughExtraFields { inventory_id: 8, found: 1 }));

    let err = client.update_second_extra_field(999, 7, "x").unwrap_err();
    assert!(matches!(err, ApiError::ProductNotFound { product_id: 999, .. }));

    let guard = store.blocking_read();
    assert!(!guard.calls().iter().any(|m| m == "addInventoryProduct"));
}

#[test]
fn list_shaped_details_are_keyed() {
    let store = catalogue().detail_shape(DetailShape::List).into_shared();
    let endpoint = serve(store);
    let client = client(&endpoint, TOKEN);

    let details = client.products_detailed(&[123, 124], 7).unwrap();
    let keys: Vec<&str> = details.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["123", "124"]);
    assert_eq!(details["124"].text_fields.name(), Some("Gadget"));
}

#[test]
fn bad_token_surfaces_upstream_message() {
    let endpoint = serve(catalogue().into_shared());
    let client = client(&endpoint, "wrong-token");

    let err = client.list_inventories().unwrap_err();
    match err {
        ApiError::Api { code, message } => {
            assert_eq!(code.as_deref(), Some("ERROR_BAD_TOKEN"));
            assert_eq!(message, "Invalid user token");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[test]
fn unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = client(&format!("http://127.0.0.1:{port}{CONNECTOR_PATH}"), TOKEN);

    let err = client.list_inventories().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn wrong_path_is_http_error() {
    let endpoint = serve(catalogue().into_shared());
    let client = client(&endpoint.replace(CONNECTOR_PATH, "/nope.php"), TOKEN);

    let err = client.list_inventories().unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 404, .. }));
}
