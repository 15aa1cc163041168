//! Browser table editor for the second extra field.
//!
//! Serves one HTML page plus a small JSON API over `BaselinkerClient`. The
//! client is blocking, so every call runs on the blocking pool. Nothing is
//! written upstream until the page posts the reviewed change list to
//! `/apply`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use baselinker_core::{
    diff_field2, ApiError, BaselinkerClient, EditedValue, FieldChange, Inventory, ProductRow,
    ProductTable, Transport,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared handle to the client.
pub struct AppState<T> {
    client: Arc<BaselinkerClient<T>>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<T: Transport + Send + Sync + 'static> AppState<T> {
    pub fn new(client: BaselinkerClient<T>) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Run a blocking client call off the async workers.
    async fn run<R, F>(&self, call: F) -> Result<R, WebError>
    where
        F: FnOnce(&BaselinkerClient<T>) -> Result<R, ApiError> + Send + 'static,
        R: Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| WebError::Internal(e.to_string()))?
            .map_err(WebError::Api)
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::Api(ApiError::NotEnoughExtraFields { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Api(ApiError::ProductNotFound { .. }) => StatusCode::NOT_FOUND,
            WebError::Api(_) => StatusCode::BAD_GATEWAY,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(status = %status, error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub original: Vec<ProductRow>,
    pub edited: Vec<EditedValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyRequest {
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowResult {
    pub product_id: i64,
    pub ok: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyReport {
    pub total: usize,
    pub updated: usize,
    pub results: Vec<RowResult>,
}

pub fn app<T: Transport + Send + Sync + 'static>(client: BaselinkerClient<T>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/inventories", get(list_inventories::<T>))
        .route("/api/inventories/{id}/products", get(product_table::<T>))
        .route("/api/inventories/{id}/changes", post(review_changes))
        .route("/api/inventories/{id}/apply", post(apply_changes::<T>))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(client))
}

pub async fn run<T: Transport + Send + Sync + 'static>(
    listener: TcpListener,
    client: BaselinkerClient<T>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app(client)).await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_inventories<T: Transport + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<Inventory>>, WebError> {
    state.run(|client| client.list_inventories()).await.map(Json)
}

async fn product_table<T: Transport + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    Path(inventory_id): Path<i64>,
) -> Result<Json<ProductTable>, WebError> {
    state
        .run(move |client| client.editable_product_table(inventory_id))
        .await
        .map(Json)
}

async fn review_changes(Json(request): Json<ReviewRequest>) -> Json<Vec<FieldChange>> {
    Json(diff_field2(&request.original, &request.edited))
}

async fn apply_changes<T: Transport + Send + Sync + 'static>(
    State(state): State<AppState<T>>,
    Path(inventory_id): Path<i64>,
    Json(request): Json<ApplyRequest>,
) -> Result<Json<ApplyReport>, WebError> {
    let report = state
        .run(move |client| {
            let results: Vec<RowResult> = request
                .changes
                .iter()
                .map(|change| {
                    match client.update_second_extra_field(
                        change.product_id,
                        inventory_id,
                        &change.new_value,
                    ) {
                        Ok(_) => RowResult {
                            product_id: change.product_id,
                            ok: true,
                            error: None,
                        },
                        Err(e) => RowResult {
                            product_id: change.product_id,
                            ok: false,
                            error: Some(e.to_string()),
                        },
                    }
                })
                .collect();
            Ok(ApplyReport {
                total: results.len(),
                updated: results.iter().filter(|r| r.ok).count(),
                results,
            })
        })
        .await?;
    tracing::info!(inventory_id, total = report.total, updated = report.updated, "changes applied");
    Ok(Json(report))
}
