use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use models::Product;
use serde::Deserialize;
use serde_json::Value;
use service::product_service::{self, ProductFilter};
use tracing::info;

use crate::{errors::JsonApiError, routes::ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Exact product name
    pub name: Option<String>,
    /// Exact category
    pub category: Option<String>,
    pub available: Option<bool>,
}

impl From<ListQuery> for ProductFilter {
    fn from(q: ListQuery) -> Self {
        ProductFilter {
            name: q.name,
            category: q.category,
            available: q.available,
        }
    }
}

// Ids that are not integers can never match a row.
fn parse_id(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

fn not_found(raw: &str) -> JsonApiError {
    JsonApiError::not_found(format!("Product with id '{raw}' was not found."))
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, JsonApiError> {
    body.map(|Json(v)| v).map_err(|e| JsonApiError::bad_request(e.body_text()))
}

#[utoipa::path(
    get, path = "/products", tag = "products",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::ProductDoc]),
        (status = 400, description = "Invalid Query", body = crate::openapi::ErrorDoc),
        (status = 500, description = "List Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>, JsonApiError> {
    let Query(q) = query.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let rows = product_service::list_products(&state.db, q.into()).await?;
    info!(count = rows.len(), "list products");
    Ok(Json(rows.iter().map(Product::serialize).collect()))
}

#[utoipa::path(
    post, path = "/products", tag = "products",
    request_body = crate::openapi::ProductInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Create Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let payload = json_body(body)?;
    let product = product_service::create_product(&state.db, &payload).await?;
    info!(id = ?product.id, name = %product.name, category = %product.category, "created product");
    Ok((StatusCode::CREATED, Json(product.serialize())))
}

#[utoipa::path(
    get, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(raw): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    let id = parse_id(&raw).ok_or_else(|| not_found(&raw))?;
    match product_service::get_product(&state.db, id).await? {
        Some(product) => Ok(Json(product.serialize())),
        None => Err(not_found(&raw)),
    }
}

#[utoipa::path(
    put, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = crate::openapi::ProductUpdateDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Update Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(raw): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let id = parse_id(&raw).ok_or_else(|| not_found(&raw))?;
    let payload = json_body(body)?;
    let product = product_service::update_product(&state.db, id, &payload)
        .await
        .map_err(|e| match e {
            service::errors::ServiceError::NotFound(_) => not_found(&raw),
            e => e.into(),
        })?;
    info!(id, "updated product");
    Ok(Json(product.serialize()))
}

#[utoipa::path(
    delete, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted, or already absent"),
        (status = 500, description = "Delete Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    if let Some(id) = parse_id(&raw) {
        let existed = product_service::delete_product(&state.db, id).await?;
        info!(id, existed, "delete product");
    }
    Ok(StatusCode::NO_CONTENT)
}
