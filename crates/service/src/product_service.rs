use models::Product;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;

/// Optional list filters. When several are set, `name` wins over `category`,
/// which wins over `available`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub category: Option<String>,
    pub available: Option<bool>,
}

/// List products, optionally narrowed by one filter.
pub async fn list_products(db: &DatabaseConnection, filter: ProductFilter) -> Result<Vec<Product>, ServiceError> {
    let rows = if let Some(name) = filter.name.as_deref() {
        Product::find_by_name(db, name).await?
    } else if let Some(category) = filter.category.as_deref() {
        Product::find_by_category(db, category).await?
    } else if let Some(available) = filter.available {
        Product::find_by_availability(db, available).await?
    } else {
        Product::all(db).await?
    };
    Ok(rows)
}

/// Validate an untyped payload and store it as a new product.
#[instrument(skip_all)]
pub async fn create_product(db: &DatabaseConnection, payload: &Value) -> Result<Product, ServiceError> {
    let mut product = Product::new();
    product.deserialize(payload)?;
    product.create(db).await?;
    Ok(product)
}

/// Get a product by id.
pub async fn get_product(db: &DatabaseConnection, id: i32) -> Result<Option<Product>, ServiceError> {
    Ok(Product::find(db, id).await?)
}

/// Merge the supplied fields into an existing product; omitted fields keep
/// their stored value.
#[instrument(skip(db, payload))]
pub async fn update_product(db: &DatabaseConnection, id: i32, payload: &Value) -> Result<Product, ServiceError> {
    let Some(mut product) = Product::find(db, id).await? else {
        return Err(ServiceError::not_found("product"));
    };
    product.deserialize_partial(payload)?;
    product.update(db).await?;
    Ok(product)
}

/// Delete a product; returns true if a record existed.
pub async fn delete_product(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let product = Product {
        id: Some(id),
        ..Product::default()
    };
    let deleted = product.delete(db).await?;
    if !deleted {
        info!(id, "delete of absent product ignored");
    }
    Ok(deleted)
}
