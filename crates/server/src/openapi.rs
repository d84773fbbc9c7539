use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Stored product as returned by every product route.
#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub available: bool,
}

#[derive(ToSchema)]
pub struct ProductInputDoc {
    pub name: String,
    pub category: String,
    pub price: f64,
    /// Defaults to ""
    pub description: Option<String>,
    /// Defaults to true
    pub available: Option<bool>,
}

/// Only the supplied fields change.
#[derive(ToSchema)]
pub struct ProductUpdateDoc {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub error: String,
    pub message: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::list,
        crate::routes::products::create,
        crate::routes::products::get,
        crate::routes::products::update,
        crate::routes::products::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ProductDoc,
            ProductInputDoc,
            ProductUpdateDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products")
    )
)]
pub struct ApiDoc;
