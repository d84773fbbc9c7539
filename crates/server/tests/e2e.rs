use std::net::SocketAddr;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use server::routes::{self, ServerState};

struct TestApp {
    base_url: String,
    // same pool the server uses
    db: DatabaseConnection,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// Each test gets its own server and its own in-memory database.
async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    let app: Router = routes::build_router(ServerState { db: db.clone() }, CorsLayer::very_permissive());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, db })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

fn sample_product_data() -> Value {
    json!({
        "name": "Laptop",
        "category": "Electronics",
        "price": 999.99,
        "description": "High-end gaming laptop",
        "available": true
    })
}

async fn create(app: &TestApp, body: &Value) -> anyhow::Result<Value> {
    let res = client().post(app.url("/products")).json(body).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    Ok(res.json::<Value>().await?)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_create_product() -> anyhow::Result<()> {
    let app = start_server().await?;
    let data = create(&app, &sample_product_data()).await?;
    assert_eq!(data["name"], "Laptop");
    assert!(data["id"].is_i64());
    Ok(())
}

#[tokio::test]
async fn e2e_create_applies_defaults() -> anyhow::Result<()> {
    let app = start_server().await?;
    let data = create(&app, &json!({"name": "Laptop", "category": "Electronics", "price": 999.99})).await?;
    assert!(!data["id"].is_null());
    assert_eq!(data["description"], "");
    assert_eq!(data["available"], true);
    assert_eq!(data["price"], 999.99);
    Ok(())
}

#[tokio::test]
async fn e2e_create_missing_category_is_bad_request() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client()
        .post(app.url("/products"))
        .json(&json!({"name": "Laptop", "price": 999.99}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("Missing category"));
    Ok(())
}

#[tokio::test]
async fn e2e_create_rejects_malformed_bodies() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.post(app.url("/products")).json(&json!([1, 2])).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c
        .post(app.url("/products"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c
        .post(app.url("/products"))
        .json(&json!({"name": "Laptop", "category": "Electronics", "price": "a lot"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let list = c.get(app.url("/products")).send().await?.json::<Vec<Value>>().await?;
    assert!(list.is_empty());
    Ok(())
}

#[tokio::test]
async fn e2e_get_product() -> anyhow::Result<()> {
    let app = start_server().await?;
    let created = create(&app, &sample_product_data()).await?;
    let product_id = &created["id"];

    let res = client().get(app.url(&format!("/products/{}", product_id))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let data = res.json::<Value>().await?;
    assert_eq!(&data["id"], product_id);
    assert_eq!(data["name"], "Laptop");
    assert_eq!(data, created);
    Ok(())
}

#[tokio::test]
async fn e2e_get_unknown_product_is_not_found() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let res = c.get(app.url("/products/9999")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let res = c.get(app.url("/products/abc")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_update_product() -> anyhow::Result<()> {
    let app = start_server().await?;
    let created = create(&app, &sample_product_data()).await?;
    let product_id = &created["id"];

    let updated_data = json!({"name": "Gaming Laptop", "category": "Electronics", "price": 1099.99});
    let res = client()
        .put(app.url(&format!("/products/{}", product_id)))
        .json(&updated_data)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let data = res.json::<Value>().await?;
    assert_eq!(data["name"], "Gaming Laptop");
    assert_eq!(data["price"], 1099.99);
    // omitted fields keep their stored values
    assert_eq!(data["description"], "High-end gaming laptop");
    assert_eq!(&data["id"], product_id);
    Ok(())
}

#[tokio::test]
async fn e2e_update_errors() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c.put(app.url("/products/9999")).json(&json!({"name": "Nothing"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let created = create(&app, &sample_product_data()).await?;
    let res = c
        .put(app.url(&format!("/products/{}", created["id"])))
        .json(&json!({"price": -5}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.get(app.url(&format!("/products/{}", created["id"]))).send().await?;
    assert_eq!(res.json::<Value>().await?["price"], 999.99);
    Ok(())
}

#[tokio::test]
async fn e2e_delete_product() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let created = create(&app, &sample_product_data()).await?;
    let path = format!("/products/{}", created["id"]);

    let del_resp = c.delete(app.url(&path)).send().await?;
    assert_eq!(del_resp.status(), HttpStatusCode::NO_CONTENT);
    assert!(del_resp.bytes().await?.is_empty());

    let get_resp = c.get(app.url(&path)).send().await?;
    assert_eq!(get_resp.status(), HttpStatusCode::NOT_FOUND);

    // deleting again is still a success
    let again = c.delete(app.url(&path)).send().await?;
    assert_eq!(again.status(), HttpStatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn e2e_get_all_products() -> anyhow::Result<()> {
    let app = start_server().await?;
    let mut mouse = sample_product_data();
    mouse["name"] = json!("Mouse");
    mouse["price"] = json!(49.99);
    create(&app, &sample_product_data()).await?;
    create(&app, &mouse).await?;

    let resp = client().get(app.url("/products")).send().await?;
    assert_eq!(resp.status(), HttpStatusCode::OK);
    let data = resp.json::<Vec<Value>>().await?;
    assert_eq!(data.len(), 2);
    let names: Vec<&str> = data.iter().filter_map(|p| p["name"].as_str()).collect();
    assert!(names.contains(&"Laptop"));
    assert!(names.contains(&"Mouse"));
    Ok(())
}

#[tokio::test]
async fn e2e_list_filters() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    create(&app, &sample_product_data()).await?;
    create(&app, &json!({"name": "Chair", "category": "Furniture", "price": 120, "available": false})).await?;

    let data = c.get(app.url("/products?category=Furniture")).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Chair");

    let data = c.get(app.url("/products?available=true")).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Laptop");

    let res = c.get(app.url("/products?available=maybe")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<Value>().await?;
    assert!(doc["paths"]["/products/{id}"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_storage_failure_is_internal_error() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();
    let created = create(&app, &sample_product_data()).await?;
    app.db.execute_unprepared("DROP TABLE product").await?;

    let res = c.get(app.url("/products")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    let body = res.json::<Value>().await?;
    assert_eq!(body["error"], "Internal Server Error");
    assert!(!body["message"].as_str().unwrap_or_default().contains("no such table"));

    let res = c.post(app.url("/products")).json(&sample_product_data()).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json::<Value>().await?["error"], "Internal Server Error");

    let res = c.get(app.url(&format!("/products/{}", created["id"]))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
