use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

async fn test_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    build_router(Arc::new(AppState {
        api: ApiContext { storage },
    }))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, bytes.to_vec())
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let app = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn create_then_list_returns_server_assigned_id() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/products",
            serde_json::json!({ "name": "Pen", "price": "2", "description": "Blue pen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let created: Product = serde_json::from_slice(&body).expect("json");
    assert!(!created.id.0.is_empty());
    assert_eq!(created.name, "Pen");

    let list = Request::get("/products").body(Body::empty()).expect("request");
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    let products: Vec<Product> = serde_json::from_slice(&body).expect("json");
    assert_eq!(products, vec![created]);
}

#[tokio::test]
async fn put_replaces_record_named_by_path() {
    let app = test_app().await;
    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/products",
            serde_json::json!({ "name": "Pen", "price": "2", "description": "Blue pen" }),
        ),
    )
    .await;
    let created: Product = serde_json::from_slice(&body).expect("json");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/products/{}", created.id),
            serde_json::json!({
                "id": "not-the-path-id",
                "name": "Pen",
                "price": "3",
                "description": "Blue pen"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: Product = serde_json::from_slice(&body).expect("json");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.price, "3");

    let fetch = Request::get(format!("/products/{}", created.id))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(&app, fetch).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Product = serde_json::from_slice(&body).expect("json");
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn unknown_product_yields_not_found_error_body() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/products/404",
            serde_json::json!({ "name": "Pen", "price": "3", "description": "Blue pen" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let err: ApiError = serde_json::from_slice(&body).expect("json");
    assert_eq!(err.code, ErrorCode::NotFound);

    let delete = Request::delete("/products/404")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_product_from_listing() {
    let app = test_app().await;
    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/products",
            serde_json::json!({ "name": "Pen", "price": "2", "description": "Blue pen" }),
        ),
    )
    .await;
    let created: Product = serde_json::from_slice(&body).expect("json");

    let delete = Request::delete(format!("/products/{}", created.id))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);
    let deleted: Product = serde_json::from_slice(&body).expect("json");
    assert_eq!(deleted, created);

    let list = Request::get("/products").body(Body::empty()).expect("request");
    let (_, body) = send(&app, list).await;
    let products: Vec<Product> = serde_json::from_slice(&body).expect("json");
    assert!(products.is_empty());
}
