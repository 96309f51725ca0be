use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use server_api::{create_product, delete_product, list_products, replace_product, ApiContext};
use shared::{
    domain::{Draft, Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::ProductFields,
};
use storage::Storage;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, %database_url, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/products", get(http_list_products).post(http_create_product))
        .route(
            "/products/:product_id",
            get(http_get_product)
                .put(http_replace_product)
                .delete(http_delete_product),
        )
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok("ok")
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

async fn http_list_products(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Product>> {
    list_products(&state.api)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> ApiResult<Product> {
    let id = ProductId(product_id);
    let stored = state
        .api
        .storage
        .load_product(&id)
        .await
        .map_err(|e| error_response(ApiError::new(ErrorCode::Internal, e.to_string())))?
        .ok_or_else(|| error_response(ApiError::not_found(format!("product {id} not found"))))?;
    Ok(Json(stored.product))
}

async fn http_create_product(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<ProductFields>,
) -> Result<(StatusCode, Json<Product>), (StatusCode, Json<ApiError>)> {
    let product = create_product(&state.api, &fields)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn http_replace_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    Json(draft): Json<Draft>,
) -> ApiResult<Product> {
    // The path names the record; an id inside the body is ignored.
    replace_product(&state.api, &ProductId(product_id), &draft.fields())
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_delete_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> ApiResult<Product> {
    delete_product(&state.api, &ProductId(product_id))
        .await
        .map(Json)
        .map_err(error_response)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
