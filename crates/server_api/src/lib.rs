use shared::{
    domain::{Product, ProductId},
    error::{ApiError, ErrorCode},
    protocol::ProductFields,
};
use storage::Storage;
use tracing::info;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_products(ctx: &ApiContext) -> Result<Vec<Product>, ApiError> {
    let products = ctx.storage.list_products().await.map_err(internal)?;
    Ok(products.into_iter().map(|stored| stored.product).collect())
}

/// Stores a new product. Field contents are taken as-is.
pub async fn create_product(ctx: &ApiContext, fields: &ProductFields) -> Result<Product, ApiError> {
    let stored = ctx
        .storage
        .insert_product(fields)
        .await
        .map_err(internal)?;
    info!(product_id = %stored.product.id, "server: product created");
    Ok(stored.product)
}

pub async fn replace_product(
    ctx: &ApiContext,
    id: &ProductId,
    fields: &ProductFields,
) -> Result<Product, ApiError> {
    let stored = ctx
        .storage
        .replace_product(id, fields)
        .await
        .map_err(internal)?
        .ok_or_else(|| product_not_found(id))?;
    info!(product_id = %id, "server: product replaced");
    Ok(stored.product)
}

pub async fn delete_product(ctx: &ApiContext, id: &ProductId) -> Result<Product, ApiError> {
    let stored = ctx
        .storage
        .delete_product(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| product_not_found(id))?;
    info!(product_id = %id, "server: product deleted");
    Ok(stored.product)
}

fn product_not_found(id: &ProductId) -> ApiError {
    ApiError::not_found(format!("product {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
