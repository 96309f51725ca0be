use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::{
    domain::{Product, ProductId},
    protocol::ProductFields,
};

const PRODUCT_COLUMNS: &str = "id, name, price, description, created_at, updated_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredProduct {
    pub product: Product,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_products(&self) -> Result<Vec<StoredProduct>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list products")?;
        Ok(rows.iter().map(stored_product_from_row).collect())
    }

    pub async fn load_product(&self, id: &ProductId) -> Result<Option<StoredProduct>> {
        let Some(row_id) = row_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to load product")?;
        Ok(row.as_ref().map(stored_product_from_row))
    }

    pub async fn insert_product(&self, fields: &ProductFields) -> Result<StoredProduct> {
        let row = sqlx::query(&format!(
            "INSERT INTO products (name, price, description) VALUES (?, ?, ?)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&fields.name)
        .bind(&fields.price)
        .bind(&fields.description)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert product")?;
        let stored = stored_product_from_row(&row);
        debug!(product_id = %stored.product.id, "storage: product inserted");
        Ok(stored)
    }

    /// Overwrites every field of an existing product. Returns `None` when no
    /// row carries `id`.
    pub async fn replace_product(
        &self,
        id: &ProductId,
        fields: &ProductFields,
    ) -> Result<Option<StoredProduct>> {
        let Some(row_id) = row_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            "UPDATE products
             SET name = ?, price = ?, description = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&fields.name)
        .bind(&fields.price)
        .bind(&fields.description)
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to replace product")?;
        Ok(row.as_ref().map(stored_product_from_row))
    }

    pub async fn delete_product(&self, id: &ProductId) -> Result<Option<StoredProduct>> {
        let Some(row_id) = row_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            "DELETE FROM products WHERE id = ? RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to delete product")?;
        Ok(row.as_ref().map(stored_product_from_row))
    }
}

// Ids are decimal renderings of the rowid; anything else cannot match a row.
fn row_id(id: &ProductId) -> Option<i64> {
    id.0.trim().parse::<i64>().ok()
}

fn stored_product_from_row(r: &SqliteRow) -> StoredProduct {
    StoredProduct {
        product: Product {
            id: ProductId(r.get::<i64, _>(0).to_string()),
            name: r.get::<String, _>(1),
            price: r.get::<String, _>(2),
            description: r.get::<String, _>(3),
        },
        created_at: r.get::<DateTime<Utc>, _>(4),
        updated_at: r.get::<DateTime<Utc>, _>(5),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
