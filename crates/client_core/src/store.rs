use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Draft, Product, ProductId},
    protocol::{ProductFields, PRODUCTS_SEGMENT},
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{NetworkError, StoreOperation};

/// The remote collection of products. Every call is attempted exactly once.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Product>, NetworkError>;
    async fn create(&self, fields: &ProductFields) -> Result<Product, NetworkError>;
    async fn replace(&self, id: &ProductId, draft: &Draft) -> Result<Product, NetworkError>;
    async fn delete(&self, id: &ProductId) -> Result<(), NetworkError>;
}

pub struct HttpRemoteStore {
    http: Client,
    base_url: Url,
}

impl HttpRemoteStore {
    /// `base_url` is the API root; the `/products` collection hangs off it.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut parsed = Url::parse(base_url.trim())
            .with_context(|| format!("invalid catalog api url '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!(
                "catalog api url must use http or https, got '{}'",
                parsed.scheme()
            ));
        }
        parsed.set_query(None);
        parsed.set_fragment(None);
        parsed
            .path_segments_mut()
            .map_err(|_| anyhow!("catalog api url '{base_url}' cannot carry a path"))?
            .pop_if_empty();
        Ok(Self {
            http: Client::new(),
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn collection_url(&self) -> Url {
        self.url_with_segments(&[PRODUCTS_SEGMENT])
    }

    /// The id is pushed as a single percent-encoded segment, so `/`, `?` and
    /// `#` inside it stay part of the id.
    fn product_url(&self, id: &ProductId) -> Url {
        self.url_with_segments(&[PRODUCTS_SEGMENT, &id.0])
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) urls always have a path, checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn network(operation: StoreOperation) -> impl Fn(reqwest::Error) -> NetworkError {
    move |err| {
        warn!(%operation, error = %err, "store: request failed");
        NetworkError::new(operation, err.to_string())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_all(&self) -> Result<Vec<Product>, NetworkError> {
        let fail = network(StoreOperation::FetchAll);
        let products: Vec<Product> = self
            .http
            .get(self.collection_url())
            .send()
            .await
            .map_err(&fail)?
            .error_for_status()
            .map_err(&fail)?
            .json()
            .await
            .map_err(&fail)?;
        debug!(count = products.len(), "store: fetched products");
        Ok(products)
    }

    async fn create(&self, fields: &ProductFields) -> Result<Product, NetworkError> {
        let fail = network(StoreOperation::Create);
        let product: Product = self
            .http
            .post(self.collection_url())
            .json(fields)
            .send()
            .await
            .map_err(&fail)?
            .error_for_status()
            .map_err(&fail)?
            .json()
            .await
            .map_err(&fail)?;
        debug!(product_id = %product.id, "store: product created");
        Ok(product)
    }

    async fn replace(&self, id: &ProductId, draft: &Draft) -> Result<Product, NetworkError> {
        let fail = network(StoreOperation::Replace);
        let product: Product = self
            .http
            .put(self.product_url(id))
            .json(draft)
            .send()
            .await
            .map_err(&fail)?
            .error_for_status()
            .map_err(&fail)?
            .json()
            .await
            .map_err(&fail)?;
        debug!(product_id = %id, "store: product replaced");
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), NetworkError> {
        let fail = network(StoreOperation::Delete);
        // Response body is ignored.
        self.http
            .delete(self.product_url(id))
            .send()
            .await
            .map_err(&fail)?
            .error_for_status()
            .map_err(&fail)?;
        debug!(product_id = %id, "store: product deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
