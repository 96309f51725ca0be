use std::fmt;

use shared::domain::{DraftField, ProductId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    FetchAll,
    Create,
    Replace,
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreOperation::FetchAll => "fetch_all",
            StoreOperation::Create => "create",
            StoreOperation::Replace => "replace",
            StoreOperation::Delete => "delete",
        })
    }
}

/// Any failed remote store call: transport failure, non-success status and
/// malformed response bodies all land here.
#[derive(Debug, Clone, Error)]
#[error("{operation} request failed: {message}")]
pub struct NetworkError {
    operation: StoreOperation,
    message: String,
}

impl NetworkError {
    pub fn new(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    pub fn operation(&self) -> StoreOperation {
        self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("editor is not open")]
    EditorClosed,
    #[error("draft is incomplete: {0} is required")]
    IncompleteDraft(DraftField),
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),
    #[error(transparent)]
    Network(#[from] NetworkError),
}
