use serde::{Deserialize, Serialize};

/// Path segment of the product collection under the API root.
pub const PRODUCTS_SEGMENT: &str = "products";

/// Product fields without an id: the body of a create request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
    pub name: String,
    pub price: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_ignores_client_supplied_id() {
        let fields: ProductFields =
            serde_json::from_str(r#"{"id":"9","name":"Pen","price":"2","description":"Blue"}"#)
                .expect("deserialize");
        assert_eq!(fields.name, "Pen");
    }
}
