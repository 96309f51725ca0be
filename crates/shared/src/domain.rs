use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::protocol::ProductFields;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(ProductId);

/// A record owned by the remote store. `id` is assigned on creation and never
/// rewritten by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub description: String,
}

/// Working copy of a product behind the editor. `id` is present only when the
/// draft was seeded from an existing product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    pub price: String,
    pub description: String,
}

impl Draft {
    pub const fn empty() -> Self {
        Self {
            id: None,
            name: String::new(),
            price: String::new(),
            description: String::new(),
        }
    }

    pub fn from_product(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            price: product.price.clone(),
            description: product.description.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Price => &self.price,
            DraftField::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Name => self.name = value,
            DraftField::Price => self.price = value,
            DraftField::Description => self.description = value,
        }
    }

    /// First required field left empty, in form order. Whitespace counts as a value.
    pub fn first_missing_field(&self) -> Option<DraftField> {
        DraftField::ALL
            .into_iter()
            .find(|field| self.get(*field).is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing_field().is_none()
    }

    /// Field values without the id, as sent on create.
    pub fn fields(&self) -> ProductFields {
        ProductFields {
            name: self.name.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Price,
    Description,
}

impl DraftField {
    pub const ALL: [DraftField; 3] = [DraftField::Name, DraftField::Price, DraftField::Description];

    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Name => "name",
            DraftField::Price => "price",
            DraftField::Description => "description",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DraftField::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown field '{s}' (expected name, price or description)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen() -> Product {
        Product {
            id: ProductId::from("1"),
            name: "Pen".into(),
            price: "2".into(),
            description: "Blue pen".into(),
        }
    }

    #[test]
    fn product_uses_plain_string_id_on_the_wire() {
        let json = serde_json::to_value(pen()).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "name": "Pen",
                "price": "2",
                "description": "Blue pen"
            })
        );
    }

    #[test]
    fn product_ignores_extra_server_fields() {
        let product: Product = serde_json::from_str(
            r#"{"createdAt":"2025-08-16T05:00:00.000Z","name":"Pen","price":"2","description":"Blue pen","id":"1"}"#,
        )
        .expect("deserialize");
        assert_eq!(product, pen());
    }

    #[test]
    fn draft_without_id_omits_it_when_serialized() {
        let mut draft = Draft::empty();
        draft.set(DraftField::Name, "Pen");
        let json = serde_json::to_value(&draft).expect("serialize");
        assert!(json.get("id").is_none());
        assert_eq!(json["name"], "Pen");
    }

    #[test]
    fn draft_seeded_from_product_keeps_its_id() {
        let draft = Draft::from_product(&pen());
        assert_eq!(draft.id, Some(ProductId::from("1")));
        assert!(draft.is_complete());
        assert_eq!(draft.fields().name, "Pen");
    }

    #[test]
    fn empty_fields_are_reported_in_form_order() {
        let mut draft = Draft::empty();
        assert_eq!(draft.first_missing_field(), Some(DraftField::Name));
        draft.set(DraftField::Name, "Pen");
        assert_eq!(draft.first_missing_field(), Some(DraftField::Price));
        draft.set(DraftField::Price, "   ");
        assert_eq!(draft.first_missing_field(), Some(DraftField::Description));
        draft.set(DraftField::Price, "2");
        draft.set(DraftField::Description, "Blue pen");
        assert!(draft.is_complete());
        assert!(!draft.is_empty());
    }

    #[test]
    fn draft_field_parses_case_insensitively() {
        assert_eq!("Price".parse::<DraftField>(), Ok(DraftField::Price));
        assert!("colour".parse::<DraftField>().is_err());
    }
}
