//! Plain-text rendering of session snapshots and failures.

use std::fmt::Write as _;

use client_core::{CatalogSnapshot, EditorState, IntentKind, NetworkError};
use shared::domain::DraftField;

pub fn render_snapshot(snapshot: &CatalogSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Product list ({})", snapshot.products.len());
    if snapshot.products.is_empty() {
        let _ = writeln!(out, "  (empty)");
    }
    for product in &snapshot.products {
        let _ = writeln!(
            out,
            "  [{}] {}  price: {}  {}",
            product.id, product.name, product.price, product.description
        );
    }

    let title = match &snapshot.editor {
        EditorState::Closed => return out,
        EditorState::Adding { .. } => "Add product".to_string(),
        EditorState::Editing { target, .. } => format!("Edit product {target}"),
    };
    let draft = snapshot.editor.draft();
    let _ = writeln!(out, "{title}");
    for field in DraftField::ALL {
        let _ = writeln!(out, "  {:<12} {}", format!("{field}:"), draft.get(field));
    }
    let action = if snapshot.editor.edit_target().is_some() {
        "update"
    } else {
        "save"
    };
    let _ = writeln!(out, "  ('save' to {action}, 'cancel' to close)");
    out
}

pub fn render_failure(intent: IntentKind, error: &NetworkError) -> String {
    let retry = match intent {
        IntentKind::Initialize => "type 'reload' to retry",
        IntentKind::Submit => "your draft is kept; type 'save' to retry",
        IntentKind::Delete => "nothing was removed; repeat the delete to retry",
        _ => "retry the last command",
    };
    format!("! {intent} failed: {}\n  {retry}", error.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::StoreOperation;
    use shared::domain::{Draft, Product, ProductId};

    fn pen() -> Product {
        Product {
            id: ProductId::from("1"),
            name: "Pen".into(),
            price: "2".into(),
            description: "Blue pen".into(),
        }
    }

    #[test]
    fn closed_editor_renders_only_the_list() {
        let text = render_snapshot(&CatalogSnapshot {
            products: vec![pen()],
            editor: EditorState::Closed,
        });
        assert!(text.contains("[1] Pen  price: 2  Blue pen"));
        assert!(!text.contains("product 1"));
    }

    #[test]
    fn edit_mode_names_target_and_update_action() {
        let text = render_snapshot(&CatalogSnapshot {
            products: vec![pen()],
            editor: EditorState::Editing {
                target: ProductId::from("1"),
                draft: Draft::from_product(&pen()),
            },
        });
        assert!(text.contains("Edit product 1"));
        assert!(text.contains("'save' to update"));
    }

    #[test]
    fn add_mode_renders_empty_fields() {
        let text = render_snapshot(&CatalogSnapshot {
            products: Vec::new(),
            editor: EditorState::Adding {
                draft: Draft::empty(),
            },
        });
        assert!(text.contains("(empty)"));
        assert!(text.contains("Add product"));
        assert!(text.contains("'save' to save"));
    }

    #[test]
    fn failures_carry_a_retry_hint() {
        let error = NetworkError::new(StoreOperation::Create, "connection refused");
        let text = render_failure(IntentKind::Submit, &error);
        assert!(text.contains("submit failed: connection refused"));
        assert!(text.contains("type 'save' to retry"));
    }
}
