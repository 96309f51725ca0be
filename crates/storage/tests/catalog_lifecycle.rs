use shared::{domain::ProductId, protocol::ProductFields};
use storage::Storage;

#[tokio::test]
async fn product_lifecycle_round_trips_through_sqlite() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let created = storage
        .insert_product(&ProductFields {
            name: "Pen".into(),
            price: "2".into(),
            description: "Blue pen".into(),
        })
        .await
        .expect("insert");
    assert!(created.created_at <= created.updated_at);

    let replaced = storage
        .replace_product(
            &created.product.id,
            &ProductFields {
                name: "Pen".into(),
                price: "3".into(),
                description: "Blue pen".into(),
            },
        )
        .await
        .expect("replace")
        .expect("row exists");
    assert_eq!(replaced.product.price, "3");
    assert_eq!(replaced.created_at, created.created_at);

    storage
        .delete_product(&created.product.id)
        .await
        .expect("delete")
        .expect("row existed");
    assert!(storage.list_products().await.expect("list").is_empty());
    assert!(storage
        .load_product(&ProductId(created.product.id.0.clone()))
        .await
        .expect("load")
        .is_none());
}
