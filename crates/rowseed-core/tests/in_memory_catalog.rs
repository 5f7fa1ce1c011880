use rowseed_core::{
    AssociationSpec, BelongsToSpec, ColumnKind, ColumnSpec, Eligibility, Error, InMemoryCatalog,
    SchemaCatalog, TableRef, Value,
};

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_table(
            "orders",
            vec![
                ColumnSpec::new("id", ColumnKind::Integer).not_null(),
                ColumnSpec::new("order_kind", ColumnKind::Text),
            ],
        )
        .with_primary_key("orders", &["id"])
        .with_key_values("orders", "id", vec![Value::Int(1), Value::Int(2)])
        .with_filtered_key_values("orders", "id", "order_kind = 'phone'", vec![Value::Int(2)])
        .with_table("payments", vec![ColumnSpec::new("order_id", ColumnKind::Integer)])
        .with_association(
            "payments",
            AssociationSpec::BelongsTo(BelongsToSpec::new(
                "order_id",
                TableRef::parse("orders"),
                "id",
            )),
        )
}

#[tokio::test]
async fn primary_key_values_respect_eligibility() {
    let catalog = catalog();
    let orders = TableRef::parse("orders");

    let all = catalog
        .primary_key_values(&orders, None)
        .await
        .expect("all keys");
    assert_eq!(all, vec![Value::Int(1), Value::Int(2)]);

    let phone = catalog
        .primary_key_values(&orders, Some(&Eligibility::new("order_kind = 'phone'")))
        .await
        .expect("filtered keys");
    assert_eq!(phone, vec![Value::Int(2)]);
}

#[tokio::test]
async fn unqualified_and_public_names_resolve_to_the_same_table() {
    let catalog = catalog();
    let columns = catalog
        .columns(&TableRef::parse("public.orders"))
        .await
        .expect("columns");
    assert_eq!(columns.len(), 2);
}

#[tokio::test]
async fn missing_primary_key_is_reported() {
    let catalog = catalog();
    let result = catalog
        .primary_key_values(&TableRef::parse("payments"), None)
        .await;
    assert!(matches!(result, Err(Error::InvalidSchema(_))));
}
