//! Integration tests for schema introspection on SQLite.

mod common;

use common::setup_db;
use supply_console::DbError;
use supply_console::db::SchemaCatalog;
use supply_console::models::Table;

#[tokio::test]
async fn test_list_tables_includes_managed_tables() {
    let t = setup_db().await;
    let tables = SchemaCatalog::list_tables(&t.db).await.unwrap();
    for table in Table::ALL {
        assert!(
            tables.iter().any(|name| name == table.as_str()),
            "missing {} in {:?}",
            table,
            tables
        );
    }
}

#[tokio::test]
async fn test_columns_contain_primary_key() {
    let t = setup_db().await;
    for table in Table::ALL {
        let columns = SchemaCatalog::columns_info(&t.db, table).await.unwrap();
        assert!(!columns.is_empty(), "{} has no columns", table);

        let pk = SchemaCatalog::primary_key(&t.db, table)
            .await
            .unwrap()
            .expect("every managed table has a primary key");
        assert!(columns.iter().any(|c| c.name == pk), "{} lacks {}", table, pk);
    }
}

#[tokio::test]
async fn test_columns_are_in_physical_order_with_nullability() {
    let t = setup_db().await;
    let columns = SchemaCatalog::columns_info(&t.db, Table::Supplier)
        .await
        .unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        ["supplier_id", "company_name", "contact_person", "phone", "email"]
    );
    assert!(!columns[0].nullable);
    assert!(!columns[1].nullable);
    assert!(columns[4].nullable);
    assert_eq!(columns[1].declared_type, "VARCHAR(100)");
}

#[tokio::test]
async fn test_outgoing_foreign_keys() {
    let t = setup_db().await;
    let edges = SchemaCatalog::foreign_keys(&t.db, Table::Supply).await.unwrap();
    let mut pairs: Vec<(&str, &str, &str)> = edges
        .iter()
        .map(|e| {
            (
                e.child_column.as_str(),
                e.parent_table.as_str(),
                e.parent_column.as_str(),
            )
        })
        .collect();
    pairs.sort();
    assert_eq!(
        pairs,
        [
            ("product_id", "product", "product_id"),
            ("supplier_id", "supplier", "supplier_id"),
        ]
    );

    let edges = SchemaCatalog::foreign_keys(&t.db, Table::Supplier).await.unwrap();
    assert!(edges.is_empty());
}

#[tokio::test]
async fn test_referencing_keys_in_catalog_order() {
    let t = setup_db().await;
    let edges = SchemaCatalog::referencing_keys(&t.db, Table::Product, "product_id")
        .await
        .unwrap();
    let children: Vec<(&str, &str)> = edges
        .iter()
        .map(|e| (e.child_table.as_str(), e.child_column.as_str()))
        .collect();
    assert_eq!(
        children,
        [("inventory", "product_id"), ("supply", "product_id")]
    );

    let edges = SchemaCatalog::referencing_keys(&t.db, Table::Product, "category")
        .await
        .unwrap();
    assert!(edges.is_empty());
}

#[tokio::test]
async fn test_resolve_unknown_column() {
    let t = setup_db().await;
    let err = SchemaCatalog::resolve_column(&t.db, Table::Product, "price; DROP TABLE product")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UnknownColumn { .. }));
}
