//! Integration tests for parameterized CRUD on SQLite.

mod common;

use common::{add_product, add_supplier, count_rows, int, setup_db};
use supply_console::DbError;
use supply_console::db::CrudExecutor;
use supply_console::models::{RowData, Table, Value};

#[tokio::test]
async fn test_select_by_primary_key_hit_and_miss() {
    let t = setup_db().await;
    add_supplier(&t.db, 1).await;
    let executor = CrudExecutor::new();

    let row = executor
        .select_by_primary_key(&t.db, Table::Supplier, "supplier_id", &Value::Int(1))
        .await
        .unwrap()
        .expect("supplier 1 exists");
    assert_eq!(int(&row, "supplier_id"), 1);
    assert_eq!(row.get("company_name"), Some(&Value::from("Company 1")));
    assert_eq!(row.get("email"), Some(&Value::Null));

    let missing = executor
        .select_by_primary_key(&t.db, Table::Supplier, "supplier_id", &Value::Int(999))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_select_all_orders_and_limits() {
    let t = setup_db().await;
    for id in [5, 2, 9, 1] {
        add_product(&t.db, id, 10).await;
    }

    let rows = CrudExecutor::new()
        .select_all(&t.db, Table::Product, None)
        .await
        .unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| int(r, "product_id")).collect();
    assert_eq!(ids, [1, 2, 5, 9]);

    let rows = CrudExecutor::with_row_limit(2)
        .select_all(&t.db, Table::Product, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let rows = CrudExecutor::new()
        .select_all(&t.db, Table::Product, Some(3))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_empty_update_is_a_no_op() {
    let t = setup_db().await;
    add_product(&t.db, 7, 10).await;

    let affected = CrudExecutor::new()
        .update(&t.db, Table::Product, "product_id", &Value::Int(7), &RowData::new())
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_update_changes_only_given_columns() {
    let t = setup_db().await;
    add_product(&t.db, 7, 10).await;
    let executor = CrudExecutor::new();

    let changes = RowData::new().with("min_stock", 25i64);
    let affected = executor
        .update(&t.db, Table::Product, "product_id", &Value::Int(7), &changes)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let row = executor
        .select_by_primary_key(&t.db, Table::Product, "product_id", &Value::Int(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(int(&row, "min_stock"), 25);
    assert_eq!(row.get("product_name"), Some(&Value::from("Product 7")));
}

#[tokio::test]
async fn test_delete_removes_row() {
    let t = setup_db().await;
    add_supplier(&t.db, 1).await;
    add_supplier(&t.db, 2).await;

    let affected = CrudExecutor::new()
        .delete(&t.db, Table::Supplier, "supplier_id", &Value::Int(2))
        .await
        .unwrap();
    assert_eq!(affected, 1);
    assert_eq!(count_rows(&t.db, Table::Supplier).await, 1);
}

#[tokio::test]
async fn test_unknown_column_rejected_before_sql() {
    let t = setup_db().await;
    let row = RowData::new()
        .with("product_name", "Paper")
        .with("unit_measure\" = 1; --", "pcs");

    let err = CrudExecutor::new()
        .insert(&t.db, Table::Product, &row)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::UnknownColumn { .. }));
    assert_eq!(count_rows(&t.db, Table::Product).await, 0);
}

#[tokio::test]
async fn test_backend_error_is_verbatim() {
    let t = setup_db().await;
    add_supplier(&t.db, 1).await;

    let duplicate = RowData::new()
        .with("supplier_id", 1i64)
        .with("company_name", "Again");
    let err = CrudExecutor::new()
        .insert(&t.db, Table::Supplier, &duplicate)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Database { .. }));
    assert!(err.to_string().contains("UNIQUE constraint failed"));
}
