//! Scripted sessions driving the interactive console end to end.

mod common;

use common::{add_product, add_supplier, add_supply, count_rows, int, setup_db};
use std::io::Cursor;
use supply_console::Console;
use supply_console::console::{LinePrompt, OutputFormat, TerminalRenderer};
use supply_console::db::{CrudExecutor, DataGenerator, Database};
use supply_console::models::{Table, Value};

type ScriptedConsole = Console<LinePrompt<Cursor<String>, Vec<u8>>, TerminalRenderer<Vec<u8>>>;

fn console(db: Database, script: &str) -> ScriptedConsole {
    Console::new(
        LinePrompt::new(Cursor::new(script.to_string()), Vec::new()),
        TerminalRenderer::new(Vec::new(), OutputFormat::Table),
        db,
    )
    .with_generator(DataGenerator::with_seed(11))
}

/// Run the session and return what was rendered, plus the database handle.
async fn run(mut console: ScriptedConsole) -> (String, Database) {
    console.run().await.unwrap();
    let (_, renderer, db) = console.into_parts();
    (String::from_utf8(renderer.into_inner()).unwrap(), db)
}

#[tokio::test]
async fn test_end_of_input_ends_session() {
    let t = setup_db().await;
    let (output, _db) = run(console(t.db, "1\n")).await;
    assert!(output.contains("Database tables:"));
    assert!(output.contains(" - supplier"));
    assert!(output.ends_with("[INFO] Goodbye!\n"));
}

#[tokio::test]
async fn test_unknown_table_is_reported() {
    let t = setup_db().await;
    let (output, _db) = run(console(t.db, "2\nwarehouse\n0\n")).await;
    assert!(output.contains("[ERROR] Unknown table 'warehouse'"));
    assert!(output.contains("Goodbye!"));
}

#[tokio::test]
async fn test_invalid_field_re_prompts_whole_record() {
    let t = setup_db().await;
    // product_name, unit_measure, min_stock, category; the bad min_stock restarts at product_name.
    let script = "4\nproduct\nPaper\npack\nlots\ny\nPaper A4\npack\n10\nStationery\n0\n";
    let (output, db) = run(console(t.db, script)).await;

    assert!(output.contains("[ERROR] min_stock: expected integer"));
    assert!(output.contains("[OK] Record added."));

    let rows = CrudExecutor::new()
        .select_all(&db, Table::Product, None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("product_name"), Some(&Value::from("Paper A4")));
    assert_eq!(int(&rows[0], "min_stock"), 10);
}

#[tokio::test]
async fn test_record_input_gives_up_after_max_attempts() {
    let t = setup_db().await;
    let script = "4\nproduct\nPaper\npcs\nx\ny\nPaper\npcs\nx\n0\n";
    let console = console(t.db, script).with_max_input_attempts(2);
    let (output, db) = run(console).await;

    assert!(output.contains("[ERROR] Too many invalid attempts."));
    assert!(output.contains("[INFO] Cancelled."));
    assert_eq!(count_rows(&db, Table::Product).await, 0);
}

#[tokio::test]
async fn test_operator_can_abort_record_input() {
    let t = setup_db().await;
    let script = "4\nsupplier\n\nn\n0\n";
    let (output, db) = run(console(t.db, script)).await;

    assert!(output.contains("[ERROR] Field company_name cannot be empty"));
    assert!(output.contains("[INFO] Cancelled."));
    assert_eq!(count_rows(&db, Table::Supplier).await, 0);
}

#[tokio::test]
async fn test_insert_with_missing_parent_is_rejected() {
    let t = setup_db().await;
    add_product(&t.db, 1, 10).await;
    // supplier_id, product_id, supply_date, document_number, quantity, unit_price
    let script = "4\nsupply\n999\n1\n2024-03-01\n\n5\n10.50\n0\n";
    let (output, db) = run(console(t.db, script)).await;

    assert!(output.contains("[ERROR] supplier_id=999 does not exist in supplier"));
    assert_eq!(count_rows(&db, Table::Supply).await, 0);
}

#[tokio::test]
async fn test_update_without_changes() {
    let t = setup_db().await;
    add_product(&t.db, 7, 10).await;
    let script = "5\nproduct\n7\n\n\n\n\n0\n";
    let (output, _db) = run(console(t.db, script)).await;

    assert!(output.contains("Product 7"));
    assert!(output.contains("[INFO] Nothing changed."));
    assert!(!output.contains("[OK]"));
}

#[tokio::test]
async fn test_update_keeps_untouched_fields() {
    let t = setup_db().await;
    add_product(&t.db, 7, 10).await;
    let script = "5\nproduct\n7\n\n\n25\n\n0\n";
    let (output, db) = run(console(t.db, script)).await;
    assert!(output.contains("[OK] Record updated."));

    let row = CrudExecutor::new()
        .select_by_primary_key(&db, Table::Product, "product_id", &Value::Int(7))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(int(&row, "min_stock"), 25);
    assert_eq!(row.get("unit_measure"), Some(&Value::from("pcs")));
}

#[tokio::test]
async fn test_show_missing_record() {
    let t = setup_db().await;
    let (output, _db) = run(console(t.db, "3\nsupplier\n999\n0\n")).await;
    assert!(output.contains("Record not found."));
    assert!(!output.contains("[ERROR]"));
}

#[tokio::test]
async fn test_primary_key_input_is_typed() {
    let t = setup_db().await;
    let (output, _db) = run(console(t.db, "3\nsupplier\nabc\n0\n")).await;
    assert!(output.contains("[ERROR] supplier_id: expected integer"));
}

#[tokio::test]
async fn test_delete_blocked_by_dependents() {
    let t = setup_db().await;
    add_supplier(&t.db, 1).await;
    add_product(&t.db, 1, 10).await;
    add_supply(&t.db, 1, 1, 1).await;
    let (output, db) = run(console(t.db, "6\nproduct\n1\n0\n")).await;

    assert!(output.contains(
        "[ERROR] Cannot delete from 'product': dependent rows exist in supply.product_id"
    ));
    assert_eq!(count_rows(&db, Table::Product).await, 1);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let t = setup_db().await;
    add_supplier(&t.db, 1).await;
    add_supplier(&t.db, 2).await;
    let script = "6\nsupplier\n1\nn\n6\nsupplier\n2\nyes\n0\n";
    let (output, db) = run(console(t.db, script)).await;

    assert!(output.contains("[INFO] Cancelled."));
    assert!(output.contains("[OK] Record deleted."));
    let rows = CrudExecutor::new()
        .select_all(&db, Table::Supplier, None)
        .await
        .unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| int(r, "supplier_id")).collect();
    assert_eq!(ids, [1]);
}

#[tokio::test]
async fn test_check_child_rows() {
    let t = setup_db().await;
    add_supplier(&t.db, 1).await;
    add_supplier(&t.db, 2).await;
    add_product(&t.db, 1, 10).await;
    add_supply(&t.db, 1, 1, 1).await;
    let script = "9\nsupplier\n1\n9\nsupplier\n2\n0\n";
    let (output, _db) = run(console(t.db, script)).await;

    assert!(output.contains("[INFO] Child rows exist."));
    assert!(output.contains("[INFO] No child rows."));
}

#[tokio::test]
async fn test_generate_then_report() {
    let t = setup_db().await;
    let script = "7\n3\n8\n1\n0\n";
    let (output, db) = run(console(t.db, script)).await;

    assert!(output.contains("[OK] supplier: inserted 3 rows starting at id 1"));
    assert!(output.contains("[OK] inventory: inserted 3 rows starting at id 1"));
    assert!(output.contains("=== Total supply value per supplier ==="));
    assert!(output.contains("Execution time:"));
    for table in Table::ALL {
        assert_eq!(count_rows(&db, table).await, 3);
    }
}

#[tokio::test]
async fn test_generate_rejects_bad_count() {
    let t = setup_db().await;
    let (output, db) = run(console(t.db, "7\nmany\n7\n0\n0\n")).await;
    assert!(output.contains("[ERROR] Invalid input: 'many' is not a positive number of rows"));
    assert!(output.contains("[ERROR] Invalid input: '0' is not a positive number of rows"));
    assert_eq!(count_rows(&db, Table::Supplier).await, 0);
}
