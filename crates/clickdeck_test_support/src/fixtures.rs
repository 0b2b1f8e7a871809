use clickdeck_core::SchemaRow;

/// Row for a database with no tables (NULL children).
pub fn db_row(database: impl Into<String>, engine: impl Into<String>) -> SchemaRow {
    SchemaRow {
        database: database.into(),
        db_engine: Some(engine.into()),
        db_comment: None,
        table: None,
        table_engine: None,
        table_comment: None,
        column_name: None,
        column_type: None,
        column_comment: None,
    }
}

/// Row for a table with no columns (NULL column fields).
pub fn table_row(
    database: impl Into<String>,
    table: impl Into<String>,
    engine: impl Into<String>,
) -> SchemaRow {
    SchemaRow {
        table: Some(table.into()),
        table_engine: Some(engine.into()),
        ..db_row(database, "Atomic")
    }
}

/// Full column row, engine duplicated onto the row like the real query does.
pub fn column_row(
    database: impl Into<String>,
    table: impl Into<String>,
    engine: impl Into<String>,
    column: impl Into<String>,
    column_type: impl Into<String>,
) -> SchemaRow {
    SchemaRow {
        column_name: Some(column.into()),
        column_type: Some(column_type.into()),
        ..table_row(database, table, engine)
    }
}

/// A small two-database row set (with `system` deliberately last) for tests
/// that need a realistic pre-sorted input.
pub fn sample_rows() -> Vec<SchemaRow> {
    vec![
        column_row("sales", "orders", "MergeTree", "id", "UInt64"),
        column_row(
            "sales",
            "orders",
            "MergeTree",
            "status",
            "Enum8('new' = 1, 'done' = 2)",
        ),
        column_row("sales", "orders_all", "Distributed", "id", "UInt64"),
        column_row("system", "tables", "SystemTables", "name", "String"),
    ]
}

/// Wraps rows in the `FORMAT JSON` envelope the executor returns.
pub fn rows_body(rows: &[SchemaRow]) -> serde_json::Value {
    serde_json::json!({
        "data": rows,
        "rows": rows.len(),
    })
}
