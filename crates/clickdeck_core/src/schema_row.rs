use serde::{Deserialize, Serialize};

/// One row of the flat schema introspection result.
///
/// The introspection query emits one row per column, left-joined so that a
/// database without tables (or a table without columns) still produces a row
/// with `NULL` in the child fields. Rows arrive pre-sorted by
/// `(lower(database), database, table, columnName)`.
///
/// Some producers only populate the database/table engine and comment on a
/// subset of a group's rows; the tree builder fills in whatever it sees
/// first and never lets a later `NULL` blank out a captured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRow {
    pub database: String,

    #[serde(default)]
    pub db_engine: Option<String>,

    #[serde(default)]
    pub db_comment: Option<String>,

    #[serde(default)]
    pub table: Option<String>,

    #[serde(default)]
    pub table_engine: Option<String>,

    #[serde(default)]
    pub table_comment: Option<String>,

    #[serde(default)]
    pub column_name: Option<String>,

    #[serde(default)]
    pub column_type: Option<String>,

    #[serde(default)]
    pub column_comment: Option<String>,
}
