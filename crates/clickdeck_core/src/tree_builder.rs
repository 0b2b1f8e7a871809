use crate::schema_row::SchemaRow;
use crate::tree::{ColumnNode, DatabaseNode, HostNode, TableNode, parse_enum_type};

/// Builder that groups flat introspection rows into the 4-level schema tree.
///
/// Rows arrive sorted by `(lower(database), database, table, columnName)`,
/// so grouping works by adjacency: the builder keeps a current-database and
/// a current-table cursor and finalizes each group when the key changes.
/// Call [`SchemaTreeBuilder::push_row`] once per row in input order, then
/// [`SchemaTreeBuilder::finish`] to close the trailing group.
pub struct SchemaTreeBuilder {
    host_label: String,
    databases: Vec<DatabaseNode>,
    current_database: Option<DatabaseNode>,
    current_table: Option<TableNode>,
}

impl SchemaTreeBuilder {
    pub fn new(host_label: impl Into<String>) -> Self {
        Self {
            host_label: host_label.into(),
            databases: Vec::new(),
            current_database: None,
            current_table: None,
        }
    }

    pub fn push_row(&mut self, row: &SchemaRow) {
        let database_changed = self
            .current_database
            .as_ref()
            .is_none_or(|db| db.name != row.database);

        if database_changed {
            self.finalize_table();
            self.finalize_database();
            self.current_database = Some(DatabaseNode {
                name: row.database.clone(),
                engine: non_empty(row.db_engine.as_deref()),
                comment: non_empty(row.db_comment.as_deref()),
                tables: Vec::new(),
                has_distributed_table: false,
                has_replicated_table: false,
            });
        } else if let Some(db) = self.current_database.as_mut() {
            // Some producers carry the engine/comment only on a subset of a
            // group's rows; fill in blanks but never overwrite with NULL.
            if db.engine.is_none() {
                db.engine = non_empty(row.db_engine.as_deref());
            }
            if db.comment.is_none() {
                db.comment = non_empty(row.db_comment.as_deref());
            }
        }

        let table_changed = match (&row.table, &self.current_table) {
            (None, None) => false,
            (Some(name), Some(table)) => *name != table.name,
            _ => true,
        };

        if table_changed {
            self.finalize_table();
            if let Some(name) = &row.table {
                self.current_table = Some(TableNode {
                    database: row.database.clone(),
                    name: name.clone(),
                    engine: non_empty(row.table_engine.as_deref()),
                    comment: non_empty(row.table_comment.as_deref()),
                    columns: Vec::new(),
                });
            }
        } else if let Some(table) = self.current_table.as_mut() {
            if table.engine.is_none() {
                table.engine = non_empty(row.table_engine.as_deref());
            }
            if table.comment.is_none() {
                table.comment = non_empty(row.table_comment.as_deref());
            }
        }

        // An empty column name counts as absent, same as NULL; the server
        // never emits one.
        if let Some(column) = non_empty(row.column_name.as_deref()) {
            match self.current_table.as_mut() {
                Some(table) => {
                    let type_name = row.column_type.clone().unwrap_or_default();
                    table.columns.push(ColumnNode {
                        database: row.database.clone(),
                        table: table.name.clone(),
                        name: column,
                        enum_type: parse_enum_type(&type_name),
                        type_name,
                        comment: non_empty(row.column_comment.as_deref()),
                    });
                }
                None => {
                    log::debug!(
                        "skipping column row {}.{column} with no open table cursor",
                        row.database
                    );
                }
            }
        }
    }

    pub fn finish(mut self) -> HostNode {
        self.finalize_table();
        self.finalize_database();
        HostNode {
            label: self.host_label,
            databases: self.databases,
        }
    }

    fn finalize_table(&mut self) {
        let Some(table) = self.current_table.take() else {
            return;
        };
        match self.current_database.as_mut() {
            Some(db) => {
                if let Some(engine) = table.engine.as_deref() {
                    if engine == "Distributed" {
                        db.has_distributed_table = true;
                    }
                    if engine.starts_with("Replicated") {
                        db.has_replicated_table = true;
                    }
                }
                db.tables.push(table);
            }
            None => {
                log::warn!(
                    "dropping table {}.{} with no open database cursor",
                    table.database,
                    table.name
                );
            }
        }
    }

    fn finalize_database(&mut self) {
        let Some(db) = self.current_database.take() else {
            return;
        };
        // The system database is pinned to the front of the host's children;
        // all other databases keep input order.
        if db.name == "system" {
            self.databases.insert(0, db);
        } else {
            self.databases.push(db);
        }
    }
}

/// Groups a sorted flat result set into the host/database/table/column tree.
///
/// The tree is rebuilt wholesale on every load; there is no incremental
/// patching.
pub fn build_tree(host_label: impl Into<String>, rows: &[SchemaRow]) -> HostNode {
    let mut builder = SchemaTreeBuilder::new(host_label);
    for row in rows {
        builder.push_row(row);
    }
    builder.finish()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    match value {
        Some(s) if !s.is_empty() => Some(s.to_string()),
        _ => None,
    }
}
