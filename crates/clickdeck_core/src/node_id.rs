use std::fmt;

/// Typed identity of a node in the schema tree.
///
/// Every node has a deterministic id derived from its qualified path, so
/// selection and scroll targets can be computed without the tree in hand.
/// The rendered encoding matches what tab consumers expect: `db:<name>`,
/// `table:<db>.<table>` and `table:<db>.<table>.<column>`.
///
/// Ids are compared structurally (or by rendered string). There is
/// deliberately no `FromStr`: columns share the `table:` prefix and names
/// may contain dots, so parsing the encoding back is ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaNodeId {
    Host,
    Database {
        name: String,
    },
    Table {
        database: String,
        table: String,
    },
    Column {
        database: String,
        table: String,
        column: String,
    },
}

/// Kind enum for cheap matching without data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaNodeKind {
    Host,
    Database,
    Table,
    Column,
}

impl SchemaNodeId {
    pub fn database(name: impl Into<String>) -> Self {
        Self::Database { name: name.into() }
    }

    pub fn table(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Table {
            database: database.into(),
            table: table.into(),
        }
    }

    pub fn column(
        database: impl Into<String>,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self::Column {
            database: database.into(),
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn kind(&self) -> SchemaNodeKind {
        match self {
            Self::Host => SchemaNodeKind::Host,
            Self::Database { .. } => SchemaNodeKind::Database,
            Self::Table { .. } => SchemaNodeKind::Table,
            Self::Column { .. } => SchemaNodeKind::Column,
        }
    }
}

impl fmt::Display for SchemaNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Database { name } => write!(f, "db:{name}"),
            Self::Table { database, table } => write!(f, "table:{database}.{table}"),
            Self::Column {
                database,
                table,
                column,
            } => write!(f, "table:{database}.{table}.{column}"),
        }
    }
}
