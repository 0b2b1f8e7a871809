use serde::{Deserialize, Serialize};

use crate::node_id::SchemaNodeId;

/// Payload of one workspace tab, tagged by view type.
///
/// The `id` is the de-duplication key across a workspace: opening a payload
/// whose id is already present activates the existing tab instead of
/// inserting a duplicate. Context-derived tabs (table, database, ...) build
/// their ids from the qualified path so the same object always maps to the
/// same tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TabPayload {
    Query {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sql: Option<String>,
    },
    Table {
        id: String,
        database: String,
        table: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        engine: Option<String>,
    },
    Database {
        id: String,
        database: String,
    },
    Node {
        id: String,
        host: String,
    },
    Cluster {
        id: String,
        cluster: String,
    },
    QueryLog {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query_id: Option<String>,
    },
    SpanLog {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        trace_id: Option<String>,
    },
    SystemTable {
        id: String,
        table: String,
    },
    CustomDashboard {
        id: String,
        dashboard: String,
    },
    Chat {
        id: String,
    },
    Dependency {
        id: String,
        database: String,
        table: String,
    },
}

/// Fieldless kind for cheap matching and per-type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabKind {
    Query,
    Table,
    Database,
    Node,
    Cluster,
    QueryLog,
    SpanLog,
    SystemTable,
    CustomDashboard,
    Chat,
    Dependency,
}

impl TabPayload {
    /// Table view tab; id derived from the qualified path.
    pub fn table(
        database: impl Into<String>,
        table: impl Into<String>,
        engine: Option<String>,
    ) -> Self {
        let database = database.into();
        let table = table.into();
        Self::Table {
            id: SchemaNodeId::table(database.clone(), table.clone()).to_string(),
            database,
            table,
            engine,
        }
    }

    /// Database overview tab; id derived from the qualified path.
    pub fn database(database: impl Into<String>) -> Self {
        let database = database.into();
        Self::Database {
            id: SchemaNodeId::database(database.clone()).to_string(),
            database,
        }
    }

    pub fn system_table(table: impl Into<String>) -> Self {
        let table = table.into();
        Self::SystemTable {
            id: format!("system-table:{table}"),
            table,
        }
    }

    pub fn dependency(database: impl Into<String>, table: impl Into<String>) -> Self {
        let database = database.into();
        let table = table.into();
        Self::Dependency {
            id: format!("dependency:{database}.{table}"),
            database,
            table,
        }
    }

    pub fn query(id: impl Into<String>) -> Self {
        Self::Query {
            id: id.into(),
            sql: None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Query { id, .. }
            | Self::Table { id, .. }
            | Self::Database { id, .. }
            | Self::Node { id, .. }
            | Self::Cluster { id, .. }
            | Self::QueryLog { id, .. }
            | Self::SpanLog { id, .. }
            | Self::SystemTable { id, .. }
            | Self::CustomDashboard { id, .. }
            | Self::Chat { id }
            | Self::Dependency { id, .. } => id,
        }
    }

    pub fn kind(&self) -> TabKind {
        match self {
            Self::Query { .. } => TabKind::Query,
            Self::Table { .. } => TabKind::Table,
            Self::Database { .. } => TabKind::Database,
            Self::Node { .. } => TabKind::Node,
            Self::Cluster { .. } => TabKind::Cluster,
            Self::QueryLog { .. } => TabKind::QueryLog,
            Self::SpanLog { .. } => TabKind::SpanLog,
            Self::SystemTable { .. } => TabKind::SystemTable,
            Self::CustomDashboard { .. } => TabKind::CustomDashboard,
            Self::Chat { .. } => TabKind::Chat,
            Self::Dependency { .. } => TabKind::Dependency,
        }
    }

    /// Title shown on the tab itself.
    pub fn title(&self) -> String {
        match self {
            Self::Query { .. } => "Query".to_string(),
            Self::Table {
                database, table, ..
            } => format!("{database}.{table}"),
            Self::Database { database, .. } => database.clone(),
            Self::Node { host, .. } => host.clone(),
            Self::Cluster { cluster, .. } => cluster.clone(),
            Self::QueryLog { .. } => "Query Log".to_string(),
            Self::SpanLog { .. } => "Span Log".to_string(),
            Self::SystemTable { table, .. } => format!("system.{table}"),
            Self::CustomDashboard { dashboard, .. } => dashboard.clone(),
            Self::Chat { .. } => "Chat".to_string(),
            Self::Dependency {
                database, table, ..
            } => format!("{database}.{table} deps"),
        }
    }

    /// Schema tree node this tab corresponds to, for scroll/highlight sync.
    pub fn schema_target(&self) -> Option<SchemaNodeId> {
        match self {
            Self::Table {
                database, table, ..
            }
            | Self::Dependency {
                database, table, ..
            } => Some(SchemaNodeId::table(database.clone(), table.clone())),
            Self::Database { database, .. } => Some(SchemaNodeId::database(database.clone())),
            Self::SystemTable { table, .. } => Some(SchemaNodeId::table("system", table.clone())),
            Self::Query { .. }
            | Self::Node { .. }
            | Self::Cluster { .. }
            | Self::QueryLog { .. }
            | Self::SpanLog { .. }
            | Self::CustomDashboard { .. }
            | Self::Chat { .. } => None,
        }
    }
}
