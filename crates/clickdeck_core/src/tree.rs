use std::sync::LazyLock;

use regex::Regex;

use crate::node_id::SchemaNodeId;

/// Root of the schema tree: one node per connected server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNode {
    /// Display name for the server (host name or server display name).
    pub label: String,
    pub databases: Vec<DatabaseNode>,
}

impl HostNode {
    pub fn id(&self) -> SchemaNodeId {
        SchemaNodeId::Host
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn database(&self, name: &str) -> Option<&DatabaseNode> {
        self.databases.iter().find(|db| db.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseNode {
    pub name: String,
    pub engine: Option<String>,
    pub comment: Option<String>,
    pub tables: Vec<TableNode>,

    /// True if any child table uses the `Distributed` engine.
    pub has_distributed_table: bool,

    /// True if any child table uses a `Replicated*` engine.
    pub has_replicated_table: bool,
}

impl DatabaseNode {
    pub fn id(&self) -> SchemaNodeId {
        SchemaNodeId::database(self.name.clone())
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, name: &str) -> Option<&TableNode> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNode {
    pub database: String,
    pub name: String,

    /// Full engine string, kept for logic and tooltips.
    pub engine: Option<String>,
    pub comment: Option<String>,
    pub columns: Vec<ColumnNode>,
}

impl TableNode {
    pub fn id(&self) -> SchemaNodeId {
        SchemaNodeId::table(self.database.clone(), self.name.clone())
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    /// Shortened engine label for display next to the table name.
    pub fn engine_label(&self) -> Option<String> {
        self.engine.as_deref().map(short_engine_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNode {
    pub database: String,
    pub table: String,
    pub name: String,

    /// Raw column type string as reported by the server.
    pub type_name: String,

    /// Parsed representation when the type is an `EnumN(...)`.
    pub enum_type: Option<EnumType>,
    pub comment: Option<String>,
}

impl ColumnNode {
    pub fn id(&self) -> SchemaNodeId {
        SchemaNodeId::column(self.database.clone(), self.table.clone(), self.name.clone())
    }

    pub fn label(&self) -> &str {
        &self.name
    }
}

/// Parsed `Enum8(...)` / `Enum16(...)` column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub base_type: String,

    /// Key/value pairs in declaration order; values kept as strings.
    pub pairs: Vec<(String, String)>,
}

static ENUM_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Enum8|Enum16)\((.+)\)$").unwrap());

static ENUM_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:\\.|[^'\\])*)'\s*=\s*(-?\d+)").unwrap());

/// Parses an `EnumN('a' = 1, ...)` type string; returns `None` for anything else.
pub fn parse_enum_type(type_name: &str) -> Option<EnumType> {
    let captures = ENUM_TYPE_RE.captures(type_name.trim())?;
    let base_type = captures[1].to_string();
    let body = &captures[2];

    let pairs: Vec<(String, String)> = ENUM_PAIR_RE
        .captures_iter(body)
        .map(|pair| (unescape_enum_key(&pair[1]), pair[2].to_string()))
        .collect();

    if pairs.is_empty() {
        return None;
    }

    Some(EnumType { base_type, pairs })
}

fn unescape_enum_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Shortens an engine name for display in the tree.
///
/// A strict `MergeTree` suffix is stripped when a prefix remains
/// (`ReplicatedMergeTree` becomes `Replicated`; bare `MergeTree` stays),
/// `MaterializedView` becomes `MV`, and `System*` engines become `Sys`.
pub fn short_engine_label(engine: &str) -> String {
    if engine == "MaterializedView" {
        return "MV".to_string();
    }
    if engine.starts_with("System") {
        return "Sys".to_string();
    }
    if let Some(prefix) = engine.strip_suffix("MergeTree")
        && !prefix.is_empty()
    {
        return prefix.to_string();
    }
    engine.to_string()
}
