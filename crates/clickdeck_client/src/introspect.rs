/// Response header carrying the server's configured display name.
pub const SERVER_DISPLAY_NAME_HEADER: &str = "X-ClickHouse-Server-Display-Name";

/// Fixed schema introspection query.
///
/// One row per column, left-joined so databases without tables and tables
/// without columns still produce a row with NULL child fields. Temporary
/// tables and `.inner%` materialized-view backing tables are excluded.
/// The ordering is contractual: the tree builder groups by adjacency.
pub const INTROSPECTION_SQL: &str = "\
SELECT
    d.name AS database,
    d.engine AS dbEngine,
    d.comment AS dbComment,
    t.name AS table,
    t.engine AS tableEngine,
    t.comment AS tableComment,
    c.name AS columnName,
    c.type AS columnType,
    c.comment AS columnComment
FROM system.databases AS d
LEFT JOIN system.tables AS t
    ON t.database = d.name
    AND NOT t.is_temporary
    AND t.name NOT LIKE '.inner%'
LEFT JOIN system.columns AS c
    ON c.database = t.database AND c.table = t.name
ORDER BY lower(d.name), d.name, t.name, c.name";
