mod cancel;
mod node_id;
mod schema_row;
mod tab;
mod tree;
mod tree_builder;

pub use cancel::CancelToken;
pub use node_id::{SchemaNodeId, SchemaNodeKind};
pub use schema_row::SchemaRow;
pub use tab::{TabKind, TabPayload};
pub use tree::{
    ColumnNode, DatabaseNode, EnumType, HostNode, TableNode, parse_enum_type, short_engine_label,
};
pub use tree_builder::{SchemaTreeBuilder, build_tree};
