mod error;
mod executor;
mod introspect;
mod loader;

pub use error::LoadError;
pub use executor::{ExecuteError, OutputFormat, QueryExecutor, QueryRequest, QueryResponse};
pub use introspect::{INTROSPECTION_SQL, SERVER_DISPLAY_NAME_HEADER};
pub use loader::{SchemaLoader, SchemaPayload};
