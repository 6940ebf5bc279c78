mod measurements;
pub mod schema;

pub use measurements::*;
pub use schema::{SchemaError, TableSchema};
