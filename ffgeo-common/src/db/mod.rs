//! Backing store: schema declarations, schema checks and connection setup

pub mod init;
pub mod schema_check;
pub mod table_schemas;

pub use init::*;
pub use schema_check::*;
pub use table_schemas::*;
