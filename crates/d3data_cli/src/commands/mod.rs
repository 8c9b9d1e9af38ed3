//! CLI command implementations.

pub mod list;
pub mod lock;
pub mod registry_dump;
pub mod temp_name;
