//! CLI command implementations

pub mod build;
pub mod completions;
pub mod config;
pub mod publish;
pub mod render;
pub mod schema;
pub mod summary;
pub mod validate;
