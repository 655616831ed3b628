//! Core module - ingestion, resolution and the shared text transforms

pub mod config;
pub mod ingest;
pub mod issues;
pub mod latex;
pub mod names;
pub mod resolver;
pub mod store;

pub use config::{Config, ConfigError, StoreSettings};
pub use ingest::{load_tables, IngestError, Layout, Registry, SourceTables, Sources};
pub use issues::{Issue, IssueKind, Issues, Severity};
pub use resolver::{resolve, ResolveOptions};
pub use store::{BlobStore, FilesystemStore, RetryPolicy, Retrying, StoreError};
