//! Schema system - canonical document validation

pub mod validator;

pub use validator::{SchemaLoadError, SchemaViolation, ValidationError, Validator, DOCUMENT_SCHEMA};
