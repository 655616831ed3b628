//! Entity type definitions
//!
//! **Source records** (read from the registry exports):
//! - [`Person`] - People who may appear on the author list
//! - [`Place`] - Institutions people are affiliated with
//! - [`Signer`] - Opt-in submissions, matched to people by email
//! - [`AltEmails`] - Alternate → canonical email corrections
//!
//! **Canonical records** (written by the resolver, read by renderers):
//! - [`Document`] - The complete author list
//! - [`Author`] - A resolved, deduplicated person
//! - [`Affiliation`] - A place referenced by at least one author

pub mod document;
pub mod person;
pub mod place;
pub mod signer;

pub use document::{Affiliation, Author, Document, SCHEMA_COMMENT};
pub use person::Person;
pub use place::{Place, PlaceKeys};
pub use signer::{AltEmails, Signer};
