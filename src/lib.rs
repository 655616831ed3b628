//! authorlist: collaboration author list builder
//!
//! Reads the people registry, the affiliation table and the opt-in
//! submissions, resolves them into one ordered author list, and renders that
//! list for journals (MNRAS, A&A), collaboration XML databases or CSV.

pub mod cli;
pub mod core;
pub mod entities;
pub mod render;
pub mod schema;
