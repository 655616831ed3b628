//! Signer entity and the alternate email map

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One opt-in submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signer {
    pub email: String,

    #[serde(default)]
    pub firstname: String,

    /// Self-reported surname, checked loosely against the registry
    pub lastname: String,
}

impl Signer {
    /// Email as used for lookup: trimmed and lower-cased
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

/// Alternate email → canonical email, both lower-cased
#[derive(Debug, Clone, Default)]
pub struct AltEmails {
    map: HashMap<String, String>,
}

impl AltEmails {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping, returning the canonical email it replaced
    pub fn insert(&mut self, alternate: &str, canonical: &str) -> Option<String> {
        self.map.insert(
            alternate.trim().to_lowercase(),
            canonical.trim().to_lowercase(),
        )
    }

    /// Map an email to its canonical form, if an entry exists
    pub fn canonical<'a>(&'a self, email: &'a str) -> &'a str {
        self.map.get(email).map(|s| s.as_str()).unwrap_or(email)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
