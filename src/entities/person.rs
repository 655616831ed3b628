//! Person entity - a registry record for a prospective author

use serde::{Deserialize, Serialize};

use crate::core::names;

/// Maximum number of affiliations a person can carry
pub const MAX_AFFILIATIONS: usize = 3;

/// A row of the people registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable identifier from the registry
    pub id: String,

    pub lastname: String,

    pub firstname: String,

    /// Primary contact email
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    /// Secondary email (often a collaboration-issued address)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alt_email: String,

    /// Signature as it should appear in print, "Lastname, F. I."
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,

    /// Affiliation (place) references, in input order; blanks preserved
    #[serde(default)]
    pub affiliations: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl Person {
    /// Affiliation references with blanks skipped, at most three
    pub fn affiliation_refs(&self) -> impl Iterator<Item = &str> {
        self.affiliations
            .iter()
            .take(MAX_AFFILIATIONS)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// The primary affiliation field, which may be blank
    pub fn primary_affiliation(&self) -> &str {
        self.affiliations.first().map(|s| s.as_str()).unwrap_or("")
    }

    /// Abbreviated signature computed from the recorded names
    pub fn computed_signature(&self) -> String {
        names::format_author_name(&self.firstname, &self.lastname)
    }

    /// Email used for correspondence: primary, else secondary
    pub fn contact_email(&self) -> Option<&str> {
        [self.email.as_str(), self.alt_email.as_str()]
            .into_iter()
            .find(|e| !e.is_empty())
    }
}
