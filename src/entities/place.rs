//! Place entity - an institutional affiliation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::names::place_slug;

/// A row of the affiliation address table, with its assigned key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,

    /// Unique ASCII slug used as a cross-reference anchor
    pub key: String,

    pub short_name: String,

    pub country: String,

    /// Full postal address
    pub address: String,
}

/// Hands out place keys that are unique within a run.
///
/// The first place producing a slug gets it bare; later ones get `2`, `3`,
/// ... appended until the result is unused.
#[derive(Debug, Default)]
pub struct PlaceKeys {
    used: HashSet<String>,
}

impl PlaceKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a key for a place, falling back to the id when the short name
    /// has no ASCII alphanumerics at all
    pub fn assign(&mut self, short_name: &str, id: &str) -> String {
        let mut base = place_slug(short_name);
        if base.is_empty() {
            base = place_slug(id);
        }

        let mut key = base.clone();
        if self.used.contains(&key) {
            let mut i = 2;
            while self.used.contains(&format!("{}{}", base, i)) {
                i += 1;
            }
            key = format!("{}{}", base, i);
        }

        self.used.insert(key.clone());
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collisions_get_suffixes() {
        let mut keys = PlaceKeys::new();
        assert_eq!(keys.assign("MIT", "1"), "MIT");
        assert_eq!(keys.assign("M.I.T.", "2"), "MIT2");
        assert_eq!(keys.assign("mit", "3"), "mit");
        assert_eq!(keys.assign("MIT", "4"), "MIT3");
    }

    #[test]
    fn test_suffix_skips_taken_keys() {
        let mut keys = PlaceKeys::new();
        assert_eq!(keys.assign("LAPP2", "1"), "LAPP2");
        assert_eq!(keys.assign("LAPP", "2"), "LAPP");
        assert_eq!(keys.assign("LAPP", "3"), "LAPP3");
    }

    #[test]
    fn test_all_keys_distinct() {
        let mut keys = PlaceKeys::new();
        let names = ["IRFU", "IRFU", "I.R.F.U", "IRFU2", "IRFU", "", ""];
        let assigned: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, n)| keys.assign(n, &format!("id{}", i)))
            .collect();
        let unique: HashSet<&String> = assigned.iter().collect();
        assert_eq!(unique.len(), assigned.len());
    }

    #[test]
    fn test_empty_slug_uses_id() {
        let mut keys = PlaceKeys::new();
        assert_eq!(keys.assign("東京大学", "place-42"), "place42");
    }
}
