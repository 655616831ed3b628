//! Canonical author list document
//!
//! This is the single contract between the resolver and every renderer.
//! Field names are part of the on-disk format and must not change.

use serde::{Deserialize, Serialize};

/// Human-readable description of the format, stored as `_comment`
pub const SCHEMA_COMMENT: &str = "\
Author list in JSON format. Contains an array of authors in order that
they should be included in the author list (element \"authors\"), and an array
of places to which the authors are affiliated (element \"affiliations\").

Array \"authors\" :
- author_id         : Unique identifier of author in the people registry.
- lastname          : Last name(s) of author in unicode.
- firstname         : First name(s) of author in unicode.
- email             : Contact email address (optional).
- corresponding     : Corresponding author (optional).
- orcid             : ORCID identifier if available (optional).
- author_sortorder  : Sort key used to order authors names (ascii in format
                      \"lastname, f. i.\").
- author_asciified  : Ascii version of author's name (in format
                      \"F. I. Lastname\", with unicode removed).
- author_unicode    : Unicode version of author's name in format
                      \"F. I. Lastname\".
- author_html       : HTML version of author's name in format
                      \"F.&nbsp;I.&nbsp;Lastname\".
- author_latex      : LaTeX version of author's name in format
                      \"F.~I.~Lastname\".
- affil_nums        : Array listing positions of authors' affiliations in the
                      affiliation array (starting at zero).
- affil_num_strs    : Array listing positions of authors' affiliations in the
                      affiliation array as string (starting at one).
- affil_place_keys  : Array of text keys for authors affiliations. Can be used
                      as a unique but readable key for LaTeX \\ref/\\label pairing
                      to identify affiliations.
- affil_place_ids   : Array of identifiers for authors affiliations
                      corresponding to identifier in the places table
                      (not recommended for general use).

Array \"affiliations\" :
- affil_num         : Position of affiliation in the affiliation array
                      (starting at zero).
- affil_num_str     : Position of affiliation in the affiliation array as
                      string (starting at one).
- place_key         : Text key for affiliation. Can be used as a unique but
                      readable key for LaTeX \\ref/\\label pairing to identify
                      affiliations.
- place_id          : Identifier for affiliation corresponding to identifier
                      in the places table (not recommended for general use).
- short_name_unicode: Short name of place in unicode.
- short_name_latex  : Short name of place in LaTeX format.
- country           : Country.
- address_asciified : Ascii version of address (with unicode removed).
- address_unicode   : Unicode version of address.
- address_html      : HTML version of address with unicode escaped.
- address_latex     : LaTeX version of address with unicode escaped.
";

/// A resolved author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub author_id: String,
    pub lastname: String,
    pub firstname: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub corresponding: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,

    pub affil_place_ids: Vec<String>,
    pub affil_place_keys: Vec<String>,
    pub affil_nums: Vec<usize>,
    pub affil_num_strs: Vec<String>,

    pub author_sortorder: String,
    pub author_asciified: String,
    pub author_unicode: String,
    pub author_html: String,
    pub author_latex: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname_xml: Option<String>,
}

impl Author {
    /// Email, if present and non-empty
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// ORCID, if present and non-empty
    pub fn orcid(&self) -> Option<&str> {
        self.orcid.as_deref().filter(|o| !o.is_empty())
    }
}

/// A deduplicated place referenced by at least one author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affiliation {
    pub affil_num: usize,
    pub affil_num_str: String,
    pub place_id: String,
    pub place_key: String,

    pub short_name_unicode: String,
    pub short_name_latex: String,

    pub country: String,

    pub address_asciified: String,
    pub address_unicode: String,
    pub address_html: String,
    pub address_latex: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name_asciified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_xml: Option<String>,
}

/// The complete author list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_comment", default)]
    pub comment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_unicode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_latex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_xml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_asciified: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    pub authors: Vec<Author>,
    pub affiliations: Vec<Affiliation>,
}

impl Document {
    /// Affiliations of an author, in the author's order.
    ///
    /// Out-of-range indices are skipped; [`Document::reference_problems`]
    /// reports them.
    pub fn affiliations_of<'a>(&'a self, author: &'a Author) -> impl Iterator<Item = &'a Affiliation> {
        author
            .affil_nums
            .iter()
            .filter_map(move |&n| self.affiliations.get(n))
    }

    /// Cross-reference problems between authors and affiliations.
    ///
    /// An empty result means every `affil_nums[i]` indexes `affiliations`,
    /// keys and ids agree, positions match `affil_num`, every affiliation is
    /// referenced and no author appears twice.
    pub fn reference_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (pos, affil) in self.affiliations.iter().enumerate() {
            if affil.affil_num != pos {
                problems.push(format!(
                    "affiliations[{}] has affil_num {}",
                    pos, affil.affil_num
                ));
            }
            if affil.affil_num_str != (pos + 1).to_string() {
                problems.push(format!(
                    "affiliations[{}] has affil_num_str '{}'",
                    pos, affil.affil_num_str
                ));
            }
        }

        let mut referenced = vec![false; self.affiliations.len()];
        let mut seen_ids = std::collections::HashSet::new();

        for (pos, author) in self.authors.iter().enumerate() {
            if !seen_ids.insert(author.author_id.as_str()) {
                problems.push(format!(
                    "authors[{}]: author '{}' appears more than once",
                    pos, author.author_id
                ));
            }

            let n = author.affil_nums.len();
            if author.affil_place_keys.len() != n
                || author.affil_place_ids.len() != n
                || author.affil_num_strs.len() != n
            {
                problems.push(format!(
                    "authors[{}]: affiliation arrays of '{}' differ in length",
                    pos, author.author_id
                ));
            }

            for (i, &num) in author.affil_nums.iter().enumerate() {
                let Some(affil) = self.affiliations.get(num) else {
                    problems.push(format!(
                        "authors[{}]: affil_nums[{}] = {} is out of range",
                        pos, i, num
                    ));
                    continue;
                };
                referenced[num] = true;

                if let Some(key) = author.affil_place_keys.get(i) {
                    if *key != affil.place_key {
                        problems.push(format!(
                            "authors[{}]: affil_place_keys[{}] = '{}' but affiliation {} has key '{}'",
                            pos, i, key, num, affil.place_key
                        ));
                    }
                }
                if let Some(id) = author.affil_place_ids.get(i) {
                    if *id != affil.place_id {
                        problems.push(format!(
                            "authors[{}]: affil_place_ids[{}] = '{}' but affiliation {} has id '{}'",
                            pos, i, id, num, affil.place_id
                        ));
                    }
                }
            }
        }

        for (pos, used) in referenced.iter().enumerate() {
            if !used {
                problems.push(format!(
                    "affiliations[{}] ('{}') is not referenced by any author",
                    pos, self.affiliations[pos].place_key
                ));
            }
        }

        problems
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_consistent_document_has_no_problems() {
        let doc = document(
            vec![
                author("p1", "Lee", &[0], &["MIT"]),
                author("p2", "Smith", &[0, 1], &["MIT", "LAPP"]),
            ],
            vec![affiliation(0, "MIT", "USA"), affiliation(1, "LAPP", "France")],
        );
        assert!(doc.reference_problems().is_empty());
    }

    #[test]
    fn test_key_mismatch_reported() {
        let doc = document(
            vec![author("p1", "Lee", &[0], &["LAPP"])],
            vec![affiliation(0, "MIT", "USA")],
        );
        let problems = doc.reference_problems();
        assert!(problems.iter().any(|p| p.contains("affil_place_keys[0]")));
    }

    #[test]
    fn test_out_of_range_and_unreferenced() {
        let doc = document(
            vec![author("p1", "Lee", &[3], &["MIT"])],
            vec![affiliation(0, "MIT", "USA")],
        );
        let problems = doc.reference_problems();
        assert!(problems.iter().any(|p| p.contains("out of range")));
        assert!(problems.iter().any(|p| p.contains("not referenced")));
    }

    #[test]
    fn test_duplicate_author_reported() {
        let doc = document(
            vec![
                author("p1", "Lee", &[0], &["MIT"]),
                author("p1", "Lee", &[0], &["MIT"]),
            ],
            vec![affiliation(0, "MIT", "USA")],
        );
        assert_eq!(doc.reference_problems().len(), 1);
    }

    #[test]
    fn test_optional_fields_absent_deserialize() {
        let json = r#"{
            "authors": [{
                "author_id": "p1", "lastname": "Lee", "firstname": "Bob",
                "affil_place_ids": ["1"], "affil_place_keys": ["MIT"],
                "affil_nums": [0], "affil_num_strs": ["1"],
                "author_sortorder": "lee, b.", "author_asciified": "B. Lee",
                "author_unicode": "B. Lee", "author_html": "B.&nbsp;Lee",
                "author_latex": "B.~Lee"
            }],
            "affiliations": [{
                "affil_num": 0, "affil_num_str": "1", "place_id": "1",
                "place_key": "MIT", "short_name_unicode": "MIT",
                "short_name_latex": "MIT", "country": "USA",
                "address_asciified": "77 Mass Ave", "address_unicode": "77 Mass Ave",
                "address_html": "77 Mass Ave", "address_latex": "77 Mass Ave"
            }]
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(!doc.authors[0].corresponding);
        assert_eq!(doc.authors[0].email(), None);
        assert_eq!(doc.authors[0].orcid(), None);
        assert!(doc.comment.is_empty());
    }
}
