//! Author resolution
//!
//! Turns the source tables into the canonical [`Document`]: signers are
//! matched to people by email, deduplicated, sorted by signature, and the
//! places they reference are numbered in order of first appearance.
//!
//! Nothing here fails. Every data-quality problem is recorded in [`Issues`]
//! and the run completes with a best-effort document.

use std::collections::{HashMap, HashSet};

use crate::core::ingest::SourceTables;
use crate::core::issues::{IssueKind, Issues};
use crate::core::latex::unicode_to_latex;
use crate::core::names;
use crate::entities::{Affiliation, Author, Document, Person, Place, SCHEMA_COMMENT};

/// Paper-level settings that are not part of the source tables
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Person ids to flag as corresponding authors
    pub corresponding: Vec<String>,
    pub title: Option<String>,
    pub date: Option<String>,
}

/// Email → person id, keeping the first entry on conflict
#[derive(Debug, Default)]
struct EmailIndex {
    label: &'static str,
    map: HashMap<String, String>,
}

impl EmailIndex {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            map: HashMap::new(),
        }
    }

    fn insert(&mut self, email: &str, person_id: &str, issues: &mut Issues) {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return;
        }
        match self.map.get(&email) {
            Some(existing) => issues.warn(
                IssueKind::DuplicateEmail,
                format!(
                    "duplicate {} address: {} (ids: {} and {}), keeping {}",
                    self.label, email, existing, person_id, existing
                ),
            ),
            None => {
                self.map.insert(email, person_id.to_string());
            }
        }
    }

    fn get(&self, email: &str) -> Option<&str> {
        self.map.get(email).map(|s| s.as_str())
    }
}

/// Check a person record for problems that do not stop resolution
fn validate_person(person: &Person, tables: &SourceTables, issues: &mut Issues) {
    let computed = person.computed_signature();
    if person.signature.is_empty() || names::split_signature(&person.signature).is_none() {
        issues.warn(
            IssueKind::MalformedSignature,
            format!(
                "person {}: signature '{}' is not of the form 'Lastname, F. I.', using '{}'",
                person.id, person.signature, computed
            ),
        );
    } else if person.signature != computed {
        issues.warn(
            IssueKind::SignatureMismatch,
            format!(
                "person {}: signature name differs: '{}' != '{}'",
                person.id, person.signature, computed
            ),
        );
    }

    if person.primary_affiliation().is_empty() {
        issues.warn(
            IssueKind::MissingAffiliation,
            format!("person {} ({}) has no affiliation", person.id, person.email),
        );
    }

    for (ordinal, place_id) in person
        .affiliations
        .iter()
        .take(crate::entities::person::MAX_AFFILIATIONS)
        .enumerate()
    {
        if !place_id.is_empty() && !tables.places.contains(place_id) {
            issues.warn(
                IssueKind::UnknownAffiliation,
                format!(
                    "person {} ({}): affiliation {} '{}' not found",
                    person.id,
                    person.email,
                    ordinal + 1,
                    place_id
                ),
            );
        }
    }
}

/// Match signers to people, in signing order, without duplicates
fn match_signers<'a>(tables: &'a SourceTables, issues: &mut Issues) -> Vec<&'a Person> {
    let mut primary = EmailIndex::new("email");
    let mut secondary = EmailIndex::new("secondary email");
    for person in tables.people.iter() {
        primary.insert(&person.email, &person.id, issues);
        secondary.insert(&person.alt_email, &person.id, issues);
    }

    for person in tables.people.iter() {
        validate_person(person, tables, issues);
    }

    let mut resolved: Vec<&Person> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for signer in &tables.signers {
        let signed = signer.normalized_email();
        let email = tables.alt_emails.canonical(&signed);

        let person = primary
            .get(email)
            .or_else(|| secondary.get(email))
            .and_then(|id| tables.people.get(id));

        let Some(person) = person else {
            issues.warn(
                IssueKind::UnknownSigner,
                format!("unknown person: {}", email),
            );
            continue;
        };

        if !names::surnames_overlap(&signer.lastname, &person.lastname) {
            issues.warn(
                IssueKind::SurnameMismatch,
                format!(
                    "surname mismatch for {}: signed '{}', registry has '{}'",
                    email, signer.lastname, person.lastname
                ),
            );
        }

        if seen.insert(person.id.as_str()) {
            resolved.push(person);
        } else {
            issues.info(
                IssueKind::RepeatSignature,
                format!("person {} already signed ({})", person.id, email),
            );
        }
    }

    resolved
}

/// An author on its way into the document
struct Candidate<'a> {
    person: &'a Person,
    firstname: String,
    lastname: String,
    sortorder: String,
    places: Vec<&'a Place>,
}

impl<'a> Candidate<'a> {
    fn new(person: &'a Person, tables: &'a SourceTables) -> Self {
        let signature = match names::split_signature(&person.signature) {
            Some(_) => person.signature.clone(),
            None => person.computed_signature(),
        };
        let (firstname, lastname) = names::split_signature(&signature)
            .unwrap_or_else(|| (person.firstname.clone(), person.lastname.clone()));

        // Unresolvable references were already reported by validate_person
        let places = person
            .affiliation_refs()
            .filter_map(|id| tables.places.get(id))
            .collect();

        Self {
            person,
            firstname,
            lastname,
            sortorder: names::sort_key(&signature),
            places,
        }
    }
}

/// Assigns affiliation numbers in order of first appearance
#[derive(Default)]
struct Numbering<'a> {
    order: Vec<&'a Place>,
    index: HashMap<&'a str, usize>,
}

impl<'a> Numbering<'a> {
    fn number(&mut self, place: &'a Place) -> usize {
        if let Some(&n) = self.index.get(place.id.as_str()) {
            return n;
        }
        let n = self.order.len();
        self.index.insert(place.id.as_str(), n);
        self.order.push(place);
        n
    }
}

/// Order candidates: by folded signature, then by the sequence of
/// affiliation numbers they would receive in that order, then by id
fn sort_candidates(candidates: &mut [Candidate<'_>]) {
    candidates.sort_by(|a, b| {
        a.sortorder
            .cmp(&b.sortorder)
            .then_with(|| a.person.id.cmp(&b.person.id))
    });

    let mut provisional = Numbering::default();
    let tie_keys: HashMap<&str, Vec<usize>> = candidates
        .iter()
        .map(|c| {
            let nums = c.places.iter().map(|p| provisional.number(p)).collect();
            (c.person.id.as_str(), nums)
        })
        .collect();

    let mut keyed: Vec<(String, Vec<usize>, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(pos, c)| {
            (
                c.sortorder.clone(),
                tie_keys.get(c.person.id.as_str()).cloned().unwrap_or_default(),
                pos,
            )
        })
        .collect();
    keyed.sort();

    let order: Vec<usize> = keyed.into_iter().map(|(_, _, pos)| pos).collect();
    apply_order(candidates, &order);
}

/// Permute `items` so that `items[i]` becomes the old `items[order[i]]`
fn apply_order<T>(items: &mut [T], order: &[usize]) {
    let mut target: Vec<usize> = vec![0; order.len()];
    for (new_pos, &old_pos) in order.iter().enumerate() {
        target[old_pos] = new_pos;
    }
    for i in 0..items.len() {
        while target[i] != i {
            let j = target[i];
            items.swap(i, j);
            target.swap(i, j);
        }
    }
}

fn build_affiliation(num: usize, place: &Place) -> Affiliation {
    Affiliation {
        affil_num: num,
        affil_num_str: (num + 1).to_string(),
        place_id: place.id.clone(),
        place_key: place.key.clone(),
        short_name_unicode: place.short_name.clone(),
        short_name_latex: unicode_to_latex(&place.short_name),
        country: place.country.clone(),
        address_asciified: names::asciify(&place.address),
        address_unicode: place.address.clone(),
        address_html: names::htmlify(&place.address),
        address_latex: unicode_to_latex(&place.address),
        short_name_asciified: Some(names::asciify(&place.short_name)),
        short_name_xml: Some(names::xmlify(&place.short_name)),
        address_xml: Some(names::xmlify(&place.address)),
    }
}

fn build_author<'a>(
    candidate: &Candidate<'a>,
    numbering: &mut Numbering<'a>,
    corresponding: bool,
) -> Author {
    let person = candidate.person;
    let mut author = Author {
        author_id: person.id.clone(),
        lastname: person.lastname.clone(),
        firstname: person.firstname.clone(),
        email: person.contact_email().map(|e| e.to_string()),
        corresponding,
        orcid: person.orcid.clone(),
        affil_place_ids: Vec::new(),
        affil_place_keys: Vec::new(),
        affil_nums: Vec::new(),
        affil_num_strs: Vec::new(),
        author_sortorder: candidate.sortorder.clone(),
        author_asciified: names::author_asciified(&candidate.firstname, &candidate.lastname),
        author_unicode: names::author_unicode(&candidate.firstname, &candidate.lastname),
        author_html: names::author_html(&candidate.firstname, &candidate.lastname),
        author_latex: names::author_latex(&candidate.firstname, &candidate.lastname),
        author_xml: Some(names::xmlify(&names::author_unicode(
            &candidate.firstname,
            &candidate.lastname,
        ))),
        firstname_xml: Some(names::xmlify(&person.firstname)),
        lastname_xml: Some(names::xmlify(&person.lastname)),
    };

    for &place in &candidate.places {
        let num = numbering.number(place);
        author.affil_place_ids.push(place.id.clone());
        author.affil_place_keys.push(place.key.clone());
        author.affil_nums.push(num);
        author.affil_num_strs.push((num + 1).to_string());
    }

    author
}

/// Resolve the source tables into the canonical document
pub fn resolve(tables: &SourceTables, options: &ResolveOptions, issues: &mut Issues) -> Document {
    let resolved = match_signers(tables, issues);

    let mut corresponding: HashSet<&str> = HashSet::new();
    for id in &options.corresponding {
        if resolved.iter().any(|p| p.id == *id) {
            corresponding.insert(id.as_str());
        } else {
            issues.warn(
                IssueKind::UnknownCorresponding,
                format!("corresponding author {} is not on the author list", id),
            );
        }
    }

    let mut candidates: Vec<Candidate<'_>> = resolved
        .iter()
        .map(|p| Candidate::new(p, tables))
        .collect();
    sort_candidates(&mut candidates);

    let mut numbering = Numbering::default();
    let authors: Vec<Author> = candidates
        .iter()
        .map(|c| {
            let is_corresponding = corresponding.contains(c.person.id.as_str());
            if is_corresponding {
                issues.info(
                    IssueKind::Corresponding,
                    format!("corresponding author: {}", c.person.signature),
                );
            }
            build_author(c, &mut numbering, is_corresponding)
        })
        .collect();

    let affiliations = numbering
        .order
        .iter()
        .enumerate()
        .map(|(num, place)| build_affiliation(num, place))
        .collect();

    let title = options.title.as_deref().filter(|t| !t.is_empty());

    Document {
        comment: SCHEMA_COMMENT.to_string(),
        title_unicode: title.map(|t| t.to_string()),
        title_latex: title.map(unicode_to_latex),
        title_xml: title.map(names::xmlify),
        title_asciified: title.map(names::asciify),
        date: options.date.clone(),
        authors,
        affiliations,
    }
}
