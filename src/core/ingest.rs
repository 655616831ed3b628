//! Source table ingestion
//!
//! Raw rows come in as positional string vectors. This is the only place that
//! knows which column holds what; everything downstream works with named
//! records. Data-quality problems become [`Issues`], a row too short to hold
//! a required column aborts the load.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::issues::{IssueKind, Issues};
use crate::core::store::{BlobStore, StoreError};
use crate::entities::{AltEmails, Person, Place, PlaceKeys, Signer};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{source_name}, row {row}: missing required column {column} ({field})")]
    ShortRow {
        source_name: String,
        row: usize,
        column: usize,
        field: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Column layout of the people table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeopleColumns {
    pub header: bool,
    pub id: usize,
    pub lastname: usize,
    pub firstname: usize,
    pub email: usize,
    pub alt_email: usize,
    pub signature: usize,
    /// Up to three affiliation columns; the first one is required
    pub affiliations: Vec<usize>,
    pub orcid: Option<usize>,
}

impl Default for PeopleColumns {
    fn default() -> Self {
        Self {
            header: true,
            id: 0,
            lastname: 1,
            firstname: 2,
            email: 3,
            alt_email: 4,
            signature: 8,
            affiliations: vec![9, 10, 11],
            orcid: Some(12),
        }
    }
}

/// Column layout of the places table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceColumns {
    pub header: bool,
    pub id: usize,
    pub short_name: usize,
    pub country: usize,
    pub address: usize,
}

impl Default for PlaceColumns {
    fn default() -> Self {
        Self {
            header: false,
            id: 0,
            short_name: 1,
            country: 2,
            address: 3,
        }
    }
}

/// Column layout of the opt-in responses table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerColumns {
    pub header: bool,
    pub email: usize,
    pub firstname: usize,
    pub lastname: usize,
}

impl Default for SignerColumns {
    fn default() -> Self {
        Self {
            header: true,
            email: 1,
            firstname: 2,
            lastname: 3,
        }
    }
}

/// Column layout of the alternate email table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AltEmailColumns {
    pub header: bool,
    pub alternate: usize,
    pub canonical: usize,
}

impl Default for AltEmailColumns {
    fn default() -> Self {
        Self {
            header: false,
            alternate: 0,
            canonical: 1,
        }
    }
}

/// Column layouts of all source tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub people: PeopleColumns,
    pub places: PlaceColumns,
    pub signers: SignerColumns,
    pub alt_emails: AltEmailColumns,
}

/// Names of the source tables, as understood by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    pub people: String,
    pub places: String,
    pub signers: String,
    /// The alternate email table is optional
    pub alt_emails: Option<String>,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            people: "people.csv".to_string(),
            places: "places.csv".to_string(),
            signers: "signers.csv".to_string(),
            alt_emails: Some("alt_emails.csv".to_string()),
        }
    }
}

/// Records keyed by identifier, iterated in first-insertion order
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns true if the id was already present.
    /// A replaced record keeps its original position.
    pub fn insert(&mut self, id: &str, item: T) -> bool {
        match self.index.get(id) {
            Some(&pos) => {
                self.items[pos] = item;
                true
            }
            None => {
                self.index.insert(id.to_string(), self.items.len());
                self.items.push(item);
                false
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> FromIterator<(String, T)> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut registry = Registry::new();
        for (id, item) in iter {
            registry.insert(&id, item);
        }
        registry
    }
}

/// Everything the resolver needs, loaded and mapped
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub people: Registry<Person>,
    pub places: Registry<Place>,
    pub signers: Vec<Signer>,
    pub alt_emails: AltEmails,
}

/// Row accessor that knows where it came from, for error messages
struct Row<'a> {
    source: &'a str,
    number: usize,
    fields: &'a [String],
}

impl<'a> Row<'a> {
    fn required(&self, column: usize, field: &'static str) -> Result<&'a str, IngestError> {
        self.fields
            .get(column)
            .map(|s| s.as_str())
            .ok_or_else(|| IngestError::ShortRow {
                source_name: self.source.to_string(),
                row: self.number,
                column,
                field,
            })
    }

    fn optional(&self, column: Option<usize>) -> Option<&'a str> {
        column
            .and_then(|c| self.fields.get(c))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

/// Iterate over data rows, skipping the header and fully blank lines
fn data_rows<'a>(
    source: &'a str,
    rows: &'a [Vec<String>],
    header: bool,
) -> impl Iterator<Item = Row<'a>> {
    let skip = usize::from(header);
    rows.iter()
        .enumerate()
        .skip(skip)
        .map(move |(i, fields)| Row {
            source,
            number: i + 1,
            fields,
        })
        .filter(|row| !row.is_blank())
}

/// Map place rows, assigning unique keys in table order
pub fn parse_places(
    source: &str,
    rows: &[Vec<String>],
    columns: &PlaceColumns,
    issues: &mut Issues,
) -> Result<Registry<Place>, IngestError> {
    let mut places = Registry::new();
    let mut keys = PlaceKeys::new();

    for row in data_rows(source, rows, columns.header) {
        let id = row.required(columns.id, "id")?.trim();
        if id.is_empty() {
            continue;
        }
        let short_name = row.required(columns.short_name, "short name")?.trim();
        let country = row.required(columns.country, "country")?.trim();
        let address = row.required(columns.address, "address")?.trim();

        if address.contains('\u{200B}') {
            issues.warn(
                IssueKind::ZeroWidthSpace,
                format!("address of place {} contains U+200B: {}", id, address),
            );
        }

        let place = Place {
            id: id.to_string(),
            key: keys.assign(short_name, id),
            short_name: short_name.to_string(),
            country: country.to_string(),
            address: address.to_string(),
        };
        if places.insert(id, place) {
            issues.warn(
                IssueKind::DuplicatePlaceId,
                format!("duplicate place id: {}", id),
            );
        }
    }

    Ok(places)
}

/// Map people rows; all fields are whitespace-trimmed
pub fn parse_people(
    source: &str,
    rows: &[Vec<String>],
    columns: &PeopleColumns,
    issues: &mut Issues,
) -> Result<Registry<Person>, IngestError> {
    let mut people = Registry::new();

    for row in data_rows(source, rows, columns.header) {
        let id = row.required(columns.id, "id")?.trim();
        if id.is_empty() {
            continue;
        }

        let mut affiliations = Vec::new();
        for (i, &column) in columns.affiliations.iter().enumerate() {
            let value = if i == 0 {
                row.required(column, "affiliation")?.trim()
            } else {
                row.optional(Some(column)).unwrap_or("")
            };
            affiliations.push(value.to_string());
        }

        let person = Person {
            id: id.to_string(),
            lastname: row.required(columns.lastname, "last name")?.trim().to_string(),
            firstname: row.required(columns.firstname, "first name")?.trim().to_string(),
            email: row.required(columns.email, "email")?.trim().to_string(),
            alt_email: row.required(columns.alt_email, "alt email")?.trim().to_string(),
            signature: row.required(columns.signature, "signature")?.trim().to_string(),
            affiliations,
            orcid: row.optional(columns.orcid).map(|s| s.to_string()),
        };

        if people.insert(id, person) {
            issues.warn(
                IssueKind::DuplicatePersonId,
                format!("duplicate person id: {}", id),
            );
        }
    }

    Ok(people)
}

/// Map opt-in response rows
pub fn parse_signers(
    source: &str,
    rows: &[Vec<String>],
    columns: &SignerColumns,
) -> Result<Vec<Signer>, IngestError> {
    data_rows(source, rows, columns.header)
        .map(|row| {
            Ok(Signer {
                email: row.required(columns.email, "email")?.to_string(),
                firstname: row.required(columns.firstname, "first name")?.trim().to_string(),
                lastname: row.required(columns.lastname, "last name")?.trim().to_string(),
            })
        })
        .collect()
}

/// Map alternate email rows; rows with an empty alternate are skipped
pub fn parse_alt_emails(
    source: &str,
    rows: &[Vec<String>],
    columns: &AltEmailColumns,
    issues: &mut Issues,
) -> Result<AltEmails, IngestError> {
    let mut alt_emails = AltEmails::new();

    for row in data_rows(source, rows, columns.header) {
        let alternate = row.required(columns.alternate, "alternate email")?.trim();
        if alternate.is_empty() {
            continue;
        }
        let canonical = row.required(columns.canonical, "canonical email")?;
        if let Some(previous) = alt_emails.insert(alternate, canonical) {
            issues.warn(
                IssueKind::DuplicateAltEmail,
                format!(
                    "duplicate alternate email: {} (was mapped to {})",
                    alternate.to_lowercase(),
                    previous
                ),
            );
        }
    }

    Ok(alt_emails)
}

/// Fetch and map every source table
pub fn load_tables<S: BlobStore + ?Sized>(
    store: &S,
    sources: &Sources,
    layout: &Layout,
    issues: &mut Issues,
) -> Result<SourceTables, IngestError> {
    let alt_emails = match &sources.alt_emails {
        Some(name) => {
            let rows = store.fetch_rows(name)?;
            parse_alt_emails(name, &rows, &layout.alt_emails, issues)?
        }
        None => AltEmails::new(),
    };

    let rows = store.fetch_rows(&sources.places)?;
    let places = parse_places(&sources.places, &rows, &layout.places, issues)?;

    let rows = store.fetch_rows(&sources.people)?;
    let people = parse_people(&sources.people, &rows, &layout.people, issues)?;

    let rows = store.fetch_rows(&sources.signers)?;
    let signers = parse_signers(&sources.signers, &rows, &layout.signers)?;

    Ok(SourceTables {
        people,
        places,
        signers,
        alt_emails,
    })
}
