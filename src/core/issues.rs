//! Data-quality findings collected during a resolver run
//!
//! Nothing in here is fatal. The resolver records every problem it sees and
//! keeps going so an operator can fix a whole batch of source rows at once.

use std::fmt;

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational note (repeat signature, corresponding author)
    Info,
    /// Something in the source data that should be fixed
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a finding, so callers and tests can match on it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    DuplicatePersonId,
    DuplicatePlaceId,
    DuplicateAltEmail,
    DuplicateEmail,
    ZeroWidthSpace,
    MissingAffiliation,
    UnknownAffiliation,
    SignatureMismatch,
    MalformedSignature,
    UnknownSigner,
    SurnameMismatch,
    RepeatSignature,
    Corresponding,
    UnknownCorresponding,
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Ordered collection of findings
#[derive(Debug, Default, Clone)]
pub struct Issues {
    items: Vec<Issue>,
}

impl Issues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.items.push(Issue {
            severity: Severity::Warning,
            kind,
            message: message.into(),
        });
    }

    pub fn info(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.items.push(Issue {
            severity: Severity::Info,
            kind,
            message: message.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Findings of one kind, in the order they were recorded
    pub fn of_kind(&self, kind: IssueKind) -> Vec<&Issue> {
        self.items.iter().filter(|i| i.kind == kind).collect()
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.items.iter().any(|i| i.kind == kind)
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
