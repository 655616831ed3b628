//! Author statistics for checking eligibility and balance

use std::collections::HashMap;

use tabled::{builder::Builder, settings::Style};

use crate::entities::{Affiliation, Author, Document};

/// Fractional author count for one country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryCount {
    pub country: String,
    pub count: f64,
}

/// Authors per country, largest first.
///
/// An author with several affiliations contributes an equal fraction to
/// the country of each. Countries with equal counts stay in order of
/// first appearance.
pub fn authors_by_country(doc: &Document) -> Vec<CountryCount> {
    let mut counts: Vec<CountryCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for author in &doc.authors {
        let share = 1.0 / author.affil_nums.len() as f64;
        for affiliation in doc.affiliations_of(author) {
            let country = affiliation.country.as_str();
            let slot = *index.entry(country).or_insert_with(|| {
                counts.push(CountryCount {
                    country: country.to_string(),
                    count: 0.0,
                });
                counts.len() - 1
            });
            counts[slot].count += share;
        }
    }

    counts.sort_by(|a, b| b.count.total_cmp(&a.count));
    counts
}

/// Each affiliation with its authors, both in document order
pub fn authors_by_affiliation(doc: &Document) -> Vec<(&Affiliation, Vec<&Author>)> {
    let mut roster: Vec<(&Affiliation, Vec<&Author>)> =
        doc.affiliations.iter().map(|a| (a, Vec::new())).collect();
    for author in &doc.authors {
        for &num in &author.affil_nums {
            if let Some((_, members)) = roster.get_mut(num) {
                members.push(author);
            }
        }
    }
    roster
}

/// Count truncated to one decimal, without a trailing `.0`
pub fn format_count(count: f64) -> String {
    let truncated = (count * 10.0).trunc() / 10.0;
    if truncated.fract() == 0.0 {
        format!("{}", truncated as i64)
    } else {
        format!("{}", truncated)
    }
}

/// Percentage of all authors, one decimal
pub fn format_share(count: f64, total_authors: usize) -> String {
    if total_authors == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", count / total_authors as f64 * 100.0)
}

/// Plain-text report for the terminal
pub fn summary_report(doc: &Document) -> String {
    let mut output = String::new();

    let mut totals = Builder::default();
    totals.push_record(["Metric", "Count"]);
    totals.push_record(["Authors".to_string(), doc.authors.len().to_string()]);
    totals.push_record(["Affiliations".to_string(), doc.affiliations.len().to_string()]);
    totals.push_record([
        "Corresponding".to_string(),
        doc.authors.iter().filter(|a| a.corresponding).count().to_string(),
    ]);
    totals.push_record([
        "With ORCID".to_string(),
        doc.authors.iter().filter(|a| a.orcid().is_some()).count().to_string(),
    ]);
    output.push_str(&totals.build().with(Style::markdown()).to_string());
    output.push_str("\n\n");

    let mut countries = Builder::default();
    countries.push_record(["Country", "Authors", "Share"]);
    for entry in authors_by_country(doc) {
        countries.push_record([
            entry.country.clone(),
            format_count(entry.count),
            format!("{}%", format_share(entry.count, doc.authors.len())),
        ]);
    }
    output.push_str(&countries.build().with(Style::markdown()).to_string());
    output.push('\n');

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::document::fixtures::*;

    fn three_country_doc() -> Document {
        document(
            vec![
                author("p1", "Adams", &[0], &["A"]),
                author("p2", "Brown", &[0, 1, 2], &["A", "B", "C"]),
                author("p3", "Clark", &[2], &["C"]),
                author("p4", "Davis", &[1], &["B"]),
            ],
            vec![
                affiliation(0, "A", "Italy"),
                affiliation(1, "B", "Japan"),
                affiliation(2, "C", "Italy"),
            ],
        )
    }

    #[test]
    fn test_fractional_country_counts() {
        let counts = authors_by_country(&three_country_doc());
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].country, "Italy");
        assert!((counts[0].count - (1.0 + 2.0 / 3.0 + 1.0)).abs() < 1e-9);
        assert_eq!(counts[1].country, "Japan");
        assert!((counts[1].count - (1.0 / 3.0 + 1.0)).abs() < 1e-9);

        let total: f64 = counts.iter().map(|c| c.count).sum();
        assert!((total - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let doc = document(
            vec![
                author("p1", "Adams", &[0], &["A"]),
                author("p2", "Brown", &[1], &["B"]),
            ],
            vec![affiliation(0, "A", "Spain"), affiliation(1, "B", "Chile")],
        );
        let counts = authors_by_country(&doc);
        assert_eq!(counts[0].country, "Spain");
        assert_eq!(counts[1].country, "Chile");
    }

    #[test]
    fn test_format_count_truncates() {
        assert_eq!(format_count(3.0), "3");
        assert_eq!(format_count(2.5), "2.5");
        assert_eq!(format_count(4.0 / 3.0), "1.3");
        assert_eq!(format_count(2.0 / 3.0), "0.6");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1.0, 3), "33.3");
        assert_eq!(format_share(2.0, 3), "66.7");
        assert_eq!(format_share(0.0, 0), "0.0");
    }

    #[test]
    fn test_roster_follows_document_order() {
        let doc = three_country_doc();
        let roster = authors_by_affiliation(&doc);
        let names = |i: usize| -> Vec<&str> {
            roster[i].1.iter().map(|a| a.author_id.as_str()).collect()
        };
        assert_eq!(names(0), vec!["p1", "p2"]);
        assert_eq!(names(1), vec!["p2", "p4"]);
        assert_eq!(names(2), vec!["p2", "p3"]);
    }

    #[test]
    fn test_summary_report_tables() {
        let report = summary_report(&three_country_doc());
        assert!(report.contains("| Authors"));
        assert!(report.contains("| Italy"));
        assert!(report.contains("66.6%") || report.contains("66.7%"));
    }
}
