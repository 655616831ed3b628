//! Document validation with detailed error reporting

use jsonschema::error::ValidationErrorKind;
use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::entities::Document;

/// The canonical document schema, embedded at build time
pub const DOCUMENT_SCHEMA: &str = include_str!("../../schemas/document.schema.json");

/// Validation error with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("Document validation failed: {summary}")]
#[diagnostic(code(authorlist::schema::validation_error))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema or cross-reference violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,

    #[help]
    help: Option<String>,
}

impl SchemaViolation {
    pub fn new(message: String, hint: String, span: SourceSpan, help: Option<String>) -> Self {
        Self {
            span,
            message,
            hint,
            help,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ValidationError {
    pub fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let count = violations.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[SchemaViolation] {
        &self.violations
    }
}

/// The embedded schema failed to compile
#[derive(Debug, Error, Diagnostic)]
#[error("embedded document schema is invalid: {0}")]
#[diagnostic(code(authorlist::schema::invalid_schema))]
pub struct SchemaLoadError(String);

/// Validator for canonical author list documents
pub struct Validator {
    compiled: JsonValidator,
}

impl Validator {
    /// Compile the embedded document schema
    pub fn new() -> Result<Self, SchemaLoadError> {
        let schema: JsonValue =
            serde_json::from_str(DOCUMENT_SCHEMA).map_err(|e| SchemaLoadError(e.to_string()))?;
        let compiled = validator_for(&schema).map_err(|e| SchemaLoadError(e.to_string()))?;
        Ok(Self { compiled })
    }

    /// Validate JSON text and return the parsed document.
    ///
    /// Every schema violation is reported, not just the first. Once the
    /// shape is right, author/affiliation cross-references are checked too.
    pub fn validate(&self, content: &str, filename: &str) -> Result<Document, ValidationError> {
        let json_value: JsonValue = match serde_json::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let span = find_error_span(content, e.line(), e.column());
                let violation = SchemaViolation::new(
                    format!("JSON parse error: {}", e),
                    "invalid JSON".to_string(),
                    span,
                    Some("Check JSON syntax - brackets, commas, quotes".to_string()),
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let violations: Vec<SchemaViolation> = self
            .compiled
            .iter_errors(&json_value)
            .map(|e| error_to_violation(content, &e))
            .collect();
        if !violations.is_empty() {
            return Err(ValidationError::new(filename, content, violations));
        }

        let document: Document = match serde_json::from_value(json_value) {
            Ok(d) => d,
            Err(e) => {
                let violation = SchemaViolation::new(
                    format!("Failed to read document: {}", e),
                    "conversion error".to_string(),
                    first_line_span(content),
                    None,
                );
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let violations: Vec<SchemaViolation> = document
            .reference_problems()
            .into_iter()
            .map(|problem| {
                let span = problem_pointer(&problem)
                    .and_then(|pointer| locate_pointer(content, &pointer))
                    .unwrap_or_else(|| first_line_span(content));
                SchemaViolation::new(
                    problem,
                    "inconsistent reference".to_string(),
                    span,
                    Some("Regenerate the document with `authorlist build`".to_string()),
                )
            })
            .collect();

        if violations.is_empty() {
            Ok(document)
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

/// Convert a JSON Schema validation error to our violation format
fn error_to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let message = format_schema_error(error);
    let hint = format_error_hint(error);
    let help = generate_help_message(error);

    let span = locate_pointer(content, &path).unwrap_or_else(|| first_line_span(content));

    SchemaViolation::new(message, hint, span, help)
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(error: &JsonSchemaError) -> String {
    let path = if error.instance_path.as_str().is_empty() {
        "document root".to_string()
    } else {
        format!("'{}'", error.instance_path)
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            format!("Missing required field: {} at {}", prop_str, path)
        }
        ValidationErrorKind::Type { kind } => {
            format!("Wrong type at {}: expected {:?}", path, kind)
        }
        ValidationErrorKind::MinLength { limit } => {
            format!("Value at {} is too short: minimum {} characters", path, limit)
        }
        ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            format!("Unknown field(s) at {}: {}", path, unexpected.join(", "))
        }
        _ => format!("Validation error at {}: {}", path, error),
    }
}

/// Generate a short hint for the error label
fn format_error_hint(error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Required { .. } => "required field missing".to_string(),
        ValidationErrorKind::Type { .. } => "wrong type".to_string(),
        ValidationErrorKind::MinLength { .. } => "too short".to_string(),
        ValidationErrorKind::Minimum { .. } => "too small".to_string(),
        ValidationErrorKind::AdditionalProperties { .. } => "unknown field".to_string(),
        _ => "validation error".to_string(),
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            Some(format!("Add the '{}' field", prop_str))
        }
        ValidationErrorKind::Type { kind } => Some(format!("Expected value of type: {:?}", kind)),
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            if unexpected.len() == 1 {
                Some(format!("Remove the '{}' field or check spelling", unexpected[0]))
            } else {
                Some("Remove unknown fields or check spelling".to_string())
            }
        }
        _ => None,
    }
}

/// Turn the "authors[3]: ..." prefix of a reference problem into a pointer
fn problem_pointer(problem: &str) -> Option<String> {
    let (head, _) = problem.split_once(']')?;
    let (array, index) = head.split_once('[')?;
    let index: usize = index.parse().ok()?;
    Some(format!("/{}/{}", array, index))
}

/// Highlight the first line of the content
fn first_line_span(content: &str) -> SourceSpan {
    let len = content.find('\n').unwrap_or(content.len()).max(1);
    (0, len).into()
}

/// Span for a 1-based line/column position reported by the JSON parser
fn find_error_span(content: &str, line: usize, column: usize) -> SourceSpan {
    let line = line.saturating_sub(1);
    let column = column.saturating_sub(1);

    let mut offset = 0;
    for (i, line_content) in content.lines().enumerate() {
        if i == line {
            offset += column.min(line_content.len());
            break;
        }
        offset += line_content.len() + 1;
    }
    let offset = offset.min(content.len());

    let rest_of_content = &content[offset..];
    let len = rest_of_content
        .find('\n')
        .unwrap_or(rest_of_content.len())
        .max(1);

    (offset, len).into()
}

/// Find the value a JSON pointer refers to and span its first line.
///
/// This walks the raw text rather than a parsed tree so the span lines up
/// with what the user wrote, including repeated keys in sibling objects.
fn locate_pointer(content: &str, pointer: &str) -> Option<SourceSpan> {
    let bytes = content.as_bytes();
    let mut pos = skip_ws(bytes, 0);
    let mut label_start = pos;

    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        match bytes.get(pos)? {
            b'{' => {
                let (key_start, value_start) = find_member(bytes, pos, segment)?;
                label_start = key_start;
                pos = value_start;
            }
            b'[' => {
                let index: usize = segment.parse().ok()?;
                pos = find_element(bytes, pos, index)?;
                label_start = pos;
            }
            _ => return None,
        }
    }

    let end = skip_value(bytes, pos)?;
    let line_end = content[label_start..]
        .find('\n')
        .map(|n| label_start + n)
        .unwrap_or(content.len());
    let len = end.min(line_end).saturating_sub(label_start).max(1);
    Some((label_start, len).into())
}

fn skip_ws(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

/// End offset (exclusive) of the JSON value starting at `pos`
fn skip_value(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes.get(pos)? {
        b'"' => {
            let mut i = pos + 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' => i += 2,
                    b'"' => return Some(i + 1),
                    _ => i += 1,
                }
            }
            None
        }
        b'{' | b'[' => {
            let mut depth = 0usize;
            let mut i = pos;
            while i < bytes.len() {
                match bytes[i] {
                    b'"' => {
                        i = skip_value(bytes, i)?;
                        continue;
                    }
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(i + 1);
                        }
                    }
                    _ => {}
                }
                i += 1;
            }
            None
        }
        _ => {
            let mut i = pos;
            while i < bytes.len() && !matches!(bytes[i], b',' | b'}' | b']') && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            Some(i)
        }
    }
}

/// Offsets of the key and the value of member `key` in the object at `pos`
fn find_member(bytes: &[u8], pos: usize, key: &str) -> Option<(usize, usize)> {
    let mut i = skip_ws(bytes, pos + 1);
    while *bytes.get(i)? != b'}' {
        let key_start = i;
        let key_end = skip_value(bytes, key_start)?;
        let colon = skip_ws(bytes, key_end);
        if *bytes.get(colon)? != b':' {
            return None;
        }
        let value_start = skip_ws(bytes, colon + 1);
        if bytes.get(key_start + 1..key_end.checked_sub(1)?)? == key.as_bytes() {
            return Some((key_start, value_start));
        }
        i = skip_ws(bytes, skip_value(bytes, value_start)?);
        if bytes.get(i) == Some(&b',') {
            i = skip_ws(bytes, i + 1);
        }
    }
    None
}

/// Offset of element `index` in the array at `pos`
fn find_element(bytes: &[u8], pos: usize, index: usize) -> Option<usize> {
    let mut i = skip_ws(bytes, pos + 1);
    let mut n = 0;
    while *bytes.get(i)? != b']' {
        if n == index {
            return Some(i);
        }
        i = skip_ws(bytes, skip_value(bytes, i)?);
        if bytes.get(i) == Some(&b',') {
            i = skip_ws(bytes, i + 1);
        }
        n += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::document::fixtures::*;

    fn valid_json() -> String {
        let doc = document(
            vec![
                author("p1", "Lee", &[0], &["MIT"]),
                author("p2", "Smith", &[0, 1], &["MIT", "LAPP"]),
            ],
            vec![affiliation(0, "MIT", "USA"), affiliation(1, "LAPP", "France")],
        );
        serde_json::to_string_pretty(&doc).unwrap()
    }

    #[test]
    fn test_embedded_schema_compiles() {
        assert!(Validator::new().is_ok());
    }

    #[test]
    fn test_valid_document() {
        let validator = Validator::new().unwrap();
        let doc = validator.validate(&valid_json(), "authors.json").unwrap();
        assert_eq!(doc.authors.len(), 2);
        assert_eq!(doc.affiliations.len(), 2);
    }

    #[test]
    fn test_invalid_json_reports_parse_error() {
        let validator = Validator::new().unwrap();
        let err = validator.validate("{\"authors\": [", "broken.json").unwrap_err();
        assert_eq!(err.violation_count(), 1);
        assert!(err.violations()[0].message().contains("JSON parse error"));
    }

    #[test]
    fn test_all_schema_violations_reported() {
        let validator = Validator::new().unwrap();
        let mut value: JsonValue = serde_json::from_str(&valid_json()).unwrap();
        let authors = value["authors"].as_array_mut().unwrap();
        authors[0].as_object_mut().unwrap().remove("author_latex");
        authors[1]["affil_nums"] = serde_json::json!(["zero"]);
        let content = serde_json::to_string_pretty(&value).unwrap();

        let err = validator.validate(&content, "authors.json").unwrap_err();
        assert_eq!(err.violation_count(), 2);
        assert!(err
            .violations()
            .iter()
            .any(|v| v.message().contains("Missing required field: author_latex")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let validator = Validator::new().unwrap();
        let mut value: JsonValue = serde_json::from_str(&valid_json()).unwrap();
        value["affiliations"][0]["postcode"] = serde_json::json!("02139");
        let content = serde_json::to_string(&value).unwrap();

        let err = validator.validate(&content, "authors.json").unwrap_err();
        assert!(err.violations()[0].message().contains("postcode"));
    }

    #[test]
    fn test_cross_reference_problems_reported() {
        let validator = Validator::new().unwrap();
        let doc = document(
            vec![author("p1", "Lee", &[1], &["MIT"])],
            vec![affiliation(0, "MIT", "USA")],
        );
        let content = serde_json::to_string_pretty(&doc).unwrap();

        let err = validator.validate(&content, "authors.json").unwrap_err();
        assert!(err
            .violations()
            .iter()
            .any(|v| v.message().contains("out of range")));
    }

    #[test]
    fn test_locate_pointer_finds_nested_element() {
        let content = "{\n  \"a\": [\n    {\"k\": 1},\n    {\"k\": \"two\"}\n  ]\n}";
        let span = locate_pointer(content, "/a/1/k").unwrap();
        assert_eq!(&content[span.offset()..span.offset() + span.len()], "\"k\": \"two\"");
    }

    #[test]
    fn test_problem_pointer() {
        assert_eq!(
            problem_pointer("authors[3]: affil_nums[0] = 9 is out of range").as_deref(),
            Some("/authors/3")
        );
        assert_eq!(problem_pointer("no index here"), None);
    }
}
