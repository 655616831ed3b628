//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::issues::{Issues, Severity};
use crate::core::Config;
use crate::entities::Document;
use crate::schema::Validator;

/// Path that means "standard output" for `--output`
pub const STDOUT_PATH: &str = "-";

/// Load the layered configuration, honouring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<Config> {
    Config::load(global.config.as_deref()).into_diagnostic()
}

/// Print collected data-quality findings to stderr.
///
/// Warnings are always shown; notes only without `--quiet`.
pub fn print_issues(issues: &Issues, global: &GlobalOpts) {
    for issue in issues.iter() {
        match issue.severity {
            Severity::Warning => {
                eprintln!("{} {}", style("!").yellow(), issue.message);
            }
            Severity::Info if !global.quiet => {
                eprintln!("{} {}", style("i").blue(), style(&issue.message).dim());
            }
            Severity::Info => {}
        }
    }

    let warnings = issues.warning_count();
    if warnings > 0 {
        eprintln!(
            "{} {} warning(s)",
            style("!").yellow().bold(),
            style(warnings).yellow()
        );
    }
}

/// Read and validate a canonical author list
pub fn read_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;
    let validator = Validator::new()?;
    let document = validator
        .validate(&content, &path.to_string_lossy())
        .map_err(miette::Report::new)?;
    Ok(document)
}

/// Write content to a file, or to stdout when no path (or `-`) is given.
///
/// Returns the path written to, if any.
pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<Option<PathBuf>> {
    match output_path {
        Some(path) if path != Path::new(STDOUT_PATH) => {
            let file = File::create(path)
                .map_err(|e| miette::miette!("Failed to create {}: {}", path.display(), e))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            Ok(Some(path.to_path_buf()))
        }
        _ => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(content.as_bytes()).into_diagnostic()?;
            handle.flush().into_diagnostic()?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_output_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.txt");
        let written = write_output("hello\n", Some(&path)).unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_read_document_rejects_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("authors.json");
        std::fs::write(&path, "{\"authors\": []}").unwrap();
        assert!(read_document(&path).is_err());
    }

    #[test]
    fn test_read_document_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_document(&tmp.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
