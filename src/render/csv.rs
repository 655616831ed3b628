//! Comma-terminated author names, one per line

use std::io::Write;

use super::{Render, RenderError};
use crate::entities::Document;

/// Writes `Name,` per author; names containing commas or quotes are quoted
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl Render for CsvRenderer {
    fn render(&self, doc: &Document, out: &mut dyn Write) -> Result<(), RenderError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        for author in &doc.authors {
            writer.write_record([author.author_unicode.as_str(), ""])?;
        }
        writer.flush()?;
        Ok(())
    }
}
