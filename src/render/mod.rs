//! Renderers - turn a canonical document into journal-ready text
//!
//! Every renderer writes to an explicit sink and never touches process
//! state. Authors and affiliations are emitted exactly once, in document
//! order.

pub mod csv;
pub mod latex;
pub mod summary;
pub mod xml;

use clap::ValueEnum;
use std::io::Write;
use thiserror::Error;

use crate::core::config::DEFAULT_COLLABORATION;
use crate::entities::Document;

pub use self::csv::CsvRenderer;
pub use latex::{Aa, LatexRenderer, LatexStyle, Mnras};
pub use xml::XmlRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("template error: {0}")]
    Template(String),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Style {
    /// Monthly Notices of the RAS (LaTeX)
    Mnras,
    /// Astronomy & Astrophysics (LaTeX)
    Aa,
    /// A&A with a self-generated affiliation list, as accepted by astro-ph
    AaAstroph,
    /// Collaboration author list XML
    Xml,
    /// Comma-terminated author names
    Csv,
}

impl Style {
    /// Conventional file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Style::Mnras | Style::Aa | Style::AaAstroph => "tex",
            Style::Xml => "xml",
            Style::Csv => "csv",
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Style::Mnras => "mnras",
            Style::Aa => "aa",
            Style::AaAstroph => "aa-astroph",
            Style::Xml => "xml",
            Style::Csv => "csv",
        };
        write!(f, "{}", name)
    }
}

/// Settings shared by the renderers; each uses what applies to it
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Leave out the corrections and summary sections (LaTeX)
    pub suppress_summary: bool,
    /// Emit ORCID identifiers where the style supports them (A&A)
    pub orcid: bool,
    /// Document title in unicode; overrides the document's own title
    pub title: Option<String>,
    /// Publication reference (XML); falls back to the document title
    pub publication_reference: Option<String>,
    /// Collaboration name (XML, default title)
    pub collaboration: String,
    /// Link for the corrections section (LaTeX)
    pub corrections_url: Option<String>,
    /// Creation date used when the document carries none (XML)
    pub date: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            suppress_summary: false,
            orcid: false,
            title: None,
            publication_reference: None,
            collaboration: DEFAULT_COLLABORATION.to_string(),
            corrections_url: None,
            date: None,
        }
    }
}

/// A document renderer
pub trait Render {
    fn render(&self, doc: &Document, out: &mut dyn Write) -> Result<(), RenderError>;
}

/// Build the renderer for an output style
pub fn renderer(style: Style, options: RenderOptions) -> Result<Box<dyn Render>, RenderError> {
    Ok(match style {
        Style::Mnras => Box::new(LatexRenderer::new(Mnras, options)),
        Style::Aa => {
            let orcid = options.orcid;
            Box::new(LatexRenderer::new(Aa { astroph: false, orcid }, options))
        }
        Style::AaAstroph => {
            let orcid = options.orcid;
            Box::new(LatexRenderer::new(Aa { astroph: true, orcid }, options))
        }
        Style::Xml => Box::new(XmlRenderer::new(options)?),
        Style::Csv => Box::new(CsvRenderer),
    })
}

/// Render into memory
pub fn render_to_string(renderer: &dyn Render, doc: &Document) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    renderer.render(doc, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
