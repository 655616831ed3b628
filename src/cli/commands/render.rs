//! `authorlist render` command - produce journal or collaboration output

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{load_config, read_document, write_output, STDOUT_PATH};
use crate::cli::GlobalOpts;
use crate::render::{render_to_string, renderer, RenderOptions, Style};

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Input author list
    #[arg(long, short = 'i', default_value = "authors.json")]
    pub input: PathBuf,

    /// Output file (default: authors.<ext> for the style, "-" for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 's', value_enum, default_value_t = Style::Mnras)]
    pub style: Style,

    /// Leave out the corrections and summary sections
    #[arg(long)]
    pub suppress_summary: bool,

    /// Include ORCID identifiers where the style supports them
    #[arg(long)]
    pub orcid: bool,

    /// Document title (overrides the title stored in the author list)
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Publication reference for XML output
    #[arg(long, short = 'r')]
    pub publication_reference: Option<String>,

    /// Collaboration name for XML output
    #[arg(long)]
    pub collaboration: Option<String>,
}

pub fn run(args: RenderArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let document = read_document(&args.input)?;

    let options = RenderOptions {
        suppress_summary: args.suppress_summary,
        orcid: args.orcid,
        title: args.title.or_else(|| config.title.clone()),
        publication_reference: args.publication_reference,
        collaboration: args.collaboration.unwrap_or_else(|| config.collaboration()),
        corrections_url: config.corrections_url.clone(),
        date: Some(chrono::Local::now().format("%Y-%m-%d").to_string()),
    };

    let renderer = renderer(args.style, options).into_diagnostic()?;
    let content = render_to_string(renderer.as_ref(), &document).into_diagnostic()?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("authors.{}", args.style.extension())));
    let written = write_output(&content, Some(output.as_path()))?;

    if !global.quiet {
        let target = written
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| STDOUT_PATH.to_string());
        eprintln!(
            "{} Rendered {} authors and {} affiliations as {} to {}",
            style("✓").green(),
            style(document.authors.len()).cyan(),
            style(document.affiliations.len()).cyan(),
            args.style,
            target
        );
    }

    Ok(())
}
