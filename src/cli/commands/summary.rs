//! `authorlist summary` command - author counts by country

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{read_document, write_output};
use crate::cli::GlobalOpts;
use crate::render::summary::summary_report;

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Author list to summarize
    #[arg(default_value = "authors.json")]
    pub file: PathBuf,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    let document = read_document(&args.file)?;
    let report = summary_report(&document);

    if let Some(path) = write_output(&report, args.output.as_deref())? {
        if !global.quiet {
            println!("Summary written to: {}", path.display());
        }
    }
    Ok(())
}
