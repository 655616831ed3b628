//! `authorlist validate` command - check an author list

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::read_document;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Author list to check
    #[arg(default_value = "authors.json")]
    pub file: PathBuf,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let document = read_document(&args.file)?;

    if !global.quiet {
        println!(
            "{} {} - {} authors, {} affiliations",
            style("✓").green(),
            args.file.display(),
            style(document.authors.len()).cyan(),
            style(document.affiliations.len()).cyan()
        );
    }
    Ok(())
}
