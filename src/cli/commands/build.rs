//! `authorlist build` command - resolve the source tables into authors.json

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{load_config, print_issues, write_output};
use crate::cli::GlobalOpts;
use crate::core::ingest::load_tables;
use crate::core::issues::Issues;
use crate::core::resolver::{resolve, ResolveOptions};
use crate::core::store::{FilesystemStore, Retrying};

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Directory holding the source tables
    #[arg(long, short = 'd')]
    pub data_dir: Option<PathBuf>,

    /// People registry table (relative to the data directory)
    #[arg(long)]
    pub people: Option<String>,

    /// Affiliation address table
    #[arg(long)]
    pub places: Option<String>,

    /// Opt-in submissions table
    #[arg(long)]
    pub signers: Option<String>,

    /// Alternate email table
    #[arg(long, conflicts_with = "no_alt_emails")]
    pub alt_emails: Option<String>,

    /// Do not read an alternate email table
    #[arg(long)]
    pub no_alt_emails: bool,

    /// Person id of a corresponding author (repeatable or comma-separated)
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub corresponding: Vec<String>,

    /// Paper title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// Creation date (default: today, YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Output file ("-" for stdout)
    #[arg(long, short = 'o', default_value = "authors.json")]
    pub output: PathBuf,

    /// Exit with an error if any warning was reported
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: BuildArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let data_dir = args.data_dir.clone().unwrap_or_else(|| config.data_dir());
    let store = FilesystemStore::new(&data_dir)
        .map_err(|e| miette::miette!("Cannot read source tables: {}", e))?;
    let store = Retrying::new(store, config.retry_policy());

    let mut sources = config.sources();
    if let Some(people) = args.people {
        sources.people = people;
    }
    if let Some(places) = args.places {
        sources.places = places;
    }
    if let Some(signers) = args.signers {
        sources.signers = signers;
    }
    if args.no_alt_emails {
        sources.alt_emails = None;
    } else if let Some(alt_emails) = args.alt_emails {
        sources.alt_emails = Some(alt_emails);
    }

    let mut issues = Issues::new();
    let tables = load_tables(&store, &sources, &config.layout(), &mut issues).into_diagnostic()?;

    if global.verbose {
        eprintln!(
            "{} Loaded {} people, {} places, {} submissions, {} alternate emails from {}",
            style("→").blue(),
            tables.people.len(),
            tables.places.len(),
            tables.signers.len(),
            tables.alt_emails.len(),
            data_dir.display()
        );
    }

    let corresponding = if args.corresponding.is_empty() {
        config.corresponding.clone()
    } else {
        args.corresponding
    };
    let options = ResolveOptions {
        corresponding,
        title: args.title.or_else(|| config.title.clone()),
        date: Some(
            args.date
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
        ),
    };

    let document = resolve(&tables, &options, &mut issues);

    let mut json = serde_json::to_string_pretty(&document).into_diagnostic()?;
    json.push('\n');
    let written = write_output(&json, Some(args.output.as_path()))?;

    print_issues(&issues, global);

    if !global.quiet {
        let target = written
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        eprintln!(
            "{} Wrote {} authors and {} affiliations to {}",
            style("✓").green(),
            style(document.authors.len()).cyan(),
            style(document.affiliations.len()).cyan(),
            target
        );
    }

    let warnings = issues.warning_count();
    if args.strict && warnings > 0 {
        return Err(miette::miette!(
            "{} warning(s) reported and --strict is set",
            warnings
        ));
    }

    Ok(())
}
