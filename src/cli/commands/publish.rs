//! `authorlist publish` command - copy an artifact into a shared store

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::store::{BlobStore, FilesystemStore, Retrying};

#[derive(clap::Args, Debug)]
pub struct PublishArgs {
    /// File to publish
    pub file: PathBuf,

    /// Root directory of the store
    #[arg(long)]
    pub store: PathBuf,

    /// Path inside the store (default: the file name)
    #[arg(long = "as", value_name = "REL")]
    pub dest: Option<String>,

    /// Leave an existing file in the store untouched
    #[arg(long)]
    pub keep_existing: bool,
}

pub fn run(args: PublishArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let bytes = std::fs::read(&args.file)
        .map_err(|e| miette::miette!("Failed to read {}: {}", args.file.display(), e))?;

    let dest = match args.dest {
        Some(dest) => dest,
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| miette::miette!("Cannot derive a name from {}", args.file.display()))?,
    };

    let mut store = FilesystemStore::new(&args.store).map_err(|e| miette::miette!("{}", e))?;
    if args.keep_existing {
        store = store.keep_existing();
    }
    let store = Retrying::new(store, config.retry_policy());

    let id = store
        .store_blob(&dest, &bytes)
        .map_err(|e| miette::miette!("Failed to publish {}: {}", args.file.display(), e))?;

    if !global.quiet {
        println!(
            "{} Published {} as {} (sha256 {})",
            style("✓").green(),
            args.file.display(),
            style(&dest).cyan(),
            style(&id).dim()
        );
    }
    Ok(())
}
