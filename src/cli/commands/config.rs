//! `authorlist config` command - inspect the effective configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::config::{Config, PROJECT_CONFIG_FILE};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration as YAML
    Show,

    /// Show paths to configuration files
    Path,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let yaml = config.to_yaml().into_diagnostic()?;
    if yaml.trim() == "{}" {
        println!("{}", style("# all settings at their defaults").dim());
    } else {
        print!("{}", yaml);
    }

    if !global.quiet {
        eprintln!();
        eprintln!("{}", style("Config sources (in priority order):").dim());
        eprintln!("  1. Command-line flags");
        eprintln!("  2. Environment variables (AUTHORLIST_TITLE, AUTHORLIST_DATA_DIR)");
        eprintln!("  3. Project config ({} or --config)", PROJECT_CONFIG_FILE);
        eprintln!("  4. Global config (~/.config/authorlist/config.yaml)");
    }
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("          {}", style("(exists)").green());
    } else {
        println!("          {}", style("(not created)").dim());
    }
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global: ", &path),
        None => println!(
            "  {} {}",
            style("Global: ").cyan(),
            style("(no home directory)").dim()
        ),
    }

    let project = global
        .config
        .clone()
        .unwrap_or_else(|| Path::new(PROJECT_CONFIG_FILE).to_path_buf());
    print_path("Project:", &project);
    Ok(())
}
