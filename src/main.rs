use clap::Parser;
use miette::Result;
use authorlist::cli::commands;
use authorlist::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe instead of panicking (e.g. `| head`).
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Build(args) => commands::build::run(args, &global),
        Commands::Render(args) => commands::render::run(args, &global),
        Commands::Validate(args) => commands::validate::run(args, &global),
        Commands::Summary(args) => commands::summary::run(args, &global),
        Commands::Publish(args) => commands::publish::run(args, &global),
        Commands::Schema(args) => commands::schema::run(args),
        Commands::Config(cmd) => commands::config::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
