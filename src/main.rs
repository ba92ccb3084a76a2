use clap::Parser;
use dashboard::cli::{commands, Cli, Commands};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Install miette's fancy error handler for diagnostics
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

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.global.log_level())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let global = &cli.global;
    match cli.command {
        Commands::Run => commands::run::run(global),
        Commands::Xml => commands::xml::run(global),
        Commands::Merge => commands::merge::run(global),
        Commands::Teams => commands::teams::run(global),
        Commands::DbReport => commands::db_report::run(global),
        Commands::InitDb(args) => commands::init_db::run(args, global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
