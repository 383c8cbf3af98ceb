//! seocheck - on-page SEO checker CLI

use clap::Parser;

use seocheck::cli::{Cli, Commands, ConfigCommands};
use seocheck::error::Result;

mod commands;
mod utils;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            url,
            keyword,
            json,
            proxy,
            direct,
            no_snapshot,
        } => commands::cmd_analyze(&url, &keyword, json, proxy, direct, no_snapshot),
        Commands::Check { file, keyword, json } => commands::cmd_check(&file, &keyword, json),
        Commands::Review { source, keyword } => commands::cmd_review(&source, &keyword),
        Commands::Serve { bind } => commands::cmd_serve(bind),

        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::Path) => commands::cmd_config_path(),
        Commands::Config(ConfigCommands::Init { force }) => commands::cmd_config_init(force),

        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
