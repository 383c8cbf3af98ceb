//! Miscellaneous commands: serve, config, completions

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;

use seocheck::cli::{Cli, CompletionShell};
use seocheck::config::Config;
use seocheck::error::Result;

/// Run the CORS proxy until Ctrl+C
#[cfg(feature = "proxy")]
pub fn cmd_serve(bind: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let bind = bind.unwrap_or_else(|| config.proxy.bind.clone());

    println!("\n{} on http://{}", "CORS proxy".cyan().bold(), bind);
    println!("  Usage: GET /proxy?url=<url-encoded target>");
    println!("  Press Ctrl+C to stop.\n");

    seocheck::proxy::run(&bind, &config.fetch)
}

#[cfg(not(feature = "proxy"))]
pub fn cmd_serve(_bind: Option<String>) -> Result<()> {
    Err(seocheck::SeoError::FeatureDisabled("proxy"))
}

/// Print the effective configuration as TOML
pub fn cmd_config_show() -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load()?;

    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    println!("# {}\n", source);
    println!("{}", config.to_toml()?);
    Ok(())
}

pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Write a default config file
pub fn cmd_config_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!("Config already exists at {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    let written = Config::default().save()?;
    println!("{} Wrote {}", "✓".green(), written.display());
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "seocheck", &mut io::stdout());
    Ok(())
}
