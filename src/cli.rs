use clap::{Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "seocheck")]
#[command(author, version, about = "On-page SEO checker with actionable suggestions", long_about = None)]
#[command(after_help = r#"Examples:
  seocheck analyze https://example.com -k "running shoes"     Analyze a live page
  seocheck analyze example.com -k shoes --json                Machine-readable report
  seocheck check page.html -k shoes                           Analyze a saved HTML file
  seocheck review https://example.com -k shoes                Work through suggestions
  seocheck serve                                              Run the CORS proxy

Quick Start:
  1. seocheck config init
  2. seocheck analyze https://example.com -k "your keyword"
"#)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a page and list SEO suggestions for a keyword
    #[command(after_help = r#"Examples:
  seocheck analyze https://example.com -k "running shoes"
  seocheck analyze example.com/blog -k recipes --json
  seocheck analyze https://example.com -k shoes --proxy http://127.0.0.1:8080
  seocheck analyze https://example.com -k shoes --direct --no-snapshot
"#)]
    Analyze {
        /// Page URL (https:// is assumed when no scheme is given)
        url: String,

        /// Target keyword
        #[arg(short, long)]
        keyword: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Fetch through this proxy base URL (overrides the config)
        #[arg(long, conflicts_with = "direct")]
        proxy: Option<String>,

        /// Fetch directly even if a proxy is configured
        #[arg(long)]
        direct: bool,

        /// Skip the competitive snapshot
        #[arg(long)]
        no_snapshot: bool,
    },

    /// Analyze a local HTML file (or stdin with "-") without any network access
    Check {
        /// Path to an HTML file, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: String,

        /// Target keyword
        #[arg(short, long)]
        keyword: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactively acknowledge suggestions and track progress
    Review {
        /// Page URL, or a path to a local HTML file
        #[arg(value_name = "URL_OR_FILE")]
        source: String,

        /// Target keyword
        #[arg(short, long)]
        keyword: String,
    },

    /// Run the CORS proxy server
    #[command(after_help = r#"Examples:
  seocheck serve                          Listen on the configured address (default 127.0.0.1:8080)
  seocheck serve --bind 0.0.0.0:9000      Listen on all interfaces

Then: curl "http://127.0.0.1:8080/proxy?url=https%3A%2F%2Fexample.com"
"#)]
    Serve {
        /// Address to listen on (overrides the config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "seocheck", "analyze", "example.com", "-k", "shoes", "--json", "--no-snapshot",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze { url, keyword, json, no_snapshot, direct, proxy } => {
                assert_eq!(url, "example.com");
                assert_eq!(keyword, "shoes");
                assert!(json && no_snapshot && !direct);
                assert!(proxy.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_proxy_conflicts_with_direct() {
        let result = Cli::try_parse_from([
            "seocheck", "analyze", "example.com", "-k", "x", "--direct", "--proxy", "http://p",
        ]);
        assert!(result.is_err());
    }
}
