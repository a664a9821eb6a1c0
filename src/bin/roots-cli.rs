use std::path::PathBuf;

use clap::{Parser, Subcommand};

use domain_roots::config::load_config;
use domain_roots::routing::{Category, Resolution, RootPaths};

#[derive(Parser)]
#[command(name = "roots-cli")]
#[command(about = "Inspect domain root rules without running the server", long_about = None)]
struct Cli {
    /// Path to the TOML rules file.
    #[arg(short, long, default_value = "roots.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and list its rules
    Check,
    /// Show the directories a host resolves to
    Resolve {
        /// Host, optionally with a port
        host: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let resolver = config.build_resolver().map_err(domain_roots::config::ConfigError::Validation)?;

    match cli.command {
        Commands::Check => {
            println!("{}: {} rule(s)", cli.config.display(), resolver.rules().len());
            for (i, rule) in resolver.rules().iter().enumerate() {
                let categories: Vec<_> = rule
                    .layout()
                    .categories
                    .iter()
                    .map(|c| format!("{c:?}").to_lowercase())
                    .collect();
                println!(
                    "  [{i}] pattern={} domain={} root={} categories={}",
                    rule.pattern(),
                    rule.domain(),
                    rule.root().display(),
                    categories.join(",")
                );
            }
            match resolver.no_match_status() {
                Some(status) => println!("no match: respond {status}"),
                None => println!("no match: pass through"),
            }
        }
        Commands::Resolve { host } => {
            let mut paths = RootPaths::default();
            match resolver.resolve(&host, &mut paths) {
                Resolution::Matched { rule } => {
                    println!("{host}: rule {rule}");
                    for category in Category::ALL {
                        if let Some(dir) = paths.get(category) {
                            println!("  {:<8} {}", format!("{category:?}").to_lowercase(), dir.display());
                        }
                    }
                }
                Resolution::Unmatched { status: Some(status) } => println!("{host}: no match, respond {status}"),
                Resolution::Unmatched { status: None } | Resolution::AlreadyResolved => {
                    println!("{host}: no match")
                }
            }
        }
    }

    Ok(())
}
