//! Storefront CLI - drive the storefront client libraries from a terminal.
//!
//! Commands:
//! - `storefront search` - Run a product search and page through results
//! - `storefront lang` - Show, list, or switch the storefront language
//! - `storefront config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, LangArgs, SearchArgs};

/// Storefront CLI - Browse the catalog and manage client settings
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search products and load result pages
    Search(SearchArgs),

    /// Show or switch the storefront language
    Lang(LangArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = store_app::init_logging(&ctx.config.logging, cli.verbose) {
        ctx.output.debug(&e.to_string());
    }
    match &ctx.config_path {
        Some(path) => ctx.output.debug(&format!("Using config {}", path.display())),
        None => ctx.output.debug("No config file found, using defaults"),
    }

    let result = match cli.command {
        Commands::Search(args) => commands::search::run(args, &ctx).await,
        Commands::Lang(args) => commands::lang::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
