//! CLI command implementations.

pub mod config;
pub mod lang;
pub mod search;

use clap::{Args, Subcommand, ValueEnum};

/// Listing screen a search runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    /// Free search.
    Search,
    /// Category page; pins the first --category.
    Category,
    /// Brand page; pins the first --brand.
    Brand,
    /// Deals page; on-sale items only.
    Deals,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search text (omit to match everything).
    pub query: Option<String>,

    /// Category id to filter by (repeatable).
    #[arg(long)]
    pub category: Vec<String>,

    /// Brand name to filter by (repeatable).
    #[arg(long)]
    pub brand: Vec<String>,

    /// Price range bucket such as 0-50 (repeatable).
    #[arg(long)]
    pub price: Vec<String>,

    /// Only items on sale.
    #[arg(long)]
    pub on_sale: bool,

    /// Product status.
    #[arg(long)]
    pub status: Option<String>,

    /// Sort key (date_added_desc, date_added_asc, price_asc, price_desc, relevance).
    #[arg(long)]
    pub sort: Option<String>,

    /// Number of pages to load.
    #[arg(short, long, default_value = "1")]
    pub pages: u32,

    /// Listing screen to search as.
    #[arg(long, value_enum, default_value = "search")]
    pub scope: ScopeArg,

    /// Hide facet counts.
    #[arg(long)]
    pub no_facets: bool,
}

/// Arguments for the lang command.
#[derive(Args)]
pub struct LangArgs {
    #[command(subcommand)]
    pub command: Option<LangCommand>,
}

#[derive(Subcommand)]
pub enum LangCommand {
    /// Show the active language.
    Show,
    /// List supported languages.
    List,
    /// Switch language (prompts when no code is given).
    Switch {
        /// Language code, e.g. "ar" or "fr-CA".
        code: Option<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
