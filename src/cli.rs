use crate::pricing::DEFAULT_RATE_URL;
use crate::scrapers::DEFAULT_LISTING_URL;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CSV: &str = "arriendos_valpo_normalizado.csv";
pub const DEFAULT_DB: &str = "inmobiliaria_chile.db";

#[derive(Parser, Debug)]
#[command(name = "arriendo-scout")]
#[command(about = "Scrape rental listings, normalize prices to CLP and load them into SQLite")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract listings to CSV, then migrate the CSV into SQLite
    Run(RunArgs),
    /// Extract listings and write the CSV only
    Extract(ExtractArgs),
    /// Load an existing CSV into SQLite
    Migrate(MigrateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Listing search URL (page 1)
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    pub url: String,

    /// CSV output path
    #[arg(short, long, default_value = DEFAULT_CSV)]
    pub output: PathBuf,

    /// Use the default UF rate instead of calling the indicator service
    #[arg(long)]
    pub skip_rate: bool,

    /// UF indicator endpoint
    #[arg(long, default_value = DEFAULT_RATE_URL)]
    pub rate_url: String,

    /// Never scrape more than this many pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Lower bound of the pause between page requests
    #[arg(long, default_value_t = 2000)]
    pub min_delay_ms: u64,

    /// Upper bound of the pause between page requests
    #[arg(long, default_value_t = 4000)]
    pub max_delay_ms: u64,

    /// JSON file overriding the listing selectors
    #[arg(long)]
    pub selectors: Option<PathBuf>,
}

impl Default for ExtractArgs {
    fn default() -> Self {
        Self {
            url: DEFAULT_LISTING_URL.to_string(),
            output: PathBuf::from(DEFAULT_CSV),
            skip_rate: false,
            rate_url: DEFAULT_RATE_URL.to_string(),
            max_pages: None,
            min_delay_ms: 2000,
            max_delay_ms: 4000,
            selectors: None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub extract: ExtractArgs,

    /// SQLite database path
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            extract: ExtractArgs::default(),
            db: PathBuf::from(DEFAULT_DB),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// CSV produced by `extract`
    #[arg(long, default_value = DEFAULT_CSV)]
    pub csv: PathBuf,

    /// SQLite database path
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,
}
