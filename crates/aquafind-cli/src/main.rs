//! AquaFind - find drinking fountains near a point from the terminal.
//!
//! Results come from the local cache while it is fresh (24 hours) and from
//! the OpenStreetMap Overpass API otherwise.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aquafind_core::utils::{format_distance, truncate_string};
use aquafind_core::{
    CacheStore, Category, Config, Coordinate, FountainListView, FountainRepository,
    OverpassClient, SortOption,
};

/// Directory for daily rolling log files; stderr only when unset
const ENV_LOG_DIR: &str = "AQUAFIND_LOG_DIR";

/// Width of the name column in list output
const NAME_WIDTH: usize = 36;

#[derive(Debug, Parser)]
#[command(
    name = "aquafind",
    about = "Find drinking fountains near a point",
    version,
    after_help = "Environment: AQUAFIND_OVERPASS_URL, AQUAFIND_CACHE_DIR, AQUAFIND_RADIUS, \
                  AQUAFIND_LOG_DIR, RUST_LOG"
)]
struct Cli {
    /// Write daily rolling log files to this directory
    #[arg(long, global = true, env = ENV_LOG_DIR, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List fountains around a point (cache first)
    Nearby(ListArgs),
    /// Drop the cache and fetch again
    Refresh(ListArgs),
    /// Show whether the cache is valid and how old it is
    CacheStatus,
    /// Remove the cached fountains
    ClearCache,
    /// Write the current configuration to the config file
    InitConfig,
}

/// Options shared by `nearby` and `refresh`
#[derive(Debug, Args)]
struct ListArgs {
    /// Latitude of the search center in decimal degrees
    #[arg(allow_negative_numbers = true)]
    lat: f64,

    /// Longitude of the search center in decimal degrees
    #[arg(allow_negative_numbers = true)]
    lon: f64,

    /// Search radius in meters [default: configured radius]
    #[arg(long, value_name = "M")]
    radius: Option<f64>,

    /// Keep fountains whose name, address or description contains TEXT
    #[arg(long, value_name = "TEXT", default_value = "")]
    search: String,

    /// Only show one category (e.g. water-station, refill)
    #[arg(long, value_name = "NAME", value_parser = parse_category)]
    category: Option<Category>,

    #[arg(long, value_enum, default_value_t = SortKey::Distance)]
    sort: SortKey,
}

impl ListArgs {
    fn center(&self) -> Result<Coordinate> {
        Ok(Coordinate::new(self.lat, self.lon)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SortKey {
    Distance,
    Name,
    Rating,
    Newest,
}

impl From<SortKey> for SortOption {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Distance => SortOption::Distance,
            SortKey::Name => SortOption::Name,
            SortKey::Rating => SortOption::Rating,
            SortKey::Newest => SortOption::Newest,
        }
    }
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("unknown category: {}", value))
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) if !dir.as_os_str().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "aquafind.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .with(filter)
                .init();
            Some(guard)
        }
        _ => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn build_repository(config: &Config) -> Result<FountainRepository> {
    let client = OverpassClient::with_endpoint(&config.overpass_url, &config.user_agent)?;
    let cache = CacheStore::new(config.cache_dir()?);
    Ok(FountainRepository::new(client, cache))
}

async fn list(config: &Config, args: ListArgs, refresh: bool) -> Result<()> {
    let center = args.center()?;
    let radius = args.radius.unwrap_or(config.default_radius_meters);
    let mut repository = build_repository(config)?;

    // The query center doubles as the caller location for distances
    let mut view = FountainListView::with_location(center);
    view.update_search_text(args.search);
    view.update_category(args.category.unwrap_or(Category::All));
    view.update_sort_option(args.sort.into());

    let result = if refresh {
        view.refresh(&mut repository, center, radius).await
    } else {
        view.load(&mut repository, center, radius).await
    };

    if let Some(message) = view.error_message() {
        eprintln!("Error: {}", message);
    }
    result?;

    print_list(&view);
    Ok(())
}

fn print_list(view: &FountainListView) {
    if view.visible().is_empty() {
        println!("No fountains found.");
        return;
    }

    for item in view.visible() {
        let f = &item.fountain;
        let distance = item
            .distance_meters
            .map(format_distance)
            .unwrap_or_else(|| "-".to_string());
        let status = if f.is_operational { "" } else { " [not operational]" };
        println!(
            "{:<width$}  {:>9}  {:>3}  {}{}",
            truncate_string(&f.name, NAME_WIDTH),
            distance,
            f.formatted_rating(),
            f.description,
            status,
            width = NAME_WIDTH,
        );
    }
    println!(
        "\n{} of {} fountains (sorted by {})",
        view.visible().len(),
        view.fountains().len(),
        view.query().sort
    );
}

fn cache_status(config: &Config) -> Result<()> {
    let repository = build_repository(config)?;
    let status = repository.cache_status();
    println!("Cache file: {}", status.path.display());
    println!("Valid:      {}", if status.valid { "yes" } else { "no" });
    println!("Updated:    {}", status.age.unwrap_or_else(|| "never".to_string()));
    Ok(())
}

fn clear_cache(config: &Config) -> Result<()> {
    let cache = CacheStore::new(config.cache_dir()?);
    cache.clear();
    println!("Cache cleared.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _guard = init_tracing(cli.log_dir.as_deref());
    info!("AquaFind starting");

    let config = Config::load()?;

    match cli.command {
        Command::Nearby(args) => list(&config, args, false).await,
        Command::Refresh(args) => list(&config, args, true).await,
        Command::CacheStatus => cache_status(&config),
        Command::ClearCache => clear_cache(&config),
        Command::InitConfig => {
            config.save()?;
            println!("Configuration saved.");
            Ok(())
        }
    }
}
