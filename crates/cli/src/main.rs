use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tripdesk_compositor::{BookingFinder, SearchSettings};
use tripdesk_core::{DEFAULT_COMPOSITOR_BASE_URL, MicrositeConfig, env_non_empty, env_or};
use tripdesk_llm::LlmClient;
use tripdesk_service::Services;
use tripdesk_storage::PgStorage;

mod commands;

#[derive(Parser)]
#[command(name = "tripdesk")]
#[command(about = "Travel agency back office for Travel Compositor bookings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Create or update the database schema
    Migrate,
    /// Locate a booking by reference in the database or any microsite
    FindBooking {
        reference: String,
        /// Skip the database and cache and ask Travel Compositor
        #[arg(long)]
        refresh: bool,
    },
    /// Import bookings created between two dates (YYYY-MM-DD)
    ImportBookings {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(short, long)]
        microsite: Option<String>,
    },
    /// Import the travel idea catalogue
    ImportIdeas {
        #[arg(short, long)]
        microsite: Option<String>,
    },
    /// List configured microsites (credentials are never printed)
    Microsites,
}

fn database_url() -> Result<String> {
    env_non_empty("DATABASE_URL").context("DATABASE_URL environment variable must be set")
}

fn compositor_base_url() -> String {
    env_or("TRAVEL_COMPOSITOR_BASE_URL", DEFAULT_COMPOSITOR_BASE_URL)
}

pub(crate) fn build_finder() -> Result<Arc<BookingFinder>> {
    let configs = MicrositeConfig::load_all_from_env();
    if configs.is_empty() {
        tracing::warn!("no Travel Compositor credentials configured, upstream search disabled");
    }
    let finder = BookingFinder::from_configs(configs, &compositor_base_url(), SearchSettings::from_env())?;
    Ok(Arc::new(finder))
}

pub(crate) async fn connect_storage() -> Result<Arc<PgStorage>> {
    let storage = PgStorage::new(&database_url()?).await.context("failed to open database")?;
    Ok(Arc::new(storage))
}

pub(crate) async fn build_services() -> Result<(Services, Arc<BookingFinder>)> {
    let storage = connect_storage().await?;
    let finder = build_finder()?;
    let llm = LlmClient::from_env()?.map(Arc::new);
    Ok((Services::new(storage, Arc::clone(&finder), llm), finder))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Migrate => commands::migrate::run().await?,
        Commands::FindBooking { reference, refresh } => {
            commands::find::run(&reference, refresh).await?;
        },
        Commands::ImportBookings { from, to, microsite } => {
            commands::import::run_bookings(from, to, microsite).await?;
        },
        Commands::ImportIdeas { microsite } => commands::import::run_ideas(microsite).await?,
        Commands::Microsites => {
            let summaries: Vec<_> = MicrositeConfig::load_all_from_env()
                .iter()
                .map(tripdesk_core::MicrositeSummary::from)
                .collect();
            print_json(&summaries)?;
        },
    }

    Ok(())
}
