mod crawl;
mod export;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use gmdb_core::{Collection, Store};
use gmdb_db::PgStore;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gmdb-cli")]
#[command(about = "Video-game market data: sales bulletins, review scores and reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Crawl the weekly sales bulletin index and store unseen windows
    CrawlBulletins {
        /// Walk every index page advertised by the pagination block
        #[arg(long, conflicts_with_all = ["page", "poll"])]
        all_pages: bool,

        /// Crawl a single index page
        #[arg(long, conflicts_with = "poll", value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,

        /// Crawl page 1; if nothing is new, back off once and look again
        #[arg(long)]
        poll: bool,
    },
    /// Crawl the review aggregator and upsert scores by title
    CrawlScores {
        /// Override the configured page limit
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_pages: Option<u32>,
    },
    /// Write the combined sales and scores report as CSV
    Report {
        /// Trailing window in days (defaults to GMDB_REPORT_WINDOW_DAYS)
        #[arg(long)]
        days: Option<u32>,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Write every stored score as CSV
    ExportScores {
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Delete every document of one collection
    Clear {
        /// `bulletins` or `scores`
        #[arg(value_parser = parse_collection)]
        collection: Collection,
    },
}

fn parse_collection(raw: &str) -> Result<Collection, String> {
    raw.parse()
        .map_err(|e: gmdb_core::CoreError| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    dotenvy::dotenv().ok();
    let config = gmdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = gmdb_db::PoolConfig::from_app_config(&config);
    let pool = gmdb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = gmdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::CrawlBulletins {
            all_pages,
            page,
            poll,
        } => {
            let mode = crawl::crawl_mode(all_pages, page, poll);
            crawl::run_bulletins(&config, &PgStore::new(pool), mode).await?;
        }
        Commands::CrawlScores { max_pages } => {
            crawl::run_scores(&config, &PgStore::new(pool), max_pages).await?;
        }
        Commands::Report { days, out } => {
            let days = days.unwrap_or(config.report_window_days);
            export::write_report(&PgStore::new(pool), days, &out).await?;
        }
        Commands::ExportScores { out } => {
            export::write_scores(&PgStore::new(pool), &out).await?;
        }
        Commands::Clear { collection } => {
            let deleted = PgStore::new(pool).delete_all(collection).await?;
            tracing::warn!(%collection, deleted, "collection cleared");
            println!("deleted {deleted} {collection} document(s)");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
