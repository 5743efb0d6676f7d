use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

mod config;
mod models;
mod parsers;
mod pipeline;
mod scrapers;
mod storage;

use crate::config::Config;
use crate::models::{Price, StoredGame};
use crate::pipeline::{EventBus, Pipeline, PipelineRunner};
use crate::scrapers::WebDriverBrowser;
use crate::storage::{GameFilter, SqliteStorage, SqliteBackend, Storage};

#[derive(Parser)]
#[command(name = "game-scout", version, about = "Scrape the store listing into SQLite and query it")]
struct Cli {
    /// Configuration file (defaults to ./game_scout.toml when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scrape, normalize and store the listing once, streaming status events to stdout
    Run,
    /// Read stored games
    Query(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Substring of the title
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// Exact review label, e.g. "Muito positivas"
    #[arg(long)]
    label: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    /// Print rows as JSON lines
    #[arg(long)]
    json: bool,
}

impl QueryArgs {
    fn filter(&self) -> GameFilter {
        GameFilter {
            title_contains: self.title.clone(),
            min_price: self.min_price.map(Price::from_f64),
            max_price: self.max_price.map(Price::from_f64),
            review_label: self.label.clone(),
            limit: self.limit,
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("game_scout=info".parse()?);

    // Logs go to stderr so stdout carries only events and rows
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let config = Arc::new(Config::load(cli.config.as_deref())?);

    match cli.command {
        Command::Run => run(config).await,
        Command::Query(args) => query(&config, &args).await,
    }
}

async fn run(config: Arc<Config>) -> Result<()> {
    info!("Starting Game Scout run against {}", config.target_url);

    let bus = EventBus::new();
    let mut events = bus.subscribe();

    let pipeline = Pipeline::new(
        config.clone(),
        Arc::new(WebDriverBrowser::new(config.clone())),
        Arc::new(SqliteBackend::new(&config.database_path)),
        Arc::new(bus.clone()),
    );
    let runner = PipelineRunner::new(pipeline);
    let mut handle = runner.trigger()?;

    // Relay events while the run is in flight
    let report = loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} status events", skipped),
                Err(RecvError::Closed) => break (&mut handle).await.context("Pipeline task panicked")?,
            },
            finished = &mut handle => break finished.context("Pipeline task panicked")?,
        }
    };
    while let Ok(event) = events.try_recv() {
        println!("{}", serde_json::to_string(&event)?);
    }

    info!(
        "Run finished: {} extracted, {} inserted, {} updated",
        report.extracted, report.inserted, report.updated
    );

    if let Some(error) = report.error {
        anyhow::bail!("Pipeline failed: {}", error);
    }
    Ok(())
}

async fn query(config: &Config, args: &QueryArgs) -> Result<()> {
    let storage = SqliteStorage::open(&config.database_path)?;
    storage.ensure_schema().await?;

    let games = storage
        .query_games(&args.filter())
        .await
        .context("Failed to query games")?;

    if args.json {
        for game in &games {
            println!("{}", serde_json::to_string(game)?);
        }
    } else {
        print_table(&games);
    }

    info!("{} games matched", games.len());
    Ok(())
}

fn print_table(games: &[StoredGame]) {
    println!(
        "{:<50} {:>10} {:<24} {:>6} {:>10}",
        "Title", "Price", "Review", "%", "Reviews"
    );
    for row in games {
        let game = &row.game;
        let title: String = game.title.chars().take(50).collect();
        println!(
            "{:<50} {:>10} {:<24} {:>6} {:>10}",
            title, game.price.to_string(), game.review_label, game.review_percent_positive, game.review_count
        );
    }
}
