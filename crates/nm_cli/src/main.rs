use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nm_core::config::{DEFAULT_HOMEPAGE, RAW_CONTAINER, SENTIMENT_CONTAINER};
use nm_core::Config;
use nm_scrapers::ScraperManager;
use nm_sentiment::Annotator;
use nm_storage::EventedStore;
use nm_web::{AppState, MockGenerator};
use tracing::{error, info};

mod logging;
mod timer;

use timer::TimerTrigger;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape news, score its sentiment and store both as blobs", long_about = None)]
pub struct Cli {
    /// Blob storage connection string: memory://, file://<dir> or an Azure
    /// connection string with a SharedAccessSignature or AccountName and AccountKey
    #[arg(long, env = "BLOB_CONNECTION_STRING", hide_env_values = true)]
    connection_string: String,
    #[arg(long, env = "NEWSMOOD_RAW_CONTAINER", default_value = RAW_CONTAINER)]
    raw_container: String,
    #[arg(long, env = "NEWSMOOD_SENTIMENT_CONTAINER", default_value = SENTIMENT_CONTAINER)]
    sentiment_container: String,
    #[arg(long, env = "NEWSMOOD_HOMEPAGE", default_value = DEFAULT_HOMEPAGE)]
    homepage: String,
    /// Maximum number of article links followed per scrape run
    #[arg(long, env = "NEWSMOOD_MAX_CANDIDATES", default_value_t = 10)]
    max_candidates: usize,
    /// Article pages fetched at once
    #[arg(long, env = "NEWSMOOD_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,
    /// Mock articles written at once
    #[arg(long, env = "NEWSMOOD_MOCK_CONCURRENCY", default_value_t = 16)]
    mock_concurrency: usize,
    /// Largest count a mock request may ask for
    #[arg(long, env = "NEWSMOOD_MOCK_MAX_COUNT", default_value_t = 10_000)]
    mock_max_count: usize,
    #[arg(long, env = "NEWSMOOD_FETCH_TIMEOUT", value_parser = humantime::parse_duration, default_value = "30s")]
    fetch_timeout: Duration,
    #[arg(long, env = "NEWSMOOD_STORAGE_TIMEOUT", value_parser = humantime::parse_duration, default_value = "30s")]
    storage_timeout: Duration,
    /// Budget for one scrape run, annotation or mock request
    #[arg(long, env = "NEWSMOOD_INVOCATION_TIMEOUT", value_parser = humantime::parse_duration, default_value = "5m")]
    invocation_timeout: Duration,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the scrape timer, the annotator and the HTTP trigger together.
    /// Raw articles stored without an annotation are annotated on startup.
    Serve {
        #[arg(long, env = "NEWSMOOD_ADDR", default_value = "0.0.0.0:7071")]
        addr: SocketAddr,
        /// Time between scrape runs (e.g. 1h, 30m, 1h15m30s)
        #[arg(long, env = "NEWSMOOD_SCRAPE_INTERVAL", value_parser = parse_interval, default_value = "1h")]
        interval: Duration,
        /// Wait a full interval before the first scrape run
        #[arg(long)]
        no_run_on_startup: bool,
    },
    /// Scrape once and exit
    Scrape,
    /// Annotate one raw article that is already stored
    Annotate { key: String },
    /// Annotate every stored raw article that has no annotation yet
    Backfill,
    /// Write mock articles into the raw container and exit
    Generate {
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        count: i64,
    },
}

/// A humantime duration that is not zero.
fn parse_interval(value: &str) -> std::result::Result<Duration, String> {
    let interval = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("interval must be greater than zero".to_string());
    }
    Ok(interval)
}

impl Cli {
    fn config(&self) -> nm_core::Result<Config> {
        let mut config = Config::new(self.connection_string.clone())?;
        config.containers.raw = self.raw_container.clone();
        config.containers.sentiment = self.sentiment_container.clone();
        config.scraper.homepage = self.homepage.clone();
        config.scraper.max_candidates = self.max_candidates;
        config.scraper.concurrency = self.concurrency;
        config.scraper.fetch_timeout = self.fetch_timeout;
        config.mock.concurrency = self.mock_concurrency;
        config.mock.max_count = self.mock_max_count;
        config.mock.default_count = config.mock.default_count.min(self.mock_max_count);
        config.storage_timeout = self.storage_timeout;
        config.invocation_timeout = self.invocation_timeout;
        config.validate()?;
        Ok(config)
    }
}

async fn serve(
    config: Config,
    store: Arc<EventedStore>,
    addr: SocketAddr,
    interval: Duration,
    run_on_startup: bool,
) -> Result<()> {
    let trigger = TimerTrigger::new(interval, run_on_startup)?;

    // Subscribe before anything can write to the raw container.
    let subscription = store.subscribe(&config.containers.raw);
    let annotator = Arc::new(Annotator::new(&config, store.clone(), nm_sentiment::default_scorer()));
    tokio::spawn(async move {
        // Writes that land during the sweep queue up on the subscription.
        if let Err(e) = annotator.backfill().await {
            error!(kind = e.kind(), error = %e, "Backfill failed");
        }
        if let Err(e) = annotator.run(subscription).await {
            error!(kind = e.kind(), error = %e, "Annotator stopped");
        }
    });

    let manager = Arc::new(ScraperManager::from_config(&config, store.clone())?);
    tokio::spawn(trigger.run("scrape", move || {
        let manager = manager.clone();
        async move {
            if let Err(e) = manager.run().await {
                error!(kind = e.kind(), error = %e, "Scrape run failed");
            }
        }
    }));

    let app = nm_web::create_app(AppState {
        generator: MockGenerator::new(&config, store.clone()),
    });
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("🚀 HTTP trigger listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("👋 Shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    let config = cli.config().context("invalid configuration")?;
    info!(?config, "⚙️ Configuration loaded");
    let store = nm_storage::connect(&config.connection_string, config.storage_timeout)
        .await
        .context("failed to open blob storage")?;

    match cli.command {
        Commands::Serve {
            addr,
            interval,
            no_run_on_startup,
        } => serve(config, store, addr, interval, !no_run_on_startup).await?,
        Commands::Scrape => {
            let manager = ScraperManager::from_config(&config, store.clone())?;
            let report = manager.run().await.context("scrape run failed")?;
            for key in &report.written {
                println!("{}", key);
            }
            for failure in &report.failures {
                eprintln!("{}: {}", failure.url, failure.error);
            }
        }
        Commands::Annotate { key } => {
            let annotator = Annotator::new(&config, store.clone(), nm_sentiment::default_scorer());
            let annotation = annotator
                .annotate_key(&key)
                .await
                .with_context(|| format!("failed to annotate {}", key))?;
            println!("{}", String::from_utf8_lossy(&annotation.bytes));
        }
        Commands::Backfill => {
            let annotator = Annotator::new(&config, store.clone(), nm_sentiment::default_scorer());
            let report = annotator.backfill().await.context("backfill failed")?;
            println!(
                "pending {}, annotated {}, failed {}",
                report.pending, report.annotated, report.failed
            );
        }
        Commands::Generate { count } => {
            let generator = MockGenerator::new(&config, store.clone());
            let count = generator.validate_count(Some(count))?;
            let report = generator.generate(count).await.context("mock generation failed")?;
            println!(
                "requested {}, written {}, failed {}",
                report.requested, report.written, report.failed
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["newsmood", "--connection-string", "memory://", "scrape"]).unwrap();
        let config = cli.config().unwrap();
        assert_eq!(config.containers.raw, "articles-data");
        assert_eq!(config.containers.sentiment, "articles-sentiment");
        assert_eq!(config.scraper.max_candidates, 10);
        assert_eq!(config.invocation_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_cli_durations_and_overrides() {
        let cli = Cli::try_parse_from([
            "newsmood",
            "--connection-string",
            "memory://",
            "--fetch-timeout",
            "1m 30s",
            "--mock-max-count",
            "5",
            "serve",
            "--interval",
            "30m",
            "--no-run-on-startup",
        ])
        .unwrap();
        let config = cli.config().unwrap();
        assert_eq!(config.scraper.fetch_timeout, Duration::from_secs(90));
        assert_eq!(config.mock.max_count, 5);
        assert_eq!(config.mock.default_count, 5);
        match cli.command {
            Commands::Serve {
                interval,
                no_run_on_startup,
                ..
            } => {
                assert_eq!(interval, Duration::from_secs(1800));
                assert!(no_run_on_startup);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        for interval in ["0s", "0ms"] {
            let result = Cli::try_parse_from([
                "newsmood",
                "--connection-string",
                "memory://",
                "serve",
                "--interval",
                interval,
            ]);
            assert!(result.is_err(), "{} was accepted", interval);
        }
        assert_eq!(parse_interval("90s").unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn test_cli_rejects_bad_config() {
        let cli = Cli::try_parse_from([
            "newsmood",
            "--connection-string",
            "memory://",
            "--sentiment-container",
            "articles-data",
            "scrape",
        ])
        .unwrap();
        assert!(cli.config().is_err());

        let cli = Cli::try_parse_from(["newsmood", "--connection-string", "memory://", "generate", "--count", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Generate { count: -1 }));
    }

    #[test]
    fn test_cli_backfill_command() {
        let cli = Cli::try_parse_from(["newsmood", "--connection-string", "memory://", "backfill"]).unwrap();
        assert!(matches!(cli.command, Commands::Backfill));
    }
}
