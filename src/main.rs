use clap::{Parser, ValueEnum};
use indonesian_business_news::{
    run_pipeline, ArticleStore, Classifier, ClassifierConfig, ErrorLog, FetchConfig, Fetcher,
    JsonFileStore, RunOptions, SourceKind, SqliteStore,
};
use std::{path::PathBuf, time::Duration};
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Json,
    Sqlite,
}

/// Scrape Indonesian business news, flag negative events and append them to a
/// deduplicated collection.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[arg(short, long, value_enum)]
    source: SourceKind,

    /// Number of days back from today, today included.
    #[arg(short, long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=3650))]
    days: u32,

    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, default_value = "logs")]
    logs_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Json)]
    backend: Backend,

    /// JSON file with keyword_weights, keyword_threshold and sentiment_threshold.
    /// Defaults to the preset of the source.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    keyword_threshold: Option<u32>,

    #[arg(long, allow_hyphen_values = true)]
    sentiment_threshold: Option<f64>,

    /// Minimum pause between two requests.
    #[arg(long, default_value_t = 2000)]
    delay_ms: u64,

    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Listing pages visited per index.
    #[arg(long, default_value_t = 20)]
    max_pages: u32,

    /// Shorter article bodies are logged as failures and skipped.
    #[arg(long, default_value_t = 100)]
    min_content_len: usize,
}

async fn classifier_config(cli: &Cli) -> Result<ClassifierConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config.as_ref() {
        Some(path) => ClassifierConfig::from_file(path).await?,
        None => ClassifierConfig::preset(cli.source.name()),
    };
    if let Some(threshold) = cli.keyword_threshold {
        config.keyword_threshold = threshold;
    }
    if let Some(threshold) = cli.sentiment_threshold {
        config.sentiment_threshold = threshold;
    }
    config.validate()?;
    Ok(config)
}

async fn open_store(cli: &Cli) -> Result<Box<dyn ArticleStore>, Box<dyn std::error::Error>> {
    let name = cli.source.name();
    let store: Box<dyn ArticleStore> = match cli.backend {
        Backend::Json => Box::new(JsonFileStore::new(
            cli.data_dir.join(format!("{}_news.json", name)),
        )),
        Backend::Sqlite => Box::new(SqliteStore::new(cli.data_dir.join("news.db"), name).await?),
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
                "info,html5ever=error,selectors=error,hyper=warn,reqwest=info,sqlx=warn".into()
            }),
        )
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();

    let classifier = Classifier::new(classifier_config(&cli).await?);
    let fetcher = Fetcher::new(FetchConfig {
        request_delay: Duration::from_millis(cli.delay_ms),
        max_retries: cli.max_retries,
        ..FetchConfig::default()
    })?;
    let store = open_store(&cli).await?;
    let source = cli.source.build();

    let today = chrono::Local::now().naive_local().date();
    let errors = ErrorLog::new(&cli.logs_dir, today);
    let options = RunOptions {
        days: cli.days,
        max_pages: cli.max_pages,
        min_content_len: cli.min_content_len,
    };

    match run_pipeline(
        source.as_ref(),
        &fetcher,
        store.as_ref(),
        &classifier,
        &errors,
        &options,
        today,
    )
    .await
    {
        Ok(summary) => {
            info!("Run finished, failures in {}", errors.path().display());
            println!("{}", summary);
            Ok(())
        }
        Err(e) if e.is_storage() => {
            error!("Aborting, the stored collection was left untouched: {}", e);
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
