use clap::Parser;
use indonesian_business_news::{ArticleStore, JsonFileStore, SqliteStore};
use std::path::PathBuf;

/// Print how many articles a collection holds and how many are negative.
#[derive(Debug, Parser)]
struct Args {
    /// JSON collection file, or SQLite database with `--table`.
    path: PathBuf,

    /// Source name of the SQLite table to read.
    #[arg(long)]
    table: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stats = match args.table.as_deref() {
        Some(name) => SqliteStore::new(&args.path, name).await?.stats().await?,
        None => JsonFileStore::new(&args.path).stats().await?,
    };

    println!("Collection      : {}", args.path.display());
    println!("Total           : {}", stats.total);
    println!("Negative        : {}", stats.negative);
    Ok(())
}
