use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::warn;

/// Per-day failure log, one `<url> | <message>` line per failure.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new<P: AsRef<Path>>(logs_dir: P, day: NaiveDate) -> ErrorLog {
        ErrorLog {
            path: logs_dir
                .as_ref()
                .join(format!("{}_errors.log", day.format("%Y-%m-%d"))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a log that cannot be written is reported through tracing
    /// and the run goes on.
    pub async fn record<U: AsRef<str>, M: AsRef<str>>(&self, url: U, message: M) {
        let line = format!(
            "{} | {}\n",
            url.as_ref(),
            message.as_ref().replace('\n', " ")
        );
        warn!("{}", line.trim_end());
        if let Err(e) = self.append(&line).await {
            warn!("Cannot write error log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
