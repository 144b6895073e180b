use super::{select_new, AppendOutcome, ArticleStore};
use crate::{normalize::normalize_url, ArticleRecord, PipelineError};
use std::{
    collections::HashSet,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// The collection as one pretty-printed JSON array on disk.
///
/// Writes go to a temporary file next to the target which is then renamed
/// over it, so an interrupted run leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, records: &[ArticleRecord]) -> Result<(), PipelineError> {
        let mut bytes = serde_json::to_vec_pretty(records).map_err(|e| {
            PipelineError::StorageWrite {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            }
        })?;
        bytes.push(b'\n');

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
            .and_then(|res| res)
            .map_err(|source| PipelineError::StorageWrite {
                path: self.path.clone(),
                source,
            })
    }
}

fn replace_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait::async_trait]
impl ArticleStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<ArticleRecord>, PipelineError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No collection at {} yet", self.path.display());
                return Ok(vec![]);
            }
            Err(source) => {
                return Err(PipelineError::StorageRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| PipelineError::StorageCorruption {
            path: self.path.clone(),
            source,
        })
    }

    async fn append(
        &self,
        new_records: Vec<ArticleRecord>,
    ) -> Result<AppendOutcome, PipelineError> {
        let mut collection = self.load().await?;
        let existing: HashSet<String> = collection.iter().map(|r| normalize_url(&r.url)).collect();

        let received = new_records.len();
        let kept = select_new(&existing, new_records);
        let inserted = kept.len();

        if inserted > 0 {
            collection.extend(kept);
            self.write(&collection).await?;
        }

        info!(
            "Merged: {} existing + {} new = {} total ({} new added)",
            collection.len() - inserted,
            received,
            collection.len(),
            inserted
        );

        Ok(AppendOutcome {
            merged: collection.len(),
            inserted,
        })
    }
}
