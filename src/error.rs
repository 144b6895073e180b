use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Stored collection {path} is corrupted: {source}")]
    StorageCorruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write collection {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read collection {path}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error")]
    Database(#[from] sqlx::error::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed feed: {0}")]
    Feed(#[from] quick_xml::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Errors that must abort the run instead of being logged per article.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            PipelineError::StorageCorruption { .. }
                | PipelineError::StorageWrite { .. }
                | PipelineError::StorageRead { .. }
                | PipelineError::Database(_)
        )
    }
}
