use super::{select_new, AppendOutcome, ArticleStore, StoreStats};
use crate::{db_utils::is_table_exists, utils, ArticleRecord, PipelineError};
use futures::TryStreamExt;
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::{collections::HashSet, path::PathBuf};
use tracing::{debug, info};

/// Articles in an embedded SQLite database, one row per normalized URL.
///
/// The full record is kept as JSON next to a few queryable columns.
pub struct SqliteStore {
    name: String,
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (or creates) `path` and the `<name>_articles` table in it.
    pub async fn new<P: Into<PathBuf>>(path: P, name: &str) -> Result<SqliteStore, PipelineError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| PipelineError::StorageWrite {
                    path: path.clone(),
                    source,
                })?;
        }

        let opt = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        let store = SqliteStore {
            name: format!("{}_articles", name),
            path,
            pool,
        };

        if !is_table_exists(&store.pool, &store.name).await? {
            debug!("Create table {}", store.name);
            let query = format!(
                r#"
                    CREATE TABLE {} (
                        id TEXT PRIMARY KEY,
                        created_at DATETIME,
                        title TEXT,
                        published_date DATE,
                        source TEXT,
                        is_negative BOOLEAN,
                        record TEXT NOT NULL
                    )
                "#,
                store.name
            );
            sqlx::query(query.as_str()).execute(&store.pool).await?;
        } else {
            debug!("Use table {}", store.name);
        }

        Ok(store)
    }

    pub async fn count(&self) -> Result<u32, PipelineError> {
        let query = format!("SELECT COUNT(*) FROM {}", self.name);
        Ok(sqlx::query(&query)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?)
    }
}

#[async_trait::async_trait]
impl ArticleStore for SqliteStore {
    async fn load(&self) -> Result<Vec<ArticleRecord>, PipelineError> {
        let mut records = vec![];
        let query = format!("SELECT record FROM {} ORDER BY rowid", self.name);
        let mut rows = sqlx::query(&query).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            let raw: String = row.try_get("record")?;
            let record = serde_json::from_str(&raw).map_err(|source| {
                PipelineError::StorageCorruption {
                    path: self.path.clone(),
                    source,
                }
            })?;
            records.push(record);
        }
        Ok(records)
    }

    async fn existing_keys(&self) -> Result<HashSet<String>, PipelineError> {
        let mut keys = HashSet::new();
        let query = format!("SELECT id FROM {}", self.name);
        for row in sqlx::query(&query).fetch_all(&self.pool).await? {
            keys.insert(row.try_get("id")?);
        }
        Ok(keys)
    }

    async fn append(
        &self,
        new_records: Vec<ArticleRecord>,
    ) -> Result<AppendOutcome, PipelineError> {
        let existing = self.existing_keys().await?;
        let kept = select_new(&existing, new_records);

        let mut inserted = 0;
        let mut tx = self.pool.begin().await?;
        let query = format!(
            r#"INSERT OR IGNORE INTO {} (
                id,
                title,
                published_date,
                source,
                is_negative,
                record,
                created_at) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            self.name
        );
        for record in &kept {
            let raw = serde_json::to_string(record).map_err(|e| PipelineError::StorageWrite {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;
            let res = sqlx::query(&query)
                .bind(record.url.as_str())
                .bind(record.title.as_str())
                .bind(record.published_date)
                .bind(record.source.as_str())
                .bind(record.is_negative())
                .bind(raw)
                .bind(utils::get_now())
                .execute(&mut tx)
                .await?;
            inserted += res.rows_affected() as usize;
        }
        tx.commit().await?;

        let merged = self.count().await? as usize;
        info!("Merged into {}: {} total ({} new added)", self.name, merged, inserted);
        Ok(AppendOutcome { merged, inserted })
    }

    async fn stats(&self) -> Result<StoreStats, PipelineError> {
        let query = format!(
            "SELECT COUNT(*), COALESCE(SUM(is_negative), 0) FROM {}",
            self.name
        );
        let row = sqlx::query(&query).fetch_one(&self.pool).await?;
        let total: i64 = row.try_get(0)?;
        let negative: i64 = row.try_get(1)?;
        Ok(StoreStats {
            total: total as usize,
            negative: negative as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use pretty_assertions::assert_eq;

    fn article(url: &str, negative: bool) -> ArticleRecord {
        let mut a = ArticleRecord::new(format!("Title of {}", url), url).with_content("Isi");
        a.source = "bisnis".to_string();
        a.annotate(
            Classification {
                negative_score: if negative { 4 } else { 0 },
                sentiment_score: 0.0,
                is_negative: negative,
            },
            utils::get_now(),
        );
        a
    }

    #[tokio::test]
    async fn create_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("news.db");
        assert!(!path.is_file());
        SqliteStore::new(&path, "test").await.unwrap();
        assert!(path.is_file());
    }

    #[tokio::test]
    async fn append_dedups_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("news.db"), "bisnis")
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 0);

        let outcome = store
            .append(vec![
                article("https://bisnis.com/read/20240217/1/1", true),
                article("https://bisnis.com/read/20240217/1/2", false),
                article("http://bisnis.com/read/20240217/1/2/", true),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, AppendOutcome { merged: 2, inserted: 2 });

        let outcome = store
            .append(vec![
                article("https://bisnis.com/read/20240217/1/1?utm_source=x", false),
                article("https://bisnis.com/read/20240217/1/3", true),
            ])
            .await
            .unwrap();
        assert_eq!(outcome, AppendOutcome { merged: 3, inserted: 1 });

        assert_eq!(
            store.stats().await.unwrap(),
            StoreStats { total: 3, negative: 2 }
        );
    }

    #[tokio::test]
    async fn load_keeps_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("news.db"), "order")
            .await
            .unwrap();
        let batch = vec![
            article("https://example.com/c", false),
            article("https://example.com/a", false),
            article("https://example.com/b", true),
        ];
        store.append(batch.clone()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), batch);
        assert_eq!(
            store.existing_keys().await.unwrap(),
            batch.iter().map(|r| r.url.clone()).collect::<HashSet<_>>()
        );
    }

    #[tokio::test]
    async fn corrupted_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("news.db"), "broken")
            .await
            .unwrap();
        sqlx::query("INSERT INTO broken_articles (id, record) VALUES ('x', '{not json')")
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(matches!(
            store.load().await,
            Err(PipelineError::StorageCorruption { .. })
        ));
    }
}
