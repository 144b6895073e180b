use sqlx::SqlitePool;

pub(crate) async fn is_table_exists(
    pool: &SqlitePool,
    table_name: &str,
) -> Result<bool, sqlx::Error> {
    Ok(
        sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name = ?")
            .bind(table_name)
            .fetch_optional(pool)
            .await?
            .is_some(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqliteConnectOptions;

    #[tokio::test]
    async fn finds_created_tables_only() {
        let dir = tempfile::tempdir().unwrap();
        let opt = SqliteConnectOptions::new()
            .filename(dir.path().join("news.db"))
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await.unwrap();
        assert!(!is_table_exists(&pool, "antara_articles").await.unwrap());

        sqlx::query("CREATE TABLE antara_articles (id TEXT PRIMARY KEY)")
            .execute(&pool)
            .await
            .unwrap();
        assert!(is_table_exists(&pool, "antara_articles").await.unwrap());
        assert!(!is_table_exists(&pool, "bisnis_articles").await.unwrap());
    }
}
