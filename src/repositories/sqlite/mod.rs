//! `SQLite` storage

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    raw_sql,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

use crate::repositories::RepositoryError;

mod carts;
mod products;
mod rows;

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Product and cart storage backed by a single `SQLite` database.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `database_url` and make sure the
    /// schema exists.
    ///
    /// `sqlite::memory:` gives a private database that lives as long as the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the database cannot be opened
    /// or the schema cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // A single long-lived connection keeps in-memory databases alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        raw_sql(SCHEMA_SQL).execute(&pool).await?;

        info!(database_url, "opened database");

        Ok(Self { pool })
    }

    /// Close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::repositories::ProductRepository;

    #[tokio::test]
    async fn connect_creates_empty_schema() -> TestResult {
        let store = SqliteStore::connect("sqlite::memory:").await?;

        assert!(store.list_all().await?.is_empty());
        assert!(store.list_units().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn connect_is_idempotent_for_file_databases() -> TestResult {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}", dir.path().join("store.db").display());

        let first = SqliteStore::connect(&url).await?;
        first.close().await;

        let second = SqliteStore::connect(&url).await?;

        assert!(second.list_all().await?.is_empty());

        Ok(())
    }
}
