//! PostgreSQL implementation of the URL store.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::domain::delete_request::PendingDelete;
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::{
    BatchDeletable, Pingable, UrlReader, UrlStore, UrlWriter, UserScoped,
};
use crate::error::StoreError;
use crate::utils::db_error::is_unique_violation_on_full_url;

/// Maximum rows per multi-row statement.
///
/// Keeps the bind parameter count (3 per inserted row) well below the
/// PostgreSQL protocol limit of 65535.
pub const BATCH_CHUNK_SIZE: usize = 1000;

/// One multi-row `INSERT` per chunk of at most [`BATCH_CHUNK_SIZE`] records.
fn insert_statements(records: &[UrlRecord]) -> Vec<QueryBuilder<'_, Postgres>> {
    records
        .chunks(BATCH_CHUNK_SIZE)
        .map(|chunk| {
            let mut query =
                QueryBuilder::<Postgres>::new("INSERT INTO short_url (full_url, short_url, user_id) ");
            query.push_values(chunk, |mut row, record| {
                row.push_bind(record.original_url.as_str())
                    .push_bind(record.short_url.as_str())
                    .push_bind(record.user_id.as_str());
            });
            query
        })
        .collect()
}

#[derive(Debug, FromRow)]
struct UrlRow {
    full_url: String,
    short_url: String,
    user_id: String,
    is_deleted: bool,
}

impl From<UrlRow> for UrlRecord {
    fn from(row: UrlRow) -> Self {
        Self {
            short_url: row.short_url,
            original_url: row.full_url,
            user_id: row.user_id,
            deleted: row.is_deleted,
        }
    }
}

/// PostgreSQL store with conflict detection, per-user scoping and soft
/// deletion.
///
/// Uses runtime-checked queries; the schema lives in `migrations/`.
pub struct PgUrlStore {
    pool: Arc<PgPool>,
}

impl PgUrlStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    async fn find_short_url_by_full(&self, full_url: &str) -> Result<String, StoreError> {
        let short_url =
            sqlx::query_scalar::<_, String>("SELECT short_url FROM short_url WHERE full_url = $1")
                .bind(full_url)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(short_url)
    }
}

#[async_trait]
impl UrlReader for PgUrlStore {
    async fn get_url(&self, short_url: &str) -> Result<String, StoreError> {
        let row = sqlx::query_as::<_, (String, bool)>(
            "SELECT full_url, is_deleted FROM short_url WHERE short_url = $1",
        )
        .bind(short_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some((_, true)) => Err(StoreError::deleted(short_url)),
            Some((full_url, false)) => Ok(full_url),
            None => Err(StoreError::not_found(short_url)),
        }
    }
}

#[async_trait]
impl UrlWriter for PgUrlStore {
    async fn save_url(&self, record: UrlRecord) -> Result<(), StoreError> {
        let result =
            sqlx::query("INSERT INTO short_url (full_url, short_url, user_id) VALUES ($1, $2, $3)")
                .bind(&record.original_url)
                .bind(&record.short_url)
                .bind(&record.user_id)
                .execute(self.pool.as_ref())
                .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation_on_full_url(&e) => {
                let existing = self.find_short_url_by_full(&record.original_url).await?;
                debug!(short_url = %existing, "Original URL already shortened");
                Err(StoreError::conflict(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        // Dropping `tx` on an early return rolls back every chunk.
        let mut tx = self.pool.begin().await?;

        for mut query in insert_statements(&records) {
            query.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        debug!(count = records.len(), "Saved URL batch");

        Ok(())
    }
}

#[async_trait]
impl Pingable for PgUrlStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}

#[async_trait]
impl UserScoped for PgUrlStore {
    async fn get_urls_by_user_id(&self, user_id: &str) -> Result<Vec<UrlRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UrlRow>(
            "SELECT full_url, short_url, user_id, is_deleted FROM short_url WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn filter_urls_by_user_id(
        &self,
        user_id: &str,
        candidates: &[String],
    ) -> Result<Vec<UrlRecord>, StoreError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT full_url, short_url, user_id, is_deleted
            FROM short_url
            WHERE user_id = $1 AND short_url = ANY($2) AND NOT is_deleted
            "#,
        )
        .bind(user_id)
        .bind(candidates)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }
}

#[async_trait]
impl BatchDeletable for PgUrlStore {
    async fn delete_urls(&self, batch: &[PendingDelete]) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for chunk in batch.chunks(BATCH_CHUNK_SIZE) {
            let (short_urls, user_ids): (Vec<String>, Vec<String>) = chunk
                .iter()
                .map(|p| (p.short_url.clone(), p.user_id.clone()))
                .unzip();

            sqlx::query(
                r#"
                UPDATE short_url AS s
                SET is_deleted = TRUE
                FROM UNNEST($1::text[], $2::text[]) AS d(short_url, user_id)
                WHERE s.short_url = d.short_url AND s.user_id = d.user_id
                "#,
            )
            .bind(short_urls)
            .bind(user_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

impl UrlStore for PgUrlStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    fn as_pingable(&self) -> Option<&dyn Pingable> {
        Some(self)
    }

    fn as_user_scoped(&self) -> Option<&dyn UserScoped> {
        Some(self)
    }

    fn as_batch_deletable(&self) -> Option<&dyn BatchDeletable> {
        Some(self)
    }
}
