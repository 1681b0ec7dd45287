//! # ps-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `ps-core` domain models. It is the persistent store: only records
//! that went through `PhotoRecord::commit_copy` ever reach it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ps_core::error::{AppError, Result};
use ps_core::models::{Fingerprint, PhotoMeta, PhotoRecord};
use ps_core::traits::PhotoRepo;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

const CREATE_PHOTOS: &str = "CREATE TABLE IF NOT EXISTS photos (
    id               BLOB PRIMARY KEY NOT NULL,
    title            TEXT,
    subtitle         TEXT,
    full_photo_data  BLOB NOT NULL,
    small_photo_data BLOB NOT NULL,
    user_name        TEXT NOT NULL,
    date_added       TEXT,
    fingerprint      TEXT NOT NULL
)";

/// Racing saves of the same image fail here even after both passed `exists`.
const CREATE_FINGERPRINT_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS photos_fingerprint_unique ON photos (fingerprint)";

const SELECT_COLUMNS: &str =
    "SELECT id, title, subtitle, full_photo_data, small_photo_data, user_name, date_added FROM photos";

pub struct SqlitePhotoRepo {
    pool: SqlitePool,
}

impl SqlitePhotoRepo {
    /// Opens the database at `url` and creates the schema if missing.
    ///
    /// A single connection is kept open for the lifetime of the pool so that
    /// `sqlite::memory:` databases survive between queries.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(url)
            .await?;

        sqlx::query(CREATE_PHOTOS).execute(&pool).await?;
        sqlx::query(CREATE_FINGERPRINT_INDEX).execute(&pool).await?;
        log::info!("photo store ready at {url}");

        Ok(Self { pool })
    }
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Result<Uuid> {
    Uuid::from_slice(blob).map_err(|e| AppError::Persistence(format!("corrupt photo id: {e}")))
}

fn persistence(err: sqlx::Error) -> AppError {
    AppError::Persistence(err.to_string())
}

fn row_to_record(row: &SqliteRow) -> Result<PhotoRecord> {
    let id = blob_to_uuid(&row.try_get::<Vec<u8>, _>("id").map_err(persistence)?)?;
    let meta = PhotoMeta {
        title: row.try_get("title").map_err(persistence)?,
        subtitle: row.try_get("subtitle").map_err(persistence)?,
        user_name: row.try_get("user_name").map_err(persistence)?,
    };
    // Rows written without a date sort first.
    let saved_at: Option<DateTime<Utc>> = row.try_get("date_added").map_err(persistence)?;

    Ok(PhotoRecord::from_storage(
        id,
        meta,
        row.try_get("small_photo_data").map_err(persistence)?,
        row.try_get("full_photo_data").map_err(persistence)?,
        saved_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    ))
}

#[async_trait]
impl PhotoRepo for SqlitePhotoRepo {
    async fn insert(&self, record: &PhotoRecord) -> Result<()> {
        let (Some(thumbnail), Some(full), Some(saved_at)) =
            (record.thumbnail(), record.full(), record.saved_at())
        else {
            return Err(AppError::Persistence(format!(
                "photo {} is not a committed record",
                record.id()
            )));
        };

        let fingerprint = Fingerprint::of(full);
        sqlx::query("INSERT INTO photos (id, title, subtitle, full_photo_data, small_photo_data, user_name, date_added, fingerprint) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(uuid_to_blob(record.id()))
            .bind(record.title())
            .bind(record.subtitle())
            .bind(full)
            .bind(thumbnail)
            .bind(record.user_name())
            .bind(saved_at)
            .bind(fingerprint.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if err
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation())
                {
                    AppError::Conflict(format!(
                        "a photo with fingerprint {} is already saved",
                        fingerprint.as_str()
                    ))
                } else {
                    persistence(err)
                }
            })?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM photos WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(persistence)?;

        if result.rows_affected() == 0 {
            return Err(AppError::photo_not_found(id));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PhotoRecord>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(persistence)?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// Ascending by save time; ties fall back to the time-ordered id.
    async fn list(&self) -> Result<Vec<PhotoRecord>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY date_added ASC, id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(persistence)?;

        rows.iter().map(row_to_record).collect()
    }

    async fn exists(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM photos WHERE fingerprint = ?")
            .bind(fingerprint.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(persistence)?;
        Ok(count > 0)
    }
}
