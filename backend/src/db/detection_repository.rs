use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::model::{DetectionResult, NewDetection};

const DETECTION_COLUMNS: &str = "\
    id, filename, file_path, file_size, mime_type, is_fake, \
    confidence_score, processing_time, model_version, created_at, \
    analysis_details";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence seam for detection records. Injected into the handlers so the
/// Postgres implementation can be swapped for an in-memory one in tests.
///
/// No update or delete operations exist: records are written once and only
/// ever read back.
#[async_trait]
pub trait DetectionStore: Send + Sync {
    /// Insert a new record and return it with its database-assigned id.
    async fn create(&self, new: NewDetection) -> Result<DetectionResult, StoreError>;

    /// Fetch one record, or `None` when the id is unknown.
    async fn get_by_id(&self, id: i64) -> Result<Option<DetectionResult>, StoreError>;

    /// Return a page ordered by creation time descending, plus the total
    /// row count for pagination.
    async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DetectionResult>, i64), StoreError>;

    /// Connectivity probe for the database health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgDetectionRepository {
    pool: PgPool,
}

impl PgDetectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DetectionStore for PgDetectionRepository {
    async fn create(&self, new: NewDetection) -> Result<DetectionResult, StoreError> {
        let query = format!(
            "INSERT INTO detection_results \
                (filename, file_path, file_size, mime_type, is_fake, \
                 confidence_score, processing_time, model_version, analysis_details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {DETECTION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, DetectionResult>(&query)
            .bind(&new.filename)
            .bind(&new.file_path)
            .bind(new.file_size)
            .bind(&new.mime_type)
            .bind(new.is_fake)
            .bind(new.confidence_score)
            .bind(new.processing_time)
            .bind(&new.model_version)
            .bind(&new.analysis_details)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<DetectionResult>, StoreError> {
        let query = format!("SELECT {DETECTION_COLUMNS} FROM detection_results WHERE id = $1");
        let row = sqlx::query_as::<_, DetectionResult>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DetectionResult>, i64), StoreError> {
        let query = format!(
            "SELECT {DETECTION_COLUMNS} FROM detection_results \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, DetectionResult>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM detection_results")
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
