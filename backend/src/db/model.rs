use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{DetectionRecord, HistoryEntry};

/// One row of `detection_results`. Created once per successful upload,
/// never updated. `file_path` is non-authoritative: the staged file is
/// deleted after the response, so the path may dangle.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DetectionResult {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub is_fake: bool,
    pub confidence_score: f64,
    pub processing_time: f64,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    pub analysis_details: Option<String>,
}

/// Insert payload for a detection row.
#[derive(Debug, Clone)]
pub struct NewDetection {
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub is_fake: bool,
    pub confidence_score: f64,
    pub processing_time: f64,
    pub model_version: String,
    pub analysis_details: Option<String>,
}

impl NewDetection {
    /// Build an insert payload, clamping the confidence score into [0, 1].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        filename: String,
        file_path: String,
        file_size: i64,
        mime_type: String,
        is_fake: bool,
        confidence_score: f64,
        processing_time: f64,
        model_version: String,
        analysis_details: Option<String>,
    ) -> Self {
        Self {
            filename,
            file_path,
            file_size,
            mime_type,
            is_fake,
            confidence_score: confidence_score.clamp(0.0, 1.0),
            processing_time,
            model_version,
            analysis_details,
        }
    }
}

impl From<DetectionResult> for DetectionRecord {
    fn from(row: DetectionResult) -> Self {
        DetectionRecord {
            id: row.id,
            filename: row.filename,
            is_fake: row.is_fake,
            confidence: row.confidence_score,
            processing_time: row.processing_time,
            model_version: row.model_version,
            created_at: row.created_at,
            file_size: row.file_size,
            mime_type: row.mime_type,
            analysis_details: row.analysis_details,
        }
    }
}

impl From<DetectionResult> for HistoryEntry {
    fn from(row: DetectionResult) -> Self {
        HistoryEntry {
            id: row.id,
            filename: row.filename,
            is_fake: row.is_fake,
            confidence: row.confidence_score,
            created_at: row.created_at,
        }
    }
}
