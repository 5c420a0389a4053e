use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body for a successful `POST /api/v1/detect`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DetectResponse {
    pub file_id: i64,
    pub filename: String,
    pub is_fake: bool,
    pub confidence: f64,
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Full stored record returned by `GET /api/v1/result/{id}`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DetectionRecord {
    pub id: i64,
    pub filename: String,
    pub is_fake: bool,
    pub confidence: f64,
    pub processing_time: f64,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
    pub file_size: i64,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_details: Option<String>,
}

/// One row of `GET /api/v1/history`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryEntry {
    pub id: i64,
    pub filename: String,
    pub is_fake: bool,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryResponse {
    pub results: Vec<HistoryEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_next: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error payload for every non-2xx response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorDetail {
    pub detail: String,
}
