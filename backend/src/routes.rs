use std::time::Instant;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use shared::{DetectResponse, ErrorDetail, HealthResponse, HistoryResponse};
use uuid::Uuid;

use crate::db::detection_repository::DetectionStore;
use crate::db::model::NewDetection;
use crate::ml::detection_service::{FakeDetectionService, MODEL_VERSION};
use crate::storage::staging::{StagingArea, cleanup_file};

const SERVICE_NAME: &str = "DeepSpear AI Detection API";
const DEFAULT_HISTORY_LIMIT: i64 = 10;
const MAX_HISTORY_LIMIT: i64 = 100;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(web::resource("/detect").route(web::post().to(detect)))
            .service(web::resource("/result/{id}").route(web::get().to(get_result)))
            .service(web::resource("/history").route(web::get().to(get_history)))
            .service(web::resource("/health").route(web::get().to(health)))
            .service(web::resource("/health/db").route(web::get().to(health_db))),
    )
    .service(web::resource("/").route(web::get().to(index)));
}

fn detail_response(status: actix_web::http::StatusCode, detail: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorDetail {
        detail: detail.into(),
    })
}

fn bad_request(detail: impl Into<String>) -> HttpResponse {
    detail_response(actix_web::http::StatusCode::BAD_REQUEST, detail)
}

fn server_error(detail: impl Into<String>) -> HttpResponse {
    detail_response(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, detail)
}

struct Upload {
    filename: Option<String>,
    mime_type: Option<String>,
    data: Vec<u8>,
}

/// Pull the `file` field out of the multipart payload. Returns `Ok(None)`
/// when no such field exists. The size cap is enforced while streaming so an
/// oversized body is rejected without buffering it whole.
async fn read_upload(payload: &mut Multipart, staging: &StagingArea) -> Result<Option<Upload>, String> {
    let max_size = staging.max_size();
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(format!("Failed to read multipart payload: {}", e)),
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.to_string());
        let mime_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(|e| format!("Failed to read uploaded file: {}", e))?;
            if data.len() + bytes.len() > max_size {
                return Err(staging.too_large(data.len() + bytes.len()).to_string());
            }
            data.extend_from_slice(&bytes);
        }

        return Ok(Some(Upload {
            filename,
            mime_type,
            data,
        }));
    }
}

async fn detect(
    mut payload: Multipart,
    staging: web::Data<StagingArea>,
    detector: web::Data<FakeDetectionService>,
    store: web::Data<dyn DetectionStore>,
) -> HttpResponse {
    let upload = match read_upload(&mut payload, &staging).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return bad_request("No file provided"),
        Err(msg) => {
            info!("Rejected upload: {}", msg);
            return bad_request(msg);
        }
    };

    let extension = match staging.validate(
        upload.filename.as_deref(),
        upload.mime_type.as_deref(),
        upload.data.len(),
    ) {
        Ok(ext) => ext,
        Err(e) if e.is_client_error() => {
            info!("Rejected upload: {}", e);
            return bad_request(e.to_string());
        }
        Err(e) => {
            error!("Upload validation failed: {}", e);
            return server_error(format!("Error processing image: {}", e));
        }
    };

    let started = Instant::now();
    let file_id = Uuid::new_v4();

    let file_path = match staging.stage(file_id, &extension, &upload.data).await {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to stage upload {}: {}", file_id, e);
            return server_error(format!("Error processing image: {}", e));
        }
    };

    let outcome = detector.predict(&file_path);
    let processing_time = started.elapsed().as_secs_f64();

    let filename = upload.filename.unwrap_or_default();
    let new = NewDetection::new(
        filename,
        file_path.display().to_string(),
        upload.data.len() as i64,
        upload.mime_type.unwrap_or_else(|| "unknown".to_string()),
        outcome.is_fake,
        outcome.confidence,
        processing_time,
        MODEL_VERSION.to_string(),
        Some(outcome.details),
    );

    let row = match store.create(new).await {
        Ok(row) => row,
        Err(e) => {
            error!("Failed to store detection result: {}", e);
            // Staged file still gets removed even though the insert failed.
            actix_web::rt::spawn(cleanup_file(file_path));
            return server_error(format!("Error processing image: {}", e));
        }
    };

    // Best-effort cleanup after the response value is computed.
    actix_web::rt::spawn(cleanup_file(file_path));

    HttpResponse::Ok().json(DetectResponse {
        file_id: row.id,
        filename: row.filename,
        is_fake: row.is_fake,
        confidence: row.confidence_score,
        processing_time: (processing_time * 1000.0).round() / 1000.0,
        created_at: row.created_at,
        message: format!(
            "Image analyzed with {:.1}% confidence",
            row.confidence_score * 100.0
        ),
    })
}

async fn get_result(store: web::Data<dyn DetectionStore>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match store.get_by_id(id).await {
        Ok(Some(row)) => HttpResponse::Ok().json(shared::DetectionRecord::from(row)),
        Ok(None) => detail_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Detection result not found",
        ),
        Err(e) => {
            error!("Error retrieving detection result {}: {}", id, e);
            server_error(format!("Error retrieving result: {}", e))
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

fn history_page_params(query: &HistoryQuery) -> (i64, i64) {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);
    (limit, offset)
}

async fn get_history(
    store: web::Data<dyn DetectionStore>,
    query: web::Query<HistoryQuery>,
) -> HttpResponse {
    let (limit, offset) = history_page_params(&query);

    match store.list(limit, offset).await {
        Ok((rows, total)) => {
            let results: Vec<shared::HistoryEntry> =
                rows.into_iter().map(shared::HistoryEntry::from).collect();
            let has_next = offset + (results.len() as i64) < total;
            HttpResponse::Ok().json(HistoryResponse {
                results,
                total,
                limit,
                offset,
                has_next,
            })
        }
        Err(e) => {
            error!("Error retrieving detection history: {}", e);
            server_error(format!("Error retrieving history: {}", e))
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

async fn health_db(store: web::Data<dyn DetectionStore>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected",
            "message": "Database connection is working",
        })),
        Err(e) => {
            error!("Database health check failed: {}", e);
            HttpResponse::Ok().json(json!({
                "status": "unhealthy",
                "database": "disconnected",
                "error": e.to_string(),
            }))
        }
    }
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to DeepSpear AI - Fake Content Detection API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
