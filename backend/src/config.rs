use std::env;
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "jpg,jpeg,png,gif,bmp,webp";

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub allowed_extensions: Vec<String>,
    pub confidence_threshold: f64,
    pub port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let upload_dir =
            PathBuf::from(env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()));

        let max_upload_size = match env::var("MAX_UPLOAD_SIZE") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|e| ConfigError::Invalid("MAX_UPLOAD_SIZE", e.to_string()))?,
            Err(_) => DEFAULT_MAX_UPLOAD_SIZE,
        };

        let allowed_extensions = parse_extensions(
            &env::var("ALLOWED_EXTENSIONS").unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.into()),
        );

        let confidence_threshold = match env::var("CONFIDENCE_THRESHOLD") {
            Ok(raw) => raw
                .parse::<f64>()
                .map_err(|e| ConfigError::Invalid("CONFIDENCE_THRESHOLD", e.to_string()))?,
            Err(_) => 0.5,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?,
            Err(_) => 8081,
        };

        Ok(Self {
            database_url,
            upload_dir,
            max_upload_size,
            allowed_extensions,
            confidence_threshold,
            port,
        })
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
