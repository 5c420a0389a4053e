use std::path::Path;

use image::imageops::FilterType;
use rand::Rng;
use serde_json::json;

/// Tag written into every stored record. Bump when a real model lands.
pub const MODEL_VERSION: &str = "v1.0";

const INPUT_SIZE: u32 = 224;

/// Outcome of one classification call.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    pub is_fake: bool,
    pub confidence: f64,
    pub details: String,
}

#[derive(Debug, thiserror::Error)]
enum PreprocessError {
    #[error("Error preprocessing image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Placeholder fake-content classifier.
///
/// This is template code: it decodes and resizes the image the way a real
/// preprocessing pipeline would, then samples a uniform fake-probability
/// instead of running inference. Replace `predict` internals with an actual
/// model; the contract (confidence in [0, 1], safe default on failure) stays.
#[derive(Debug, Clone)]
pub struct FakeDetectionService {
    threshold: f64,
}

impl FakeDetectionService {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Classify the staged image at `path`.
    ///
    /// Never fails: any preprocessing error collapses to the safe default
    /// `{ is_fake: false, confidence: 0.0 }` with the error recorded in
    /// `details`.
    pub fn predict(&self, path: &Path) -> DetectionOutcome {
        match preprocess(path) {
            Ok(_pixels) => {
                // Dummy prediction standing in for model inference.
                let fake_prob: f64 = rand::rng().random_range(0.1..0.9);
                let is_fake = fake_prob > self.threshold;
                let confidence = if is_fake { fake_prob } else { 1.0 - fake_prob };

                let details = json!({
                    "model_version": MODEL_VERSION,
                    "analysis_method": "CNN-based detection",
                    "features_analyzed": [
                        "texture_patterns",
                        "compression_artifacts",
                        "color_distribution",
                    ],
                    "processing_notes": "Template implementation - replace with actual model",
                });

                DetectionOutcome {
                    is_fake,
                    confidence,
                    details: details.to_string(),
                }
            }
            Err(e) => DetectionOutcome {
                is_fake: false,
                confidence: 0.0,
                details: format!("Error during prediction: {}", e),
            },
        }
    }
}

/// Decode and normalize the image to the model's input dimensions.
fn preprocess(path: &Path) -> Result<image::RgbImage, PreprocessError> {
    let img = image::open(path)?;
    Ok(img
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8())
}
