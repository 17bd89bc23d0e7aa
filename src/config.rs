//! Pipeline configuration. Every section has defaults; CLI flags override them.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw capture conversion
    pub capture: CaptureConfig,
    /// Synthetic dataset generation
    pub dataset: DatasetConfig,
    /// Embeddable artifact rendering
    pub artifact: ArtifactConfig,
    /// Calibration corpus consumed by the external quantizer
    pub calibration: CalibrationConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Directory holding on-device `feature_*.raw` recordings
    pub input_dir: PathBuf,
    /// File name prefix a capture must carry
    pub file_prefix: String,
    /// File extension (without dot)
    pub extension: String,
    /// Maximum number of files decoded per batch
    pub max_files: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    WifiThreat,
    Behavioral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub schema: SchemaKind,
    pub samples_per_class: usize,
    /// Fixed seed for reproducible runs; fresh entropy when absent
    pub seed: Option<u64>,
    /// Standard deviation of the additive jitter; 0 disables it
    pub jitter_std: f32,
    pub output_dir: PathBuf,
    /// Artifacts are written as `{prefix}_X.npy`, `{prefix}_y.npy`, `{prefix}_metadata.json`
    pub prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub bytes_per_line: usize,
    /// Value of the `alignas` annotation on generated arrays
    pub alignment: usize,
    pub symbol: String,
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Directory of `sample_NNNN.npy` files
    pub dir: PathBuf,
    /// Samples handed to the quantizer at most
    pub max_samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("raw_features"),
            file_prefix: "feature_".to_string(),
            extension: "raw".to_string(),
            max_files: 500,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            schema: SchemaKind::WifiThreat,
            samples_per_class: 2000,
            seed: None,
            jitter_std: 0.02,
            output_dir: PathBuf::from("dataset"),
            prefix: "threat_dataset".to_string(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: 16,
            alignment: 16,
            symbol: "threat_model_data".to_string(),
            output_path: PathBuf::from("threat_model_data.h"),
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dataset/representative_data"),
            max_samples: 300,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults when `path` is absent; a file that exists but cannot be read or parsed
    /// is an error so the caller can report it once logging is up.
    pub fn try_load(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Like [`try_load`](Self::try_load), but falls back to defaults with a warning.
    pub fn load(path: &std::path::Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid config; using defaults");
            Self::default()
        })
    }
}
