//! Batch conversion of a capture directory. A bad file is logged, counted and skipped.

use super::decoder::{decode_capture, RawCaptureRecord};
use crate::config::CaptureConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct DecodedCapture {
    pub path: PathBuf,
    pub record: RawCaptureRecord,
}

#[derive(Debug, Clone)]
pub struct CaptureFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one directory pass, records in canonical file-name order
#[derive(Debug, Default)]
pub struct CaptureBatch {
    pub records: Vec<DecodedCapture>,
    pub failures: Vec<CaptureFailure>,
}

impl CaptureBatch {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Capture files under `dir` (non-recursive) sorted by file name.
    pub fn list_files(dir: &Path, config: &CaptureConfig) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("capture directory {} not found", dir.display()),
            )
            .into());
        }
        let files = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| is_capture_file(p, config))
            .collect();
        Ok(files)
    }

    /// Decode at most `config.max_files` captures from `dir`.
    pub fn decode_dir(dir: &Path, config: &CaptureConfig) -> Result<Self> {
        let files = Self::list_files(dir, config)?;
        let total = files.len();
        let mut batch = CaptureBatch::default();

        for path in files.into_iter().take(config.max_files) {
            let outcome = std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|buf| decode_capture(&buf).map_err(|e| e.to_string()));
            match outcome {
                Ok(record) => {
                    debug!(
                        path = %path.display(),
                        timesteps = record.timestep_count,
                        features = record.feature_count,
                        "capture decoded"
                    );
                    batch.records.push(DecodedCapture { path, record });
                }
                Err(reason) => {
                    warn!(path = %path.display(), error = %reason, "skipping capture");
                    batch.failures.push(CaptureFailure { path, reason });
                }
            }
        }

        info!(
            found = total,
            cap = config.max_files,
            decoded = batch.succeeded(),
            skipped = batch.failed(),
            "capture batch complete"
        );
        Ok(batch)
    }
}

fn is_capture_file(path: &Path, config: &CaptureConfig) -> bool {
    let name_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with(&config.file_prefix));
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e == config.extension);
    name_ok && ext_ok
}
