//! Calibration corpus: per-sample `.npy` matrices read by the external quantizer as
//! `1 x timesteps x features` tensors.

use super::DecodedCapture;
use crate::error::{PipelineError, Result};
use crate::npy;
use ndarray::{Array3, Axis, Ix2};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct CalibrationCorpus;

impl CalibrationCorpus {
    /// Write each decoded capture as `sample_NNNN.npy`, numbered in the given order.
    /// Samples left in `dir` by an earlier run are removed first.
    pub fn write(dir: &Path, captures: &[DecodedCapture]) -> Result<Vec<PathBuf>> {
        Self::reset(dir)?;
        let mut written = Vec::with_capacity(captures.len());
        for (i, capture) in captures.iter().enumerate() {
            let path = sample_path(dir, i);
            npy::write_matrix(&path, &capture.record.samples)?;
            debug!(source = %capture.path.display(), dest = %path.display(), "calibration sample written");
            written.push(path);
        }
        info!(dir = %dir.display(), samples = written.len(), "calibration corpus written");
        Ok(written)
    }

    /// Write `1 x T x F` tensors back out as `T x F` samples, replacing any earlier ones.
    pub fn write_tensors(dir: &Path, samples: &[Array3<f32>]) -> Result<Vec<PathBuf>> {
        Self::reset(dir)?;
        samples
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let path = sample_path(dir, i);
                let matrix = sample.index_axis(Axis(0), 0);
                npy::write_file(&path, matrix.shape(), matrix.iter().copied())?;
                Ok(path)
            })
            .collect()
    }

    /// Stage at most `cap` samples from `source` into `dest` for the quantizer. When
    /// `source` holds no samples, rows of the feature matrix at `fallback` are used.
    pub fn stage(source: &Path, fallback: &Path, dest: &Path, cap: usize) -> Result<usize> {
        let samples = match Self::load(source, cap) {
            Ok(samples) => samples,
            Err(e) => {
                warn!(dir = %source.display(), error = %e, "no calibration corpus; using dataset rows");
                Self::from_feature_matrix(fallback, cap)?
            }
        };
        if samples.is_empty() {
            return Err(PipelineError::EmptyInput(fallback.display().to_string()));
        }
        let written = Self::write_tensors(dest, &samples)?;
        info!(dest = %dest.display(), samples = written.len(), cap, "calibration corpus staged");
        Ok(written.len())
    }

    fn reset(dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let stale: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| is_sample(p))
            .collect();
        for path in stale {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Load at most `cap` samples (file-name order) shaped `1 x T x F`.
    pub fn load(dir: &Path, cap: usize) -> Result<Vec<Array3<f32>>> {
        let files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.extension().map_or(false, |e| e == "npy"))
            .take(cap)
            .collect();
        if files.is_empty() {
            return Err(PipelineError::Npy(format!(
                "no .npy calibration samples in {}",
                dir.display()
            )));
        }

        files
            .iter()
            .map(|path| {
                let matrix = npy::read_array(path)?
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| PipelineError::Npy(format!("{}: {}", path.display(), e)))?;
                Ok(matrix.insert_axis(Axis(0)))
            })
            .collect()
    }

    /// Representative rows of a persisted feature matrix, each shaped `1 x 1 x width`.
    pub fn from_feature_matrix(x_path: &Path, cap: usize) -> Result<Vec<Array3<f32>>> {
        let matrix = npy::read_array(x_path)?
            .into_dimensionality::<Ix2>()
            .map_err(|e| PipelineError::Npy(e.to_string()))?;
        Ok(matrix
            .outer_iter()
            .take(cap)
            .map(|row| row.to_owned().insert_axis(Axis(0)).insert_axis(Axis(0)))
            .collect())
    }
}

fn sample_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("sample_{:04}.npy", index))
}

fn is_sample(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.starts_with("sample_") && name.ends_with(".npy")
}
