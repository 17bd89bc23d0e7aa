//! Quantizer implementations. The framework runs out of process; only its inputs
//! (persisted dataset, calibration corpus) and its output bytes are our contract.

use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Inputs handed to the framework
#[derive(Debug, Clone)]
pub struct QuantizeRequest {
    /// Dataset path prefix, e.g. `dataset/threat_dataset` (`_X.npy` etc. appended)
    pub dataset_prefix: PathBuf,
    /// Directory of calibration `.npy` samples
    pub calibration_dir: PathBuf,
    /// Where the framework writes the quantized blob
    pub output: PathBuf,
}

pub trait ModelQuantizer {
    fn quantize(&self, request: &QuantizeRequest) -> Result<Vec<u8>>;
}

/// Runs an external program:
/// `<program> [args..] --dataset <prefix> --calibration <dir> --output <path>`,
/// then reads the blob it wrote.
#[derive(Debug, Clone)]
pub struct CommandQuantizer {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandQuantizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl ModelQuantizer for CommandQuantizer {
    fn quantize(&self, request: &QuantizeRequest) -> Result<Vec<u8>> {
        if !request.calibration_dir.is_dir() {
            return Err(PipelineError::Quantizer(format!(
                "calibration corpus {} not found",
                request.calibration_dir.display()
            )));
        }
        info!(program = %self.program.display(), output = %request.output.display(), "running quantizer");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--dataset")
            .arg(&request.dataset_prefix)
            .arg("--calibration")
            .arg(&request.calibration_dir)
            .arg("--output")
            .arg(&request.output)
            .output()
            .map_err(|e| {
                PipelineError::Quantizer(format!("cannot start {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "quantizer failed");
            return Err(PipelineError::Quantizer(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        read_blob(&request.output)
    }
}

/// Model already quantized elsewhere; returns the file's bytes unchanged.
#[derive(Debug, Clone)]
pub struct PrebuiltModel {
    path: PathBuf,
}

impl PrebuiltModel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelQuantizer for PrebuiltModel {
    fn quantize(&self, _request: &QuantizeRequest) -> Result<Vec<u8>> {
        read_blob(&self.path)
    }
}

fn read_blob(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput(path.display().to_string()));
    }
    info!(path = %path.display(), bytes = bytes.len(), "quantized model read");
    Ok(bytes)
}
