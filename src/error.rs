//! Error types for the packaging pipeline.

use crate::capture::CaptureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("malformed capture: {0}")]
    MalformedCapture(#[from] CaptureError),

    #[error("schema {schema} slot {index} references field `{field}` with no transform")]
    UnknownSchemaField {
        schema: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("vector for schema {schema}: expected {expected} values, got {actual}")]
    SchemaLengthMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("unknown class id {class_id} (registry has {class_count} classes)")]
    UnknownClass { class_id: usize, class_count: usize },

    #[error("artifact `{0}` has no bytes")]
    EmptyInput(String),

    #[error("`{0}` is not a valid C identifier")]
    InvalidSymbol(String),

    #[error("dataset shape mismatch: {0}")]
    DatasetShapeMismatch(String),

    #[error("npy format error: {0}")]
    Npy(String),

    #[error("artifact parse error: {0}")]
    ArtifactParse(String),

    #[error("quantizer failed: {0}")]
    Quantizer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
