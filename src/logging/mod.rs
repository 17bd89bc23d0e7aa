//! Structured logging.

mod format;

pub use format::{StageReport, StructuredLogger};
