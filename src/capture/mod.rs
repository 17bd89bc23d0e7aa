//! On-device raw feature captures: fixed little-endian layout, batch conversion,
//! calibration corpus output.

mod batch;
mod corpus;
mod decoder;

pub use batch::{CaptureBatch, CaptureFailure, DecodedCapture};
pub use corpus::CalibrationCorpus;
pub use decoder::{decode_capture, RawCaptureRecord, HEADER_LEN};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture too short: {len} bytes, header needs {}", HEADER_LEN)]
    TooShort { len: usize },

    #[error("truncated payload: header declares {expected} bytes, {actual} present")]
    TruncatedPayload { expected: usize, actual: usize },
}
