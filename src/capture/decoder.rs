//! Raw capture layout: `u32 timestamp | u16 timesteps | u16 features | f32[timesteps * features]`,
//! all little-endian.

use super::CaptureError;
use ndarray::Array2;

pub const HEADER_LEN: usize = 8;
const F32_LEN: usize = 4;

/// One decoded capture. Transient: converted into a calibration sample and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCaptureRecord {
    pub timestamp: u32,
    pub timestep_count: u16,
    pub feature_count: u16,
    /// `timestep_count x feature_count`, row-major as stored
    pub samples: Array2<f32>,
}

impl RawCaptureRecord {
    /// Payload size in bytes implied by the header
    pub fn payload_len(&self) -> usize {
        payload_len(self.timestep_count, self.feature_count)
    }

    /// Re-serialize in the on-device layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload_len());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.timestep_count.to_le_bytes());
        out.extend_from_slice(&self.feature_count.to_le_bytes());
        for v in self.samples.iter() {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
}

fn payload_len(timesteps: u16, features: u16) -> usize {
    timesteps as usize * features as usize * F32_LEN
}

/// Decode one capture buffer. Bytes past the declared payload are ignored.
pub fn decode_capture(buf: &[u8]) -> Result<RawCaptureRecord, CaptureError> {
    if buf.len() < HEADER_LEN {
        return Err(CaptureError::TooShort { len: buf.len() });
    }
    let timestamp = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let timestep_count = u16::from_le_bytes([buf[4], buf[5]]);
    let feature_count = u16::from_le_bytes([buf[6], buf[7]]);

    let expected = payload_len(timestep_count, feature_count);
    let payload = &buf[HEADER_LEN..];
    if payload.len() < expected {
        return Err(CaptureError::TruncatedPayload {
            expected,
            actual: payload.len(),
        });
    }

    let cols = feature_count as usize;
    let samples = Array2::from_shape_fn((timestep_count as usize, cols), |(r, c)| {
        let at = (r * cols + c) * F32_LEN;
        f32::from_le_bytes([payload[at], payload[at + 1], payload[at + 2], payload[at + 3]])
    });

    Ok(RawCaptureRecord {
        timestamp,
        timestep_count,
        feature_count,
        samples,
    })
}
