//! Seam to the external ML framework: "given a labeled dataset and a calibration
//! corpus, produce a quantized model blob".

mod quantizer;

pub use quantizer::{CommandQuantizer, ModelQuantizer, PrebuiltModel, QuantizeRequest};
