//! threatpack — WiFi threat telemetry packaging for embedded classifiers.
//!
//! Modular structure:
//! - [`capture`] — Raw on-device capture decoding, batch conversion, calibration corpus
//! - [`features`] — Feature schemas and the observation → vector codec
//! - [`scenario`] — Per-class synthetic observation rules
//! - [`dataset`] — Labeled dataset assembly and persistence
//! - [`artifact`] — Deterministic C/C++ byte-array rendering
//! - [`model`] — Seam to the external quantizer
//! - [`npy`] — NumPy array files shared with the training tooling
//! - [`logging`] — Structured logging

pub mod artifact;
pub mod capture;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod npy;
pub mod scenario;

pub use artifact::{ArtifactEncoder, EmbeddableArtifact};
pub use capture::{decode_capture, CaptureBatch, CaptureError, RawCaptureRecord};
pub use config::PipelineConfig;
pub use dataset::{Dataset, DatasetAssembler, DatasetWriter, LabeledSample};
pub use error::{PipelineError, Result};
pub use features::{FeatureCodec, FeatureSchema, FeatureVector, ObservationFields};
pub use logging::StructuredLogger;
pub use model::ModelQuantizer;
pub use scenario::{ScenarioRegistry, ScenarioSampleGenerator};
