//! Observation → vector codec: per-slot transform, clip into `[0,1]`, optional jitter.

use super::schema::{FeatureSchema, Transform};
use super::{FeatureVector, FieldValue, ObservationFields};
use crate::error::{PipelineError, Result};
use rand::Rng;
use std::f64::consts::PI;
use tracing::debug;

/// Default standard deviation of the synthetic jitter
pub const DEFAULT_JITTER_STD: f32 = 0.02;

#[derive(Debug, Clone, Copy)]
pub struct FeatureCodec {
    schema: &'static FeatureSchema,
    jitter_std: f32,
}

impl FeatureCodec {
    /// Validates the schema up front so encode never indexes past the width.
    pub fn new(schema: &'static FeatureSchema) -> Result<Self> {
        schema.validate()?;
        Ok(Self {
            schema,
            jitter_std: DEFAULT_JITTER_STD,
        })
    }

    pub fn with_jitter(mut self, std: f32) -> Self {
        self.jitter_std = std.max(0.0);
        self
    }

    pub fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    pub fn jitter_std(&self) -> f32 {
        self.jitter_std
    }

    /// Deterministic encoding, used for real telemetry.
    pub fn encode(&self, fields: &ObservationFields) -> Result<FeatureVector> {
        let mut values = vec![0.0f32; self.schema.width];
        for (index, slot) in self.schema.slots.iter().enumerate() {
            let transform = slot.transform.ok_or_else(|| PipelineError::UnknownSchemaField {
                schema: self.schema.name,
                index,
                field: slot.field,
            })?;
            let raw = apply_transform(transform, fields.get(slot.field), slot.default, slot.field);
            values[index] = slot.clip.apply(raw);
        }
        FeatureVector::new(self.schema, values)
    }

    /// Encoding plus zero-mean Gaussian jitter on every position, re-clipped to `[0,1]`.
    /// Synthetic samples only.
    pub fn encode_jittered<R: Rng + ?Sized>(
        &self,
        fields: &ObservationFields,
        rng: &mut R,
    ) -> Result<FeatureVector> {
        let clean = self.encode(fields)?;
        if self.jitter_std == 0.0 {
            return Ok(clean);
        }
        let values = clean
            .as_slice()
            .iter()
            .map(|v| (v + gaussian(rng, self.jitter_std)).clamp(0.0, 1.0))
            .collect();
        FeatureVector::new(self.schema, values)
    }

    /// Lossy inverse for inspection. Reserved slots are omitted.
    pub fn decode(&self, vector: &FeatureVector) -> Result<ObservationFields> {
        vector.ensure_schema(self.schema)?;
        let mut fields = ObservationFields::new();
        for (slot, &v) in self.schema.slots.iter().zip(vector.as_slice()) {
            let value = match slot.transform {
                Some(Transform::LinearScale { divisor }) => FieldValue::Number((v * divisor) as f64),
                Some(Transform::Boolean) => FieldValue::Flag(v >= 0.5),
                Some(Transform::Categorical { table, .. }) => match nearest_category(table, v) {
                    Some(name) => FieldValue::Category(name.to_string()),
                    None => continue,
                },
                Some(Transform::Reserved) | None => continue,
            };
            fields.insert(slot.field, value);
        }
        Ok(fields)
    }
}

fn apply_transform(
    transform: Transform,
    value: Option<&FieldValue>,
    default: f64,
    field: &str,
) -> f32 {
    match transform {
        Transform::LinearScale { divisor } => {
            let n = value.and_then(FieldValue::as_number).unwrap_or(default);
            (n / divisor as f64) as f32
        }
        Transform::Boolean => {
            let set = value.map(FieldValue::is_set).unwrap_or(default != 0.0);
            if set {
                1.0
            } else {
                0.0
            }
        }
        Transform::Categorical { table, default } => match value {
            Some(FieldValue::Category(name)) => table
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| *v)
                .unwrap_or_else(|| {
                    debug!(field, value = %name, "unrecognized category; using default");
                    default
                }),
            _ => default,
        },
        Transform::Reserved => 0.0,
    }
}

fn nearest_category(table: &'static [(&'static str, f32)], v: f32) -> Option<&'static str> {
    let mut best: Option<(&'static str, f32)> = None;
    for &(name, code) in table {
        let d = (code - v).abs();
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((name, d));
        }
    }
    best.map(|(name, _)| name)
}

/// Box-Muller draw from N(0, std²)
fn gaussian<R: Rng + ?Sized>(rng: &mut R, std: f32) -> f32 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (std as f64 * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()) as f32
}
