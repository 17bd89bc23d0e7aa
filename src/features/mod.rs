//! Feature schemas and the observation → normalized vector codec shared by
//! synthetic generation and on-device inference.

mod codec;
mod schema;

pub use codec::FeatureCodec;
pub use schema::{
    ClipRange, FeatureSchema, FeatureSlot, Transform, BEHAVIORAL, ENCRYPTION_KINDS, WIFI_THREAT,
};

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw value of one named metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Category(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Category(_) => None,
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Flag(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Category(s) => !s.is_empty(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Number(v as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Flag(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Category(v.to_string())
    }
}

/// Named metrics of one observation, from a scenario rule or real telemetry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationFields(BTreeMap<String, FieldValue>);

impl ObservationFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Fixed-length normalized vector bound to the schema that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    schema: &'static str,
    values: Vec<f32>,
}

impl FeatureVector {
    /// Wrap `values` as a vector of `schema`; the length must equal the schema width.
    pub fn new(schema: &FeatureSchema, values: Vec<f32>) -> Result<Self> {
        if values.len() != schema.width {
            return Err(PipelineError::SchemaLengthMismatch {
                schema: schema.name,
                expected: schema.width,
                actual: values.len(),
            });
        }
        Ok(Self {
            schema: schema.name,
            values,
        })
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail unless this vector was produced for `schema` and still has its width.
    pub fn ensure_schema(&self, schema: &FeatureSchema) -> Result<()> {
        if self.schema != schema.name {
            return Err(PipelineError::SchemaMismatch {
                expected: schema.name.to_string(),
                actual: self.schema.to_string(),
            });
        }
        if self.values.len() != schema.width {
            return Err(PipelineError::SchemaLengthMismatch {
                schema: schema.name,
                expected: schema.width,
                actual: self.values.len(),
            });
        }
        Ok(())
    }
}
