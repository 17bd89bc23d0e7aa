//! Labeled datasets: assembly from scenario rules, shape checks, persistence as
//! `{prefix}_X.npy`, `{prefix}_y.npy` and `{prefix}_metadata.json`.

mod assembler;
mod writer;

pub use assembler::DatasetAssembler;
pub use writer::{DatasetFiles, DatasetWriter};

use crate::error::{PipelineError, Result};
use crate::features::FeatureVector;
use chrono::{DateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSample {
    vector: FeatureVector,
    class_id: u16,
}

impl LabeledSample {
    pub fn new(vector: FeatureVector, class_id: u16) -> Self {
        Self { vector, class_id }
    }

    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }

    pub fn class_id(&self) -> u16 {
        self.class_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub created: DateTime<Utc>,
    pub schema: String,
    pub layout_hash: u32,
    pub samples: usize,
    pub features: usize,
    pub classes: usize,
    pub class_names: Vec<String>,
    pub samples_per_class: usize,
}

impl DatasetMetadata {
    /// Compare declared counts against what the data actually holds.
    pub fn check(&self, rows: usize, width: usize, labels: &[i32]) -> Result<()> {
        let mismatch = |what: String| Err(PipelineError::DatasetShapeMismatch(what));
        if labels.len() != rows {
            return mismatch(format!("{} feature rows but {} labels", rows, labels.len()));
        }
        if self.samples != rows {
            return mismatch(format!("metadata declares {} samples, data has {}", self.samples, rows));
        }
        if self.features != width {
            return mismatch(format!("metadata declares width {}, data has {}", self.features, width));
        }
        if self.class_names.len() != self.classes {
            return mismatch(format!(
                "metadata declares {} classes but names {}",
                self.classes,
                self.class_names.len()
            ));
        }
        if self.classes * self.samples_per_class != rows {
            return mismatch(format!(
                "{} classes x {} per class != {} samples",
                self.classes, self.samples_per_class, rows
            ));
        }
        if let Some(bad) = labels.iter().find(|&&l| l < 0 || l as usize >= self.classes) {
            return mismatch(format!("label {} outside [0, {})", bad, self.classes));
        }
        Ok(())
    }
}

/// Shuffled labeled samples with metadata. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Vec<LabeledSample>,
    metadata: DatasetMetadata,
}

impl Dataset {
    /// Refuses samples that disagree with the metadata.
    pub fn new(samples: Vec<LabeledSample>, metadata: DatasetMetadata) -> Result<Self> {
        let dataset = Self { samples, metadata };
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((i, s)) = self
            .samples
            .iter()
            .enumerate()
            .find(|(_, s)| s.vector.len() != self.metadata.features)
        {
            return Err(PipelineError::DatasetShapeMismatch(format!(
                "sample {} has width {}, dataset width is {}",
                i,
                s.vector.len(),
                self.metadata.features
            )));
        }
        if let Some(s) = self
            .samples
            .iter()
            .find(|s| s.vector.schema_name() != self.metadata.schema)
        {
            return Err(PipelineError::SchemaMismatch {
                expected: self.metadata.schema.clone(),
                actual: s.vector.schema_name().to_string(),
            });
        }
        self.metadata
            .check(self.samples.len(), self.metadata.features, &self.labels())
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Rows = samples, columns = feature width
    pub fn feature_matrix(&self) -> Array2<f32> {
        let width = self.metadata.features;
        Array2::from_shape_fn((self.samples.len(), width), |(r, c)| {
            self.samples[r].vector.as_slice()[c]
        })
    }

    pub fn labels(&self) -> Vec<i32> {
        self.samples.iter().map(|s| s.class_id as i32).collect()
    }

    /// Sample count per class id
    pub fn class_histogram(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.metadata.classes];
        for s in &self.samples {
            if let Some(c) = counts.get_mut(s.class_id as usize) {
                *c += 1;
            }
        }
        counts
    }

    /// Contiguous `(train, validation)` split at `train_fraction` of the rows.
    pub fn split(&self, train_fraction: f32) -> (&[LabeledSample], &[LabeledSample]) {
        let at = ((self.samples.len() as f32) * train_fraction.clamp(0.0, 1.0)) as usize;
        self.samples.split_at(at.min(self.samples.len()))
    }
}
