//! Persist and reload the three co-located dataset artifacts.

use super::{Dataset, DatasetMetadata, LabeledSample};
use crate::error::{PipelineError, Result};
use crate::features::{FeatureSchema, FeatureVector};
use crate::npy;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFiles {
    pub features: PathBuf,
    pub labels: PathBuf,
    pub metadata: PathBuf,
}

pub struct DatasetWriter {
    base_dir: PathBuf,
    prefix: String,
}

impl DatasetWriter {
    pub fn new(base_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn files(&self) -> DatasetFiles {
        let at = |suffix: &str| self.base_dir.join(format!("{}_{}", self.prefix, suffix));
        DatasetFiles {
            features: at("X.npy"),
            labels: at("y.npy"),
            metadata: at("metadata.json"),
        }
    }

    /// Write X, y and metadata. Nothing is written if the metadata disagrees with the data.
    pub fn persist(&self, dataset: &Dataset) -> Result<DatasetFiles> {
        dataset.validate()?;
        fs::create_dir_all(&self.base_dir)?;
        let files = self.files();

        npy::write_matrix(&files.features, &dataset.feature_matrix())?;
        let labels = dataset.labels();
        npy::write_file(&files.labels, &[labels.len()], labels)?;

        let mut w = BufWriter::new(File::create(&files.metadata)?);
        serde_json::to_writer_pretty(&mut w, dataset.metadata())?;
        writeln!(w)?;
        w.flush()?;

        info!(
            features = %files.features.display(),
            samples = dataset.len(),
            width = dataset.metadata().features,
            "dataset persisted"
        );
        Ok(files)
    }

    /// Reload a persisted dataset, re-deriving its shape from the arrays.
    pub fn load(&self) -> Result<Dataset> {
        let files = self.files();
        let metadata: DatasetMetadata =
            serde_json::from_reader(BufReader::new(File::open(&files.metadata)?))?;
        let (x_shape, x) = npy::read_file::<f32>(&files.features)?;
        let (y_shape, y) = npy::read_file::<i32>(&files.labels)?;

        let (rows, width) = match x_shape.as_slice() {
            [r, w] => (*r, *w),
            other => {
                return Err(PipelineError::DatasetShapeMismatch(format!(
                    "feature matrix must be 2-D, found shape {:?}",
                    other
                )))
            }
        };
        if y_shape.len() != 1 {
            return Err(PipelineError::DatasetShapeMismatch(format!(
                "label vector must be 1-D, found shape {:?}",
                y_shape
            )));
        }
        metadata.check(rows, width, &y)?;

        let schema = schema_for(&metadata)?;
        let samples = x
            .chunks(width.max(1))
            .take(rows)
            .zip(&y)
            .map(|(row, &label)| {
                Ok(LabeledSample::new(
                    FeatureVector::new(schema, row.to_vec())?,
                    label as u16,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Dataset::new(samples, metadata)
    }
}

fn schema_for(metadata: &DatasetMetadata) -> Result<&'static FeatureSchema> {
    let schema = FeatureSchema::by_name(&metadata.schema).ok_or_else(|| {
        PipelineError::SchemaMismatch {
            expected: "wifi_threat | behavioral".to_string(),
            actual: metadata.schema.clone(),
        }
    })?;
    if schema.layout_hash() != metadata.layout_hash {
        return Err(PipelineError::SchemaMismatch {
            expected: format!("{} layout {:08x}", schema.name, schema.layout_hash()),
            actual: format!("{} layout {:08x}", metadata.schema, metadata.layout_hash),
        });
    }
    Ok(schema)
}

