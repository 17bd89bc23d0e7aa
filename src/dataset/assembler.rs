//! Assembly: scenario draws → encoded vectors → one uniform shuffle.

use super::{Dataset, DatasetMetadata, LabeledSample};
use crate::error::{PipelineError, Result};
use crate::features::FeatureCodec;
use crate::scenario::ScenarioSampleGenerator;
use chrono::Utc;
use rand::seq::SliceRandom;
use tracing::info;

pub struct DatasetAssembler;

impl DatasetAssembler {
    /// Exactly `class_count * samples_per_class` samples, shuffled so class blocks are
    /// not contiguous (consumers split by index range).
    pub fn assemble(
        class_count: usize,
        samples_per_class: usize,
        generator: &mut ScenarioSampleGenerator,
        codec: &FeatureCodec,
    ) -> Result<Dataset> {
        let schema = codec.schema();
        let registry_schema = generator.registry().schema();
        if schema.name != registry_schema.name {
            return Err(PipelineError::SchemaMismatch {
                expected: registry_schema.name.to_string(),
                actual: schema.name.to_string(),
            });
        }
        let registered = generator.registry().class_count();
        if class_count > registered || class_count > u16::MAX as usize + 1 {
            return Err(PipelineError::UnknownClass {
                class_id: class_count.saturating_sub(1),
                class_count: registered,
            });
        }

        let mut samples = Vec::with_capacity(class_count * samples_per_class);
        for class_id in 0..class_count {
            for _ in 0..samples_per_class {
                let fields = generator.generate(class_id)?;
                let vector = codec.encode_jittered(&fields, generator.rng())?;
                samples.push(LabeledSample::new(vector, class_id as u16));
            }
        }
        samples.shuffle(generator.rng());

        let mut class_names = generator.registry().class_names();
        class_names.truncate(class_count);
        let metadata = DatasetMetadata {
            created: Utc::now(),
            schema: schema.name.to_string(),
            layout_hash: schema.layout_hash(),
            samples: samples.len(),
            features: schema.width,
            classes: class_count,
            class_names,
            samples_per_class,
        };

        info!(
            schema = schema.name,
            samples = metadata.samples,
            classes = class_count,
            jitter = codec.jitter_std(),
            "dataset assembled"
        );
        Dataset::new(samples, metadata)
    }
}
