//! Synthetic scenario generation: a registry of per-class rules, each drawing bounded
//! values that carry the qualitative signature of its class.

mod behavioral;
mod wifi;

use crate::error::{PipelineError, Result};
use crate::features::{FeatureSchema, ObservationFields, BEHAVIORAL, WIFI_THREAT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One class's generation rule. Rules only draw from bounded ranges, so they cannot fail.
pub type RuleFn = fn(&mut StdRng) -> ObservationFields;

#[derive(Clone, Copy)]
pub struct ScenarioRule {
    pub name: &'static str,
    pub generate: RuleFn,
}

impl std::fmt::Debug for ScenarioRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRule").field("name", &self.name).finish()
    }
}

/// Ordered class table bound to one schema; class id = position.
#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    schema: &'static FeatureSchema,
    rules: Vec<ScenarioRule>,
}

impl ScenarioRegistry {
    pub fn new(schema: &'static FeatureSchema) -> Self {
        Self {
            schema,
            rules: Vec::new(),
        }
    }

    /// Append a class; its id is the number of classes registered before it.
    pub fn register(mut self, name: &'static str, generate: RuleFn) -> Self {
        self.rules.push(ScenarioRule { name, generate });
        self
    }

    /// NORMAL .. UNKNOWN over the 32-wide WiFi threat schema
    pub fn wifi_threat() -> Self {
        Self::new(&WIFI_THREAT)
            .register("NORMAL", wifi::normal_traffic)
            .register("DEAUTH", wifi::deauth_attack)
            .register("EVIL_TWIN", wifi::evil_twin)
            .register("PROBE_FLOOD", wifi::probe_flood)
            .register("BEACON_SPAM", wifi::beacon_spam)
            .register("ROGUE_AP", wifi::rogue_ap)
            .register("KARMA_ATTACK", wifi::karma_attack)
            .register("WPS_ATTACK", wifi::wps_attack)
            // no distinct signature yet; trains on normal-looking traffic
            .register("UNKNOWN", wifi::normal_traffic)
    }

    /// SAFE .. LEARNING_MODE over the 72-wide behavioral schema
    pub fn behavioral() -> Self {
        Self::new(&BEHAVIORAL)
            .register("SAFE", behavioral::safe)
            .register("CROWDED", behavioral::crowded)
            .register("OPEN_NETWORK", behavioral::open_network)
            .register("EVIL_TWIN_RISK", behavioral::evil_twin_risk)
            .register("DEAUTH_DETECTED", behavioral::deauth_detected)
            .register("ROGUE_AP", behavioral::rogue_ap)
            .register("HIGH_RISK", behavioral::high_risk)
            .register("BATTERY_CRITICAL", behavioral::battery_critical)
            .register("GESTURE_COMMAND", behavioral::gesture_command)
            .register("LEARNING_MODE", behavioral::learning_mode)
    }

    pub fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    pub fn class_count(&self) -> usize {
        self.rules.len()
    }

    pub fn class_names(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.name.to_string()).collect()
    }

    pub fn rule(&self, class_id: usize) -> Result<&ScenarioRule> {
        self.rules.get(class_id).ok_or(PipelineError::UnknownClass {
            class_id,
            class_count: self.rules.len(),
        })
    }

    pub fn class_id(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }
}

/// Draws observations from a registry with its own seeded RNG
pub struct ScenarioSampleGenerator {
    registry: ScenarioRegistry,
    rng: StdRng,
}

impl ScenarioSampleGenerator {
    /// Reproducible generator for tests and pinned runs
    pub fn seeded(registry: ScenarioRegistry, seed: u64) -> Self {
        Self {
            registry,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy(registry: ScenarioRegistry) -> Self {
        Self {
            registry,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn registry(&self) -> &ScenarioRegistry {
        &self.registry
    }

    pub fn generate(&mut self, class_id: usize) -> Result<ObservationFields> {
        let rule = *self.registry.rule(class_id)?;
        Ok((rule.generate)(&mut self.rng))
    }

    /// Shared RNG, so jitter and shuffling follow the same seed as the draws
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

/// Uniform pick from a non-empty option list
pub(crate) fn pick(rng: &mut impl Rng, options: &[&'static str]) -> &'static str {
    options[rng.gen_range(0..options.len())]
}
