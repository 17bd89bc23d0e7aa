//! Feature schemas: the single source of truth for vector layout.
//!
//! Rules:
//! 1. A slot's position, field and transform never change once a model has been
//!    trained against the schema. Changing any of them means a new schema.
//! 2. The 32-wide WiFi-threat and 72-wide behavioral layouts are distinct contracts
//!    for distinct models; a vector of one is never accepted by the other.
//! 3. Positions past the declared slots are reserved and always encode to `0.0`.

use crate::error::{PipelineError, Result};
use crc32fast::Hasher;

/// Encryption kinds as seen in beacon frames, mapped to `[0,1]`.
///
/// Unrecognized kinds encode as `OPEN` (0.0). This is deliberate policy: an AP whose
/// security cannot be classified is treated as offering no protection.
pub const ENCRYPTION_KINDS: &[(&str, f32)] = &[
    ("OPEN", 0.0),
    ("WEP", 0.25),
    ("WPA", 0.5),
    ("WPA2", 0.75),
    ("WPA3", 1.0),
    ("NONE", 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// `value / divisor`
    LinearScale { divisor: f32 },
    /// 1.0 when set, else 0.0
    Boolean,
    /// Table lookup by name, `default` for anything not in the table
    Categorical {
        table: &'static [(&'static str, f32)],
        default: f32,
    },
    /// Position kept for layout compatibility; always 0.0
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    pub lo: f32,
    pub hi: f32,
}

impl ClipRange {
    pub const UNIT: ClipRange = ClipRange { lo: 0.0, hi: 1.0 };

    /// Clamp into the range; NaN collapses to `lo`.
    pub fn apply(&self, x: f32) -> f32 {
        if x.is_nan() {
            self.lo
        } else {
            x.clamp(self.lo, self.hi)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSlot {
    pub field: &'static str,
    /// Raw value used when the observation lacks the field
    pub default: f64,
    /// `None` marks a slot whose field has no transform; encoding it is an error
    pub transform: Option<Transform>,
    pub clip: ClipRange,
}

impl FeatureSlot {
    pub const fn linear(field: &'static str, divisor: f32) -> Self {
        Self {
            field,
            default: 0.0,
            transform: Some(Transform::LinearScale { divisor }),
            clip: ClipRange::UNIT,
        }
    }

    pub const fn flag(field: &'static str) -> Self {
        Self {
            field,
            default: 0.0,
            transform: Some(Transform::Boolean),
            clip: ClipRange::UNIT,
        }
    }

    pub const fn categorical(
        field: &'static str,
        table: &'static [(&'static str, f32)],
        default: f32,
    ) -> Self {
        Self {
            field,
            default: 0.0,
            transform: Some(Transform::Categorical { table, default }),
            clip: ClipRange::UNIT,
        }
    }

    pub const fn reserved(field: &'static str) -> Self {
        Self {
            field,
            default: 0.0,
            transform: Some(Transform::Reserved),
            clip: ClipRange::UNIT,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct FeatureSchema {
    pub name: &'static str,
    pub width: usize,
    pub slots: &'static [FeatureSlot],
}

/// 32-wide layout of the WiFi threat classifier
pub static WIFI_THREAT: FeatureSchema = FeatureSchema {
    name: "wifi_threat",
    width: 32,
    slots: &[
        FeatureSlot::linear("beacon_rate", 500.0),
        FeatureSlot::linear("probe_rate", 1000.0),
        FeatureSlot::linear("deauth_rate", 500.0),
        FeatureSlot::linear("data_rate", 200.0),
        FeatureSlot::linear("mgmt_ratio", 1.0),
        FeatureSlot::linear("unique_macs", 200.0),
        FeatureSlot::linear("rssi_variance", 40.0),
        FeatureSlot::linear("channel_hops", 14.0),
        FeatureSlot::linear("ssid_len", 32.0),
        FeatureSlot::flag("hidden_ssid"),
        FeatureSlot::flag("wps_active"),
        FeatureSlot::categorical("encryption", ENCRYPTION_KINDS, 0.0),
        FeatureSlot::linear("wps_attempts", 1000.0),
    ],
};

/// 72-wide layout of the behavioral (device context) classifier
pub static BEHAVIORAL: FeatureSchema = FeatureSchema {
    name: "behavioral",
    width: 72,
    slots: &[
        FeatureSlot::linear("ap_count", 200.0),
        FeatureSlot::reserved("reserved_1"),
        FeatureSlot::linear("pmkid_count", 10.0),
        FeatureSlot::linear("deauth_count", 200.0),
        FeatureSlot::linear("battery_level", 1.0),
        FeatureSlot::flag("charging"),
        FeatureSlot::flag("motion_detected"),
        FeatureSlot::linear("uptime_ratio", 1.0),
    ],
};

impl FeatureSchema {
    /// Structural checks: slots fit the width, every slot has a transform, divisors are positive.
    pub fn validate(&self) -> Result<()> {
        if self.slots.len() > self.width {
            return Err(PipelineError::SchemaLengthMismatch {
                schema: self.name,
                expected: self.width,
                actual: self.slots.len(),
            });
        }
        for (index, slot) in self.slots.iter().enumerate() {
            match slot.transform {
                None => {
                    return Err(PipelineError::UnknownSchemaField {
                        schema: self.name,
                        index,
                        field: slot.field,
                    })
                }
                Some(Transform::LinearScale { divisor }) if divisor <= 0.0 => {
                    return Err(PipelineError::SchemaMismatch {
                        expected: format!("{}[{}] divisor > 0", self.name, index),
                        actual: divisor.to_string(),
                    })
                }
                _ => {}
            }
            if !(0.0..=1.0).contains(&slot.clip.lo)
                || !(0.0..=1.0).contains(&slot.clip.hi)
                || slot.clip.lo > slot.clip.hi
            {
                return Err(PipelineError::SchemaMismatch {
                    expected: format!("{}[{}] clip within [0,1]", self.name, index),
                    actual: format!("[{}, {}]", slot.clip.lo, slot.clip.hi),
                });
            }
        }
        Ok(())
    }

    /// CRC32 over name, width and ordered field names; persisted with datasets to detect drift.
    pub fn layout_hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(self.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(&(self.width as u32).to_le_bytes());
        for slot in self.slots {
            hasher.update(slot.field.as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize()
    }

    pub fn index_of(&self, field: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.field == field)
    }

    pub fn by_name(name: &str) -> Option<&'static FeatureSchema> {
        [&WIFI_THREAT, &BEHAVIORAL]
            .into_iter()
            .find(|s| s.name == name)
    }
}
