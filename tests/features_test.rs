//! Schema layout, encoding rules and per-class scenario conformance.

use rand::rngs::StdRng;
use rand::SeedableRng;
use threatpack::features::{
    ClipRange, FeatureCodec, FeatureSchema, FeatureSlot, FeatureVector, ObservationFields,
    BEHAVIORAL, WIFI_THREAT,
};
use threatpack::scenario::{ScenarioRegistry, ScenarioSampleGenerator};
use threatpack::PipelineError;

static BROKEN: FeatureSchema = FeatureSchema {
    name: "broken",
    width: 4,
    slots: &[
        FeatureSlot::linear("beacon_rate", 500.0),
        FeatureSlot {
            field: "mystery",
            default: 0.0,
            transform: None,
            clip: ClipRange::UNIT,
        },
    ],
};

fn wifi_codec() -> FeatureCodec {
    FeatureCodec::new(&WIFI_THREAT).unwrap()
}

#[test]
fn builtin_schemas_validate() {
    assert!(WIFI_THREAT.validate().is_ok());
    assert!(BEHAVIORAL.validate().is_ok());
    assert_eq!(WIFI_THREAT.width, 32);
    assert_eq!(BEHAVIORAL.width, 72);
    assert_ne!(WIFI_THREAT.layout_hash(), BEHAVIORAL.layout_hash());
    assert_eq!(FeatureSchema::by_name("behavioral"), Some(&BEHAVIORAL));
    assert_eq!(FeatureSchema::by_name("audio"), None);
}

#[test]
fn wifi_encoding_scales_each_slot() {
    let fields = ObservationFields::new()
        .with("beacon_rate", 250.0)
        .with("probe_rate", 100.0)
        .with("deauth_rate", 0.0)
        .with("data_rate", 50.0)
        .with("mgmt_ratio", 0.5)
        .with("unique_macs", 20u32)
        .with("rssi_variance", 10.0)
        .with("channel_hops", 7u32)
        .with("ssid_len", 8u32)
        .with("hidden_ssid", true)
        .with("wps_active", false)
        .with("encryption", "WPA2")
        .with("wps_attempts", 100u32);
    let v = wifi_codec().encode(&fields).unwrap();
    let s = v.as_slice();
    assert_eq!(s.len(), 32);
    assert!((s[0] - 0.5).abs() < 1e-6);
    assert!((s[1] - 0.1).abs() < 1e-6);
    assert_eq!(s[2], 0.0);
    assert!((s[3] - 0.25).abs() < 1e-6);
    assert!((s[5] - 0.1).abs() < 1e-6);
    assert!((s[6] - 0.25).abs() < 1e-6);
    assert!((s[7] - 0.5).abs() < 1e-6);
    assert!((s[8] - 0.25).abs() < 1e-6);
    assert_eq!(s[9], 1.0);
    assert_eq!(s[10], 0.0);
    assert_eq!(s[11], 0.75);
    assert!((s[12] - 0.1).abs() < 1e-6);
    assert!(s[13..].iter().all(|&x| x == 0.0));
}

#[test]
fn out_of_range_values_are_clipped() {
    let fields = ObservationFields::new()
        .with("deauth_rate", 5000.0)
        .with("beacon_rate", -3.0)
        .with("probe_rate", f64::NAN);
    let v = wifi_codec().encode(&fields).unwrap();
    assert_eq!(v.as_slice()[2], 1.0);
    assert_eq!(v.as_slice()[0], 0.0);
    assert_eq!(v.as_slice()[1], 0.0);
}

#[test]
fn unknown_encryption_encodes_as_open() {
    let codec = wifi_codec();
    let odd = codec
        .encode(&ObservationFields::new().with("encryption", "WPA9-ENTERPRISE"))
        .unwrap();
    assert_eq!(odd.as_slice()[11], 0.0);

    let lower = codec
        .encode(&ObservationFields::new().with("encryption", "wpa3"))
        .unwrap();
    assert_eq!(lower.as_slice()[11], 1.0);
}

#[test]
fn missing_fields_encode_to_zero() {
    let v = wifi_codec().encode(&ObservationFields::new()).unwrap();
    assert!(v.as_slice().iter().all(|&x| x == 0.0));
}

#[test]
fn behavioral_layout_keeps_reserved_slot_zero() {
    let codec = FeatureCodec::new(&BEHAVIORAL).unwrap();
    let fields = ObservationFields::new()
        .with("ap_count", 100u32)
        .with("reserved_1", 0.9)
        .with("pmkid_count", 5u32)
        .with("battery_level", 0.4)
        .with("charging", true)
        .with("uptime_ratio", 0.75);
    let v = codec.encode(&fields).unwrap();
    let s = v.as_slice();
    assert_eq!(s.len(), 72);
    assert!((s[0] - 0.5).abs() < 1e-6);
    assert_eq!(s[1], 0.0);
    assert!((s[2] - 0.5).abs() < 1e-6);
    assert!((s[4] - 0.4).abs() < 1e-6);
    assert_eq!(s[5], 1.0);
    assert_eq!(s[6], 0.0);
    assert!(s[8..].iter().all(|&x| x == 0.0));
}

#[test]
fn slot_without_transform_is_rejected() {
    let err = FeatureCodec::new(&BROKEN).unwrap_err();
    match err {
        PipelineError::UnknownSchemaField { index, field, .. } => {
            assert_eq!(index, 1);
            assert_eq!(field, "mystery");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn vector_width_must_match_schema() {
    let err = FeatureVector::new(&WIFI_THREAT, vec![0.0; 31]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::SchemaLengthMismatch {
            expected: 32,
            actual: 31,
            ..
        }
    ));

    let v = FeatureVector::new(&WIFI_THREAT, vec![0.0; 32]).unwrap();
    assert!(matches!(
        v.ensure_schema(&BEHAVIORAL),
        Err(PipelineError::SchemaMismatch { .. })
    ));
}

#[test]
fn decode_recovers_categories_and_flags() {
    let codec = wifi_codec();
    let fields = ObservationFields::new()
        .with("encryption", "WEP")
        .with("wps_active", true)
        .with("beacon_rate", 100.0);
    let back = codec.decode(&codec.encode(&fields).unwrap()).unwrap();
    assert_eq!(back.get("encryption"), fields.get("encryption"));
    assert_eq!(back.get("wps_active"), fields.get("wps_active"));
    let rate = back.get("beacon_rate").and_then(|v| v.as_number()).unwrap();
    assert!((rate - 100.0).abs() < 1e-3);
}

#[test]
fn jitter_stays_in_unit_range_and_zero_std_is_exact() {
    let codec = wifi_codec().with_jitter(0.2);
    let mut rng = StdRng::seed_from_u64(3);
    let fields = ObservationFields::new().with("mgmt_ratio", 0.99).with("wps_active", true);
    for _ in 0..200 {
        let v = codec.encode_jittered(&fields, &mut rng).unwrap();
        assert!(v.as_slice().iter().all(|x| (0.0..=1.0).contains(x)));
    }

    let exact = wifi_codec().with_jitter(0.0);
    assert_eq!(
        exact.encode_jittered(&fields, &mut rng).unwrap(),
        exact.encode(&fields).unwrap()
    );
}

fn assert_registry_conforms(registry: ScenarioRegistry) {
    let schema = registry.schema();
    let codec = FeatureCodec::new(schema).unwrap();
    let classes = registry.class_count();
    let mut generator = ScenarioSampleGenerator::seeded(registry, 11);
    for class_id in 0..classes {
        for _ in 0..50 {
            let fields = generator.generate(class_id).unwrap();
            let v = codec.encode(&fields).unwrap();
            assert_eq!(v.len(), schema.width);
            assert!(
                v.as_slice().iter().all(|x| (0.0..=1.0).contains(x)),
                "class {} produced out-of-range value",
                class_id
            );
        }
    }
    assert!(matches!(
        generator.generate(classes),
        Err(PipelineError::UnknownClass { .. })
    ));
}

#[test]
fn every_wifi_class_conforms() {
    let registry = ScenarioRegistry::wifi_threat();
    assert_eq!(registry.class_count(), 9);
    assert_eq!(registry.class_id("DEAUTH"), Some(1));
    assert_registry_conforms(registry);
}

#[test]
fn every_behavioral_class_conforms() {
    let registry = ScenarioRegistry::behavioral();
    assert_eq!(registry.class_count(), 10);
    assert_eq!(registry.class_id("LEARNING_MODE"), Some(9));
    assert_registry_conforms(registry);
}

#[test]
fn deauth_class_carries_its_signature() {
    let mut generator = ScenarioSampleGenerator::seeded(ScenarioRegistry::wifi_threat(), 5);
    let codec = wifi_codec();
    for _ in 0..20 {
        let normal = codec.encode(&generator.generate(0).unwrap()).unwrap();
        let deauth = codec.encode(&generator.generate(1).unwrap()).unwrap();
        assert_eq!(normal.as_slice()[2], 0.0);
        assert!(deauth.as_slice()[2] >= 0.1);
        assert!(deauth.as_slice()[4] >= 0.8);
    }
}

#[test]
fn seeded_generators_agree() {
    let mut a = ScenarioSampleGenerator::seeded(ScenarioRegistry::behavioral(), 99);
    let mut b = ScenarioSampleGenerator::seeded(ScenarioRegistry::behavioral(), 99);
    for class_id in 0..10 {
        assert_eq!(a.generate(class_id).unwrap(), b.generate(class_id).unwrap());
    }
}
