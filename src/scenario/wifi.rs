//! WiFi threat class rules. Rates are frames/s, variances dBm².

use super::pick;
use crate::features::ObservationFields;
use rand::rngs::StdRng;
use rand::Rng;

pub fn normal_traffic(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(8.0..12.0))
        .with("probe_rate", rng.gen_range(0.1..2.0))
        .with("deauth_rate", 0.0)
        .with("data_rate", rng.gen_range(50.0..200.0))
        .with("mgmt_ratio", rng.gen_range(0.05..0.15))
        .with("unique_macs", rng.gen_range(5u32..=50))
        .with("rssi_variance", rng.gen_range(5.0..15.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(4u32..=32))
        .with("hidden_ssid", rng.gen_bool(0.1))
        .with("wps_active", rng.gen_bool(0.3))
        .with("encryption", pick(rng, &["WPA2", "WPA3"]))
}

/// Flood of deauth frames from few sources, management traffic dominates
pub fn deauth_attack(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(8.0..12.0))
        .with("probe_rate", rng.gen_range(0.1..2.0))
        .with("deauth_rate", rng.gen_range(50.0..500.0))
        .with("data_rate", rng.gen_range(0.0..50.0))
        .with("mgmt_ratio", rng.gen_range(0.8..0.95))
        .with("unique_macs", rng.gen_range(1u32..=5))
        .with("rssi_variance", rng.gen_range(1.0..5.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(4u32..=32))
        .with("hidden_ssid", false)
        .with("wps_active", false)
        .with("encryption", "WPA2")
}

/// Cloned identity: few MACs, high RSSI variance from two radios
pub fn evil_twin(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(15.0..30.0))
        .with("probe_rate", rng.gen_range(0.1..2.0))
        .with("deauth_rate", rng.gen_range(0.0..10.0))
        .with("data_rate", rng.gen_range(10.0..100.0))
        .with("mgmt_ratio", rng.gen_range(0.2..0.4))
        .with("unique_macs", rng.gen_range(1u32..=3))
        .with("rssi_variance", rng.gen_range(20.0..40.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(4u32..=32))
        .with("hidden_ssid", false)
        .with("wps_active", false)
        .with("encryption", pick(rng, &["OPEN", "WPA2"]))
}

pub fn probe_flood(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(8.0..12.0))
        .with("probe_rate", rng.gen_range(100.0..1000.0))
        .with("deauth_rate", 0.0)
        .with("data_rate", rng.gen_range(0.0..20.0))
        .with("mgmt_ratio", rng.gen_range(0.9..0.99))
        .with("unique_macs", rng.gen_range(50u32..=200))
        .with("rssi_variance", rng.gen_range(1.0..5.0))
        .with("channel_hops", rng.gen_range(5u32..=14))
        .with("ssid_len", rng.gen_range(1u32..=32))
        .with("hidden_ssid", false)
        .with("wps_active", false)
        .with("encryption", "NONE")
}

/// Many fake APs from one transmitter
pub fn beacon_spam(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(100.0..500.0))
        .with("probe_rate", rng.gen_range(0.1..2.0))
        .with("deauth_rate", 0.0)
        .with("data_rate", 0.0)
        .with("mgmt_ratio", rng.gen_range(0.95..0.99))
        .with("unique_macs", rng.gen_range(20u32..=100))
        .with("rssi_variance", rng.gen_range(1.0..3.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(1u32..=32))
        .with("hidden_ssid", false)
        .with("wps_active", false)
        .with("encryption", pick(rng, &["OPEN", "WPA2"]))
}

pub fn rogue_ap(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(8.0..15.0))
        .with("probe_rate", rng.gen_range(0.1..5.0))
        .with("deauth_rate", 0.0)
        .with("data_rate", rng.gen_range(10.0..100.0))
        .with("mgmt_ratio", rng.gen_range(0.1..0.3))
        .with("unique_macs", rng.gen_range(1u32..=10))
        .with("rssi_variance", rng.gen_range(5.0..15.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(4u32..=32))
        .with("hidden_ssid", rng.gen_bool(0.3))
        .with("wps_active", rng.gen_bool(0.5))
        .with("encryption", "OPEN")
}

/// Answers every probe with a matching beacon
pub fn karma_attack(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(50.0..200.0))
        .with("probe_rate", rng.gen_range(10.0..50.0))
        .with("deauth_rate", 0.0)
        .with("data_rate", rng.gen_range(5.0..50.0))
        .with("mgmt_ratio", rng.gen_range(0.6..0.8))
        .with("unique_macs", rng.gen_range(1u32..=3))
        .with("rssi_variance", rng.gen_range(1.0..5.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(1u32..=32))
        .with("hidden_ssid", false)
        .with("wps_active", false)
        .with("encryption", "OPEN")
}

pub fn wps_attack(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("beacon_rate", rng.gen_range(8.0..12.0))
        .with("probe_rate", rng.gen_range(0.1..2.0))
        .with("deauth_rate", 0.0)
        .with("data_rate", rng.gen_range(10.0..50.0))
        .with("mgmt_ratio", rng.gen_range(0.2..0.4))
        .with("unique_macs", rng.gen_range(1u32..=3))
        .with("rssi_variance", rng.gen_range(1.0..10.0))
        .with("channel_hops", 0u32)
        .with("ssid_len", rng.gen_range(4u32..=32))
        .with("hidden_ssid", false)
        .with("wps_active", true)
        .with("encryption", "WPA2")
        .with("wps_attempts", rng.gen_range(100u32..=1000))
}
