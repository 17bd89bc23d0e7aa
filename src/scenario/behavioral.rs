//! Behavioral (device context) class rules. Fields a rule leaves out encode to 0.

use crate::features::ObservationFields;
use rand::rngs::StdRng;
use rand::Rng;

pub fn safe(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(1u32..10))
        .with("deauth_count", 0u32)
        .with("battery_level", rng.gen_range(0.5..1.0))
}

pub fn crowded(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(50u32..200))
        .with("deauth_count", rng.gen_range(0u32..10))
}

/// A few PMKIDs harvested from open networks
pub fn open_network(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(5u32..30))
        .with("pmkid_count", rng.gen_range(1u32..5))
}

pub fn evil_twin_risk(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(10u32..20))
        .with("deauth_count", rng.gen_range(5u32..15))
}

pub fn deauth_detected(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(5u32..50))
        .with("deauth_count", rng.gen_range(50u32..200))
}

pub fn rogue_ap(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(1u32..10))
        .with("deauth_count", rng.gen_range(20u32..50))
}

/// Hostile surroundings on a draining battery
pub fn high_risk(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("ap_count", rng.gen_range(20u32..100))
        .with("deauth_count", rng.gen_range(30u32..100))
        .with("battery_level", rng.gen_range(0.1..0.3))
}

pub fn battery_critical(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("battery_level", rng.gen_range(0.0..0.05))
        .with("charging", false)
}

pub fn gesture_command(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new()
        .with("motion_detected", true)
        .with("uptime_ratio", rng.gen_range(0.0..1.0))
}

/// Freshly booted device still building its baseline
pub fn learning_mode(rng: &mut StdRng) -> ObservationFields {
    ObservationFields::new().with("uptime_ratio", rng.gen_range(0.0..0.1))
}
