use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Drive tuning for the rover simulator.
///
/// The defaults carry the reference constants; all fields can be overridden
/// per session. Speeds are percentage-of-viewport units per tick — motion is
/// deliberately NOT scaled by frame delta, so effective speed follows the
/// host's tick rate. That refresh-rate dependence is a documented
/// characteristic of the reference behavior, kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverTuning {
    /// Forward speed per tick without boost.
    #[serde(alias = "baseSpeed")]
    pub base_speed: f64,
    /// Forward speed per tick with boost held. Strictly faster than base.
    #[serde(alias = "nitroSpeed")]
    pub nitro_speed: f64,
    /// Heading change in degrees per tick while turning.
    #[serde(alias = "turnSpeed")]
    pub turn_speed: f64,
    /// Reverse speed as a fraction of forward speed.
    #[serde(alias = "reverseFactor")]
    pub reverse_factor: f64,
    /// Visual bounding-circle radius of the rover sprite, in pixels.
    #[serde(alias = "roverRadiusPx")]
    pub rover_radius_px: f64,
    /// Minimum interval between accepted horn triggers, in milliseconds.
    #[serde(alias = "hornCooldownMs")]
    pub horn_cooldown_ms: u64,
}

impl Default for RoverTuning {
    fn default() -> Self {
        Self {
            base_speed: 0.8,
            nitro_speed: 1.5,
            turn_speed: 3.5,
            reverse_factor: 0.7,
            rover_radius_px: 64.5,
            horn_cooldown_ms: 3000,
        }
    }
}

impl RoverTuning {
    pub fn horn_cooldown(&self) -> Duration {
        Duration::from_millis(self.horn_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::RoverTuning;

    #[test]
    fn defaults_match_reference_constants() {
        let tuning = RoverTuning::default();
        assert_eq!(tuning.base_speed, 0.8);
        assert_eq!(tuning.nitro_speed, 1.5);
        assert_eq!(tuning.turn_speed, 3.5);
        assert_eq!(tuning.reverse_factor, 0.7);
        assert_eq!(tuning.rover_radius_px, 64.5);
        assert_eq!(tuning.horn_cooldown_ms, 3000);
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let json = r#"{
            "baseSpeed": 1.0,
            "nitroSpeed": 2.0,
            "turnSpeed": 4.0,
            "hornCooldownMs": 1500
        }"#;

        let tuning: RoverTuning = serde_json::from_str(json).expect("valid camelCase tuning");
        assert_eq!(tuning.base_speed, 1.0);
        assert_eq!(tuning.nitro_speed, 2.0);
        assert_eq!(tuning.turn_speed, 4.0);
        assert_eq!(tuning.horn_cooldown_ms, 1500);
        // Unspecified fields fall back to defaults
        assert_eq!(tuning.reverse_factor, 0.7);
    }
}
