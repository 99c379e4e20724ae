use serde::{Deserialize, Serialize};

// MARK: - KeySnapshot

/// Wire form of the held-input set, field names matching the broadcast JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySnapshot {
    pub w: bool,
    pub a: bool,
    pub s: bool,
    pub d: bool,
    pub shift: bool,
    pub h: bool,
    pub l: bool,
    pub r: bool,
}

// MARK: - RoverState

/// The authoritative rover state. One writer (the host's simulator), mirrored
/// read-only on every viewer, last write wins.
///
/// This struct is also the `car-update` payload; serde renames keep the JSON
/// identical to what viewers of older clients expect:
///
/// ```json
/// {"x":50.0,"y":50.0,"angle":0.0,
///  "keys":{"w":false,"a":false,"s":false,"d":false,
///          "shift":false,"h":false,"l":false,"r":false},
///  "areLightsOn":true}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoverState {
    /// Horizontal position, percentage-of-viewport units.
    pub x: f64,
    /// Vertical position, percentage-of-viewport units (screen Y grows down).
    pub y: f64,
    /// Heading in degrees. Unbounded — wraps only visually, never normalized.
    pub angle: f64,
    /// Held-input snapshot at the tick that produced this state.
    pub keys: KeySnapshot,
    #[serde(rename = "areLightsOn")]
    pub are_lights_on: bool,
}

impl Default for RoverState {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            angle: 0.0,
            keys: KeySnapshot::default(),
            are_lights_on: true,
        }
    }
}

impl RoverState {
    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_payload(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_centred_with_lights_on() {
        let state = RoverState::default();
        assert_eq!((state.x, state.y, state.angle), (50.0, 50.0, 0.0));
        assert!(state.are_lights_on);
        assert_eq!(state.keys, KeySnapshot::default());
    }

    #[test]
    fn wire_format_uses_original_field_names() {
        let json = serde_json::to_value(RoverState::default()).expect("serialize state");
        assert!(json.get("areLightsOn").is_some());
        assert!(json.get("are_lights_on").is_none());
        assert!(json["keys"].get("shift").is_some());
    }

    #[test]
    fn parses_a_payload_from_the_original_client() {
        let payload = br#"{"x":60,"y":40,"angle":90,
            "keys":{"w":true,"a":false,"s":false,"d":false,
                    "shift":true,"h":false,"l":false,"r":false},
            "areLightsOn":false}"#;
        let state = RoverState::from_payload(payload).expect("valid payload");
        assert_eq!((state.x, state.y, state.angle), (60.0, 40.0, 90.0));
        assert!(state.keys.w && state.keys.shift);
        assert!(!state.are_lights_on);
    }
}
