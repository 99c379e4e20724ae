//! Control model for the host's keyboard input.
//!
//! Two explicit types instead of one overloaded boolean map: `HeldControls`
//! is the level-sensitive "currently held" set sampled every tick, while
//! `EdgeEvent` carries the press-once actions (lights, reset, horn) that must
//! fire exactly once per physical key press.

use crate::state::KeySnapshot;

// MARK: - ControlKey

/// The fixed set of recognized control identities. Anything else on the
/// keyboard is ignored before it reaches the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    Forward,
    Left,
    Backward,
    Right,
    Boost,
    Horn,
    Lights,
    Reset,
}

impl ControlKey {
    /// Map a lowercased key-event name to a control. Returns `None` for
    /// unrecognized keys.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" => Some(Self::Forward),
            "a" => Some(Self::Left),
            "s" => Some(Self::Backward),
            "d" => Some(Self::Right),
            "shift" => Some(Self::Boost),
            "h" => Some(Self::Horn),
            "l" => Some(Self::Lights),
            "r" => Some(Self::Reset),
            _ => None,
        }
    }

    /// Whether this control fires once per press rather than while held.
    pub fn is_edge_triggered(&self) -> bool {
        matches!(self, Self::Horn | Self::Lights | Self::Reset)
    }
}

// MARK: - HeldControls

/// Currently-held state of every recognized control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldControls {
    pub forward: bool,
    pub left: bool,
    pub backward: bool,
    pub right: bool,
    pub boost: bool,
    pub horn: bool,
    pub lights: bool,
    pub reset: bool,
}

impl HeldControls {
    pub fn set(&mut self, key: ControlKey, held: bool) {
        match key {
            ControlKey::Forward => self.forward = held,
            ControlKey::Left => self.left = held,
            ControlKey::Backward => self.backward = held,
            ControlKey::Right => self.right = held,
            ControlKey::Boost => self.boost = held,
            ControlKey::Horn => self.horn = held,
            ControlKey::Lights => self.lights = held,
            ControlKey::Reset => self.reset = held,
        }
    }

    pub fn is_held(&self, key: ControlKey) -> bool {
        match key {
            ControlKey::Forward => self.forward,
            ControlKey::Left => self.left,
            ControlKey::Backward => self.backward,
            ControlKey::Right => self.right,
            ControlKey::Boost => self.boost,
            ControlKey::Horn => self.horn,
            ControlKey::Lights => self.lights,
            ControlKey::Reset => self.reset,
        }
    }

    /// Wire-format snapshot broadcast inside every `RoverState` payload.
    pub fn snapshot(&self) -> KeySnapshot {
        KeySnapshot {
            w: self.forward,
            a: self.left,
            s: self.backward,
            d: self.right,
            shift: self.boost,
            h: self.horn,
            l: self.lights,
            r: self.reset,
        }
    }
}

// MARK: - EdgeEvent

/// A press-once action, emitted by the sampler on the rising edge of its key
/// and consumed exactly once by the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEvent {
    /// Toggle headlights.
    LightsToggle,
    /// Snap the rover back to centre, heading zero.
    Reset,
    /// Play the horn locally and broadcast the trigger.
    Horn,
}

// MARK: - InputFrame

/// One tick's worth of input: the held set at sample time plus the edge
/// events accumulated since the previous tick.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub held: HeldControls,
    pub edges: Vec<EdgeEvent>,
}

impl InputFrame {
    pub fn has_edge(&self, edge: EdgeEvent) -> bool {
        self.edges.contains(&edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_keys_map_to_none() {
        for key in ["q", "enter", "escape", " ", "ctrl", "ш"] {
            assert!(ControlKey::from_key(key).is_none(), "{key:?} should be ignored");
        }
    }

    #[test]
    fn snapshot_mirrors_held_set() {
        let mut held = HeldControls::default();
        held.set(ControlKey::Forward, true);
        held.set(ControlKey::Boost, true);
        let snap = held.snapshot();
        assert!(snap.w && snap.shift);
        assert!(!snap.a && !snap.s && !snap.d && !snap.h && !snap.l && !snap.r);
    }
}
