//! Keyboard input sampler.
//!
//! Tracks the currently-held control set independently of the tick loop and
//! turns press-once keys (lights, reset, horn) into [`EdgeEvent`]s that fire
//! exactly once per physical press. OS key-repeat signals and re-entrant
//! key-down events while a key is already held are both suppressed.
//!
//! The horn cooldown is a stored deadline, not a timer: nothing can fire
//! after the sampler is dropped at session teardown.

use std::time::Instant;

use syncrover_core::{ControlKey, EdgeEvent, HeldControls, InputFrame};
use tracing::debug;

// MARK: - KeySampler

pub struct KeySampler {
    held: HeldControls,
    edges: Vec<EdgeEvent>,
    /// Next instant at which a horn trigger will be accepted again.
    horn_ready_at: Option<Instant>,
    horn_cooldown: std::time::Duration,
}

impl KeySampler {
    pub fn new(horn_cooldown: std::time::Duration) -> Self {
        Self {
            held: HeldControls::default(),
            edges: Vec::new(),
            horn_ready_at: None,
            horn_cooldown,
        }
    }

    /// Handle a key-down event. `repeat` marks an OS auto-repeat signal.
    pub fn key_down(&mut self, key: ControlKey, repeat: bool, now: Instant) {
        let was_held = self.held.is_held(key);
        self.held.set(key, true);

        // Held guard + repeat suppression: edge actions fire once per press.
        if repeat || was_held {
            return;
        }

        match key {
            ControlKey::Lights => self.edges.push(EdgeEvent::LightsToggle),
            ControlKey::Reset => self.edges.push(EdgeEvent::Reset),
            ControlKey::Horn => {
                if self.horn_on_cooldown(now) {
                    debug!("Horn suppressed — still on cooldown");
                } else {
                    self.horn_ready_at = Some(now + self.horn_cooldown);
                    self.edges.push(EdgeEvent::Horn);
                }
            }
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: ControlKey) {
        self.held.set(key, false);
    }

    /// Whether a horn trigger would currently be rejected.
    pub fn horn_on_cooldown(&self, now: Instant) -> bool {
        matches!(self.horn_ready_at, Some(ready) if now < ready)
    }

    /// Snapshot the held set and drain the edge queue for one tick.
    pub fn sample(&mut self) -> InputFrame {
        InputFrame {
            held: self.held,
            edges: std::mem::take(&mut self.edges),
        }
    }
}
