//! State broadcast protocol on top of the signal channel.
//!
//! The host serializes the full [`RoverState`] after every simulation tick
//! and publishes it under `car-update`; viewers atomically replace their
//! mirror with each payload that parses. No interpolation, no
//! reconciliation — last message wins. Payloads that fail to parse are
//! discarded and the last good state is kept.

use std::sync::Arc;

use bytes::Bytes;
use syncrover_core::RoverState;
use tracing::{debug, warn};

use crate::channel::{SignalChannel, Target, LABEL_CAR_UPDATE, LABEL_HORN};

/// The horn channel is trigger-only; the payload content is irrelevant but
/// we keep the reference literal.
pub const HORN_PAYLOAD: &[u8] = b"play";

// MARK: - StateBroadcaster (host side)

pub struct StateBroadcaster {
    channel: Arc<dyn SignalChannel>,
}

impl StateBroadcaster {
    pub fn new(channel: Arc<dyn SignalChannel>) -> Self {
        Self { channel }
    }

    /// Publish the post-tick state to every peer. Send failures are logged
    /// and dropped — the next frame supersedes this one anyway.
    pub fn publish_state(&self, state: &RoverState) {
        let payload = match state.to_payload() {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                warn!("Failed to serialize rover state: {e}");
                return;
            }
        };
        if let Err(e) = self.channel.send(Target::All, LABEL_CAR_UPDATE, payload) {
            debug!("car-update dropped: {e}");
        }
    }

    /// Publish a horn trigger.
    pub fn publish_horn(&self) {
        if let Err(e) = self
            .channel
            .send(Target::All, LABEL_HORN, Bytes::from_static(HORN_PAYLOAD))
        {
            debug!("horn dropped: {e}");
        }
    }
}

// MARK: - StateMirror (viewer side)

/// The viewer's read-only copy of the rover state.
///
/// Viewers never simulate: each well-formed `car-update` payload replaces
/// the stored value wholesale. Any cosmetic easing belongs to the renderer
/// and must not leak back into this value.
#[derive(Debug, Default)]
pub struct StateMirror {
    state: RoverState,
}

impl StateMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a received payload. Returns `true` when the mirror changed;
    /// unparseable payloads are discarded, keeping the last good state.
    pub fn apply(&mut self, payload: &[u8]) -> bool {
        match RoverState::from_payload(payload) {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(e) => {
                warn!("Discarding malformed car-update payload: {e}");
                false
            }
        }
    }

    pub fn state(&self) -> &RoverState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::LoopbackHub;
    use syncrover_core::{HeldControls, InputFrame, PeerId, RoverTuning, Viewport};

    #[test]
    fn mirror_stores_received_tuple_verbatim() {
        let payload = br#"{"x":60,"y":40,"angle":90,
            "keys":{"w":false,"a":false,"s":false,"d":false,
                    "shift":false,"h":false,"l":false,"r":false},
            "areLightsOn":false}"#;
        let mut mirror = StateMirror::new();
        assert!(mirror.apply(payload));
        let s = mirror.state();
        assert_eq!((s.x, s.y, s.angle, s.are_lights_on), (60.0, 40.0, 90.0, false));
    }

    #[test]
    fn malformed_payload_keeps_last_good_state() {
        let mut mirror = StateMirror::new();
        let good = RoverState { x: 33.0, ..RoverState::default() };
        assert!(mirror.apply(&good.to_payload().expect("serialize")));

        for bad in [&b"{truncated"[..], b"", b"42", br#"{"x":"not a number"}"#] {
            assert!(!mirror.apply(bad));
            assert_eq!(mirror.state().x, 33.0, "last good state must survive");
        }
    }

    #[tokio::test]
    async fn host_tick_reaches_the_viewer_mirror_unchanged() {
        let hub = LoopbackHub::new();
        let host = Arc::new(hub.attach(PeerId::new("host")));
        let viewer = hub.attach(PeerId::new("viewer"));
        let mut viewer_rx = viewer.subscribe();

        let broadcaster = StateBroadcaster::new(host);
        let frame = InputFrame {
            held: HeldControls { forward: true, ..HeldControls::default() },
            edges: Vec::new(),
        };
        let state = syncrover_sim::step(
            &RoverState::default(),
            &frame,
            Viewport::FHD,
            &RoverTuning::default(),
        );
        broadcaster.publish_state(&state);

        let msg = viewer_rx.recv().await.expect("delivered");
        assert_eq!(msg.label, LABEL_CAR_UPDATE);
        let mut mirror = StateMirror::new();
        assert!(mirror.apply(&msg.payload));
        assert_eq!(mirror.state(), &state);
    }

    #[tokio::test]
    async fn horn_trigger_carries_the_play_payload() {
        let hub = LoopbackHub::new();
        let host = Arc::new(hub.attach(PeerId::new("host")));
        let viewer = hub.attach(PeerId::new("viewer"));
        let mut viewer_rx = viewer.subscribe();

        StateBroadcaster::new(host).publish_horn();

        let msg = viewer_rx.recv().await.expect("delivered");
        assert_eq!(msg.label, LABEL_HORN);
        assert_eq!(&msg.payload[..], HORN_PAYLOAD);
    }
}
