//! Viewer renderer: receives broadcast state, applies it to the mirror,
//! never simulates.

use syncrover_transport::{ChannelMessage, StateMirror, LABEL_CAR_UPDATE, LABEL_HORN};
use tokio::sync::broadcast;
use tracing::{debug, info};

// MARK: - ViewerRenderer

#[derive(Default)]
pub struct ViewerRenderer {
    mirror: StateMirror,
    updates: u64,
    horns: u64,
}

impl ViewerRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mirror(&self) -> &StateMirror {
        &self.mirror
    }

    pub fn horns(&self) -> u64 {
        self.horns
    }

    pub fn handle(&mut self, msg: &ChannelMessage) {
        match msg.label.as_str() {
            LABEL_CAR_UPDATE => {
                if self.mirror.apply(&msg.payload) {
                    self.updates += 1;
                    let s = self.mirror.state();
                    if self.updates % 60 == 0 {
                        info!(
                            "Rover at ({:.1}, {:.1}) heading {:.1}° lights={}",
                            s.x, s.y, s.angle, s.are_lights_on
                        );
                    }
                }
            }
            LABEL_HORN => {
                // Trigger-only channel: any payload means "play the horn".
                self.horns += 1;
                info!("Horn from {}", msg.from);
            }
            other => debug!("Ignoring unknown label '{other}'"),
        }
    }
}

// MARK: - Receive loop

/// Drain the subscription until the channel closes. Lagged receivers skip
/// ahead — last write wins, so dropped intermediate states are harmless.
pub async fn run_viewer_loop(mut rx: broadcast::Receiver<ChannelMessage>) -> anyhow::Result<()> {
    let mut renderer = ViewerRenderer::new();
    loop {
        match rx.recv().await {
            Ok(msg) => renderer.handle(&msg),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                debug!("Viewer lagged, skipped {n} updates");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    info!("Viewer loop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use syncrover_core::{PeerId, RoverState};

    fn msg(label: &str, payload: &[u8]) -> ChannelMessage {
        ChannelMessage {
            from: PeerId::new("host"),
            label: label.to_string(),
            payload: Bytes::copy_from_slice(payload),
        }
    }

    #[test]
    fn car_update_replaces_the_mirror() {
        let mut renderer = ViewerRenderer::new();
        let state = RoverState { x: 61.0, y: 39.0, angle: 180.0, ..RoverState::default() };
        renderer.handle(&msg(LABEL_CAR_UPDATE, &state.to_payload().expect("serialize")));
        assert_eq!(renderer.mirror().state(), &state);
    }

    #[test]
    fn malformed_update_keeps_previous_state() {
        let mut renderer = ViewerRenderer::new();
        let state = RoverState { x: 61.0, ..RoverState::default() };
        renderer.handle(&msg(LABEL_CAR_UPDATE, &state.to_payload().expect("serialize")));
        renderer.handle(&msg(LABEL_CAR_UPDATE, b"not json"));
        assert_eq!(renderer.mirror().state().x, 61.0);
    }

    #[test]
    fn horn_and_unknown_labels_leave_the_mirror_alone() {
        let mut renderer = ViewerRenderer::new();
        renderer.handle(&msg(LABEL_HORN, b"play"));
        renderer.handle(&msg("chat", b"hi"));
        assert_eq!(renderer.horns(), 1);
        assert_eq!(renderer.mirror().state(), &RoverState::default());
    }
}
