//! Host controller: owns the sampler, the authoritative rover state and the
//! broadcaster, and advances all three once per frame.
//!
//! The frame loop is free-running (interval-driven here, the display-refresh
//! callback in a windowed build) and may skip frames under load; the
//! simulator carries no state between calls beyond [`RoverState`] itself, so
//! coalesced frames are harmless.

use std::sync::Arc;
use std::time::{Duration, Instant};

use syncrover_core::{ControlKey, EdgeEvent, RoverState, RoverTuning, Viewport};
use syncrover_sim::{step, KeySampler};
use syncrover_transport::{SignalChannel, StateBroadcaster};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::keys::KeyCommand;

/// ~60 Hz, the headless analog of the display refresh callback.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// MARK: - HostController

pub struct HostController {
    sampler: KeySampler,
    state: RoverState,
    broadcaster: StateBroadcaster,
    viewport: Viewport,
    tuning: RoverTuning,
}

impl HostController {
    pub fn new(channel: Arc<dyn SignalChannel>, viewport: Viewport, tuning: RoverTuning) -> Self {
        Self {
            sampler: KeySampler::new(tuning.horn_cooldown()),
            state: RoverState::default(),
            broadcaster: StateBroadcaster::new(channel),
            viewport,
            tuning,
        }
    }

    pub fn key_down(&mut self, key: ControlKey, repeat: bool, now: Instant) {
        self.sampler.key_down(key, repeat, now);
    }

    pub fn key_up(&mut self, key: ControlKey) {
        self.sampler.key_up(key);
    }

    pub fn state(&self) -> &RoverState {
        &self.state
    }

    /// One animation frame: sample input, step the simulator, publish.
    pub fn tick(&mut self) -> &RoverState {
        let frame = self.sampler.sample();
        if frame.has_edge(EdgeEvent::Horn) {
            info!("Horn!");
            self.broadcaster.publish_horn();
        }
        self.state = step(&self.state, &frame, self.viewport, &self.tuning);
        self.broadcaster.publish_state(&self.state);
        &self.state
    }
}

// MARK: - Frame loop

/// Drive the controller until quit or the key channel closes. Returning
/// drops the interval subscription and the sampler with it — nothing of the
/// loop survives teardown.
pub async fn run_host_loop(
    mut controller: HostController,
    mut keys: mpsc::Receiver<KeyCommand>,
) -> anyhow::Result<()> {
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame_count: u64 = 0;

    info!("Host loop running — drive with +w/-w, a, s, d, shift; l lights, r reset, h horn, q quit");
    loop {
        tokio::select! {
            _ = frames.tick() => {
                let state = controller.tick();
                frame_count += 1;
                if frame_count % 120 == 0 {
                    debug!(
                        "Rover at ({:.1}, {:.1}) heading {:.1}° lights={}",
                        state.x, state.y, state.angle, state.are_lights_on
                    );
                }
            }
            cmd = keys.recv() => {
                let now = Instant::now();
                match cmd {
                    Some(KeyCommand::Down(key)) => controller.key_down(key, false, now),
                    Some(KeyCommand::Up(key)) => controller.key_up(key),
                    Some(KeyCommand::Tap(key)) => {
                        controller.key_down(key, false, now);
                        controller.key_up(key);
                    }
                    Some(KeyCommand::Quit) | None => break,
                }
            }
        }
    }
    info!("Host loop stopped after {frame_count} frames");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use syncrover_core::PeerId;
    use syncrover_transport::{LoopbackHub, LABEL_CAR_UPDATE, LABEL_HORN};

    fn controller_with_viewer() -> (
        HostController,
        tokio::sync::broadcast::Receiver<syncrover_transport::ChannelMessage>,
    ) {
        let hub = LoopbackHub::new();
        let host = Arc::new(hub.attach(PeerId::new("host")));
        let viewer = hub.attach(PeerId::new("viewer"));
        let rx = viewer.subscribe();
        (
            HostController::new(host, Viewport::FHD, RoverTuning::default()),
            rx,
        )
    }

    #[tokio::test]
    async fn every_tick_publishes_a_car_update() {
        let (mut ctl, mut rx) = controller_with_viewer();
        ctl.key_down(ControlKey::Forward, false, Instant::now());
        ctl.tick();
        let msg = rx.recv().await.expect("published");
        assert_eq!(msg.label, LABEL_CAR_UPDATE);
        let state = RoverState::from_payload(&msg.payload).expect("valid payload");
        assert!(state.y < 50.0, "moved up from centre");
        assert!(state.keys.w);
    }

    #[tokio::test]
    async fn horn_press_broadcasts_once_within_cooldown() {
        let (mut ctl, mut rx) = controller_with_viewer();
        let t0 = Instant::now();

        ctl.key_down(ControlKey::Horn, false, t0);
        ctl.key_up(ControlKey::Horn);
        ctl.key_down(ControlKey::Horn, false, t0 + Duration::from_millis(500));
        ctl.key_up(ControlKey::Horn);
        ctl.tick();

        let horns = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|m| m.label == LABEL_HORN)
            .count();
        assert_eq!(horns, 1);
    }

    #[tokio::test]
    async fn viewer_mirror_tracks_the_host_exactly() {
        let (mut ctl, mut rx) = controller_with_viewer();
        let mut mirror = syncrover_transport::StateMirror::new();

        ctl.key_down(ControlKey::Forward, false, Instant::now());
        ctl.key_down(ControlKey::Right, false, Instant::now());
        for _ in 0..5 {
            ctl.tick();
            let msg = rx.recv().await.expect("published");
            assert!(mirror.apply(&msg.payload));
        }
        assert_eq!(mirror.state(), ctl.state());
    }
}
