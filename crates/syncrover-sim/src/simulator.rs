//! Deterministic per-tick rover simulation.
//!
//! [`step`] is a pure transform from the previous state plus one tick of
//! input to the next state. It holds no state of its own — the host
//! controller owns the carried [`RoverState`] and calls `step` once per
//! animation frame.
//!
//! # Evaluation order
//!
//! Heading updates apply BEFORE translation within a tick (matching the
//! reference behavior): holding left+forward turns first, then moves along
//! the new heading. Reset overrides whatever motion this tick computed.
//!
//! Motion is not delta-time scaled; see [`RoverTuning`] for the rationale.

use syncrover_core::{EdgeEvent, InputFrame, RoverState, RoverTuning, Viewport};

/// Advance the rover by one tick.
pub fn step(
    prev: &RoverState,
    frame: &InputFrame,
    viewport: Viewport,
    tuning: &RoverTuning,
) -> RoverState {
    let margin_x = viewport.margin_x_pct(tuning.rover_radius_px);
    let margin_y = viewport.margin_y_pct(tuning.rover_radius_px);

    let held = &frame.held;
    let speed = if held.boost {
        tuning.nitro_speed
    } else {
        tuning.base_speed
    };

    let mut x = prev.x;
    let mut y = prev.y;
    let mut angle = prev.angle;

    // Heading first. Left and right may both apply; the net effect sums.
    if held.left {
        angle -= tuning.turn_speed;
    }
    if held.right {
        angle += tuning.turn_speed;
    }

    let rad = angle.to_radians();
    if held.forward {
        x += rad.sin() * speed;
        y -= rad.cos() * speed;
    }
    // Reverse is independent of forward (both may be held the same tick —
    // the net displacement sums) and runs at a reduced fraction of speed.
    if held.backward {
        x -= rad.sin() * speed * tuning.reverse_factor;
        y += rad.cos() * speed * tuning.reverse_factor;
    }

    // Clamp into the drivable box. min-then-max so a degenerate viewport
    // (margin above 50%) collapses toward the low margin instead of
    // panicking the way `f64::clamp` would.
    x = x.min(100.0 - margin_x).max(margin_x);
    y = y.min(100.0 - margin_y).max(margin_y);

    let mut are_lights_on = prev.are_lights_on;
    if frame.has_edge(EdgeEvent::LightsToggle) {
        are_lights_on = !are_lights_on;
    }

    // Reset overrides any motion computed this tick.
    if frame.has_edge(EdgeEvent::Reset) {
        x = 50.0;
        y = 50.0;
        angle = 0.0;
    }

    RoverState {
        x,
        y,
        angle,
        keys: held.snapshot(),
        are_lights_on,
    }
}
