//! Player motion model
//!
//! Integrates steering and throttle into lane position and forward speed:
//! - Direct-lerp or pull/inertia steering (see `SteeringModel`)
//! - Centrifugal drift toward the outside of the current segment's curve
//! - Throttle, brake and coast rates with an extra off-road drag
//!
//! Every update is solved in closed form over the tick rather than stepped,
//! so the state after one second does not depend on how that second is cut
//! into frames. Speed is piecewise linear, the lerp and the pull decay are
//! exponential, and the drift uses the tick's mean speed.

use crate::config::{PlayerSettings, SteeringModel};
use crate::data::{InputState, PlayerState};

/// Frame rate the lerp factor was tuned at
const LERP_REFERENCE_FPS: f32 = 60.0;

/// Half width of the tarmac in lane units
pub const ROAD_EDGE: f32 = 1.0;

/// Update the player for one tick. Returns the distance travelled along Z.
pub fn update_player(
    state: &mut PlayerState,
    settings: &PlayerSettings,
    input: &InputState,
    current_curve: f32,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }

    // Longitudinal first: the drift below needs the mean speed of the tick
    let mut rate = if input.up {
        settings.acceleration
    } else if input.down {
        -settings.braking
    } else {
        -settings.deceleration
    };
    if state.lane_position.abs() > ROAD_EDGE {
        rate -= settings.off_road_drag;
    }

    let (speed, distance) = integrate_speed(state.speed, rate, settings.max_speed, dt);
    state.speed = speed;
    state.camera_z += distance;

    // Lateral drift rate in lane units per second, outward from the bend
    let speed_ratio = (distance / dt / settings.max_speed).clamp(0.0, 1.0);
    let drift = current_curve * speed_ratio * settings.centrifugal_factor;

    match settings.steering {
        SteeringModel::DirectLerp => steer_lerp(state, settings, input, drift, dt),
        SteeringModel::Pull => steer_pull(state, settings, input, drift, dt),
    }
    state.lane_position = state
        .lane_position
        .clamp(-settings.lane_limit, settings.lane_limit);

    distance
}

/// Exponential approach to the target, with the drift shifting the rest point
fn steer_lerp(
    state: &mut PlayerState,
    settings: &PlayerSettings,
    input: &InputState,
    drift: f32,
    dt: f32,
) {
    state.target_lane = match (input.left, input.right) {
        (true, false) => -settings.lerp_target,
        (false, true) => settings.lerp_target,
        _ => 0.0,
    };

    let lambda = -LERP_REFERENCE_FPS * (1.0 - settings.lerp_factor).ln();
    if lambda.is_nan() || lambda <= 0.0 {
        state.lane_position -= drift * dt;
    } else if lambda.is_infinite() {
        state.lane_position = state.target_lane;
    } else {
        let rest = state.target_lane - drift / lambda;
        state.lane_position = rest + (state.lane_position - rest) * (-lambda * dt).exp();
    }
}

fn steer_pull(
    state: &mut PlayerState,
    settings: &PlayerSettings,
    input: &InputState,
    drift: f32,
    dt: f32,
) {
    if input.left_pressed {
        state.steering_pull -= settings.pull_step;
    }
    if input.right_pressed {
        state.steering_pull += settings.pull_step;
    }
    state.steering_pull = state
        .steering_pull
        .clamp(-settings.max_pull, settings.max_pull);

    let decay = settings.pull_decay;
    let steering = input.left || input.right;
    if !steering && decay > 0.0 {
        let keep = (-decay * dt).exp();
        let travel = (1.0 - keep) / decay;
        state.lane_position += state.steering_pull * settings.sideways_factor * travel;
        state.steering_pull *= keep;
    } else {
        state.lane_position += state.steering_pull * settings.sideways_factor * dt;
    }
    state.lane_position -= drift * dt;
}

/// Advance `speed` at a constant `rate` for `dt`, stopping at 0 or `max_speed`.
///
/// Returns the new speed and the distance covered during the tick.
pub fn integrate_speed(speed: f32, rate: f32, max_speed: f32, dt: f32) -> (f32, f32) {
    let v0 = speed.clamp(0.0, max_speed);
    let limit = if rate > 0.0 {
        max_speed
    } else if rate < 0.0 {
        0.0
    } else {
        return (v0, v0 * dt);
    };

    let time_to_limit = (limit - v0) / rate;
    if time_to_limit >= dt {
        let v1 = (v0 + rate * dt).clamp(0.0, max_speed);
        (v1, (v0 + v1) * 0.5 * dt)
    } else {
        let ramp = (v0 + limit) * 0.5 * time_to_limit;
        (limit, ramp + limit * (dt - time_to_limit))
    }
}
