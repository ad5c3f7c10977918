//! ACC regime classification and the speed and gap control laws.
//!
//! These are free functions so that other controllers built on the same laws
//! (e.g. a cooperative variant) can call them directly.
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)

use bevy_log::trace;

use crate::{
    driver::{AccConfig, ControlMode, ControlState},
    Kinematics, SimTime,
};

/// Above this gap the speed law is selected.
pub const SPEED_CONTROL_MIN_GAP: f64 = 120.0;
/// Below this gap the gap law is selected. In between, the stored mode holds.
pub const GAP_CONTROL_MAX_GAP: f64 = 100.0;

/// Spacing error (m) and relative speed (m/s) inside which following is stable.
const STABLE_SPACING_ERROR: f64 = 0.2;
const STABLE_SPEED_ERROR: f64 = 0.1;

/// Sub-regime of the gap law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapRegime {
    /// Gap and relative speed both within the stable band.
    Following,
    /// Gap smaller than desired.
    CollisionAvoidance,
    /// Gap larger than (or equal to) desired.
    Closing,
}

/// Which law produced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlLaw {
    Speed,
    Gap(GapRegime),
}

/// Everything the controller needs to know about one (ego, leader) pair this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInput {
    pub speed: f64,
    pub leader_speed: f64,
    /// Net gap to the leader, already excluding the ego's min gap.
    pub gap: f64,
    pub leader_max_decel: f64,
    /// Free-flow target, `min(lane speed limit, vehicle max speed)`.
    pub desired_speed: f64,
    pub min_gap: f64,
    pub action_step_length: f64,
    pub now: SimTime,
}

/// Desired free-flow speed for a vehicle on a lane.
pub fn desired_free_flow_speed(speed_limit: f64, max_speed: f64) -> f64 {
    speed_limit.min(max_speed)
}

/// Output of the unconstrained control law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccCommand {
    pub speed: f64,
    pub accel: f64,
    pub law: ControlLaw,
}

/// Proportional free-flow speed tracking.
pub fn speed_control_accel(config: &AccConfig, velocity_error: f64) -> f64 {
    config.speed_control_gain * velocity_error
}

/// Constant time headway gap tracking.
///
/// `gap` is the net gap handed to the controller; the vehicle's min gap is
/// taken off once more to get the usable spacing.
pub fn gap_control_accel(
    config: &AccConfig,
    headway_time: f64,
    gap: f64,
    min_gap: f64,
    speed: f64,
    leader_speed: f64,
) -> (f64, GapRegime) {
    let desired_spacing = headway_time * speed;
    let spacing_error = (gap - min_gap) - desired_spacing;
    let delta_speed = leader_speed - speed;

    let regime = if spacing_error.abs() < STABLE_SPACING_ERROR
        && delta_speed.abs() < STABLE_SPEED_ERROR
    {
        GapRegime::Following
    } else if spacing_error < 0.0 {
        GapRegime::CollisionAvoidance
    } else {
        GapRegime::Closing
    };

    let gains = match regime {
        GapRegime::Following => config.gap_following_gain,
        GapRegime::CollisionAvoidance => config.collision_avoidance_gain,
        GapRegime::Closing => config.gap_closing_gain,
    };

    (gains.accel(delta_speed, spacing_error), regime)
}

/// Picks the law to evaluate for `gap`, updating the stored mode when allowed.
///
/// The mode may only change on the first call of each timestamp. Inside the
/// hysteresis band `[GAP_CONTROL_MAX_GAP, SPEED_CONTROL_MIN_GAP]` no decision
/// is made and the stored mode is used as is.
pub fn select_mode(state: &mut ControlState, gap: f64, now: SimTime) -> ControlMode {
    let may_switch = state.begin_step(now);

    let selected = if gap > SPEED_CONTROL_MIN_GAP {
        ControlMode::SpeedControl
    } else if gap < GAP_CONTROL_MAX_GAP {
        ControlMode::GapControl
    } else {
        return state.mode;
    };

    if may_switch {
        state.mode = selected;
    }
    selected
}

/// The ACC command before the safety clamp. Never negative.
pub fn unconstrained_command(
    config: &AccConfig,
    headway_time: f64,
    state: &mut ControlState,
    input: &StepInput,
    kinematics: &impl Kinematics,
) -> AccCommand {
    let velocity_error = input.speed - input.desired_speed;

    let (accel, law) = match select_mode(state, input.gap, input.now) {
        ControlMode::SpeedControl => (speed_control_accel(config, velocity_error), ControlLaw::Speed),
        ControlMode::GapControl => {
            let (accel, regime) = gap_control_accel(
                config,
                headway_time,
                input.gap,
                input.min_gap,
                input.speed,
                input.leader_speed,
            );
            (accel, ControlLaw::Gap(regime))
        }
    };

    let speed = (input.speed + kinematics.accel_to_speed(accel)).max(0.0);

    trace!(
        "acc t={} gap={:.2} speed={:.2} leader={:.2} desired={:.2} -> {:?} accel={:.3} next={:.2}",
        input.now.0,
        input.gap,
        input.speed,
        input.leader_speed,
        input.desired_speed,
        law,
        accel,
        speed
    );

    AccCommand { speed, accel, law }
}
