//! Adaptive cruise control car-following model.
//!
//! Switches between tracking a free-flow speed and tracking a time-headway gap
//! to the leader (see [`regime`](super::regime)), then caps the result so it
//! never exceeds what is safe should the leader brake as hard as it can.

use bevy_log::debug;

use crate::{
    driver::{
        regime::speed_control_accel, unconstrained_command, AccConfig, ControlState, StepInput,
    },
    Kinematics, VehicleType,
};

/// Radar range (m): leaders farther away than this do not influence the vehicle.
pub const INTERACTION_RANGE: f64 = 250.0;

/// ACC model for one vehicle class. Per-vehicle memory lives in [`ControlState`].
#[derive(Debug, Clone, PartialEq)]
pub struct AccModel {
    config: AccConfig,
    headway_time: f64,
}

impl AccModel {
    pub fn new(vtype: &VehicleType) -> Self {
        Self::with_config(AccConfig::from_vehicle_type(vtype), vtype.tau)
    }

    pub fn with_config(config: AccConfig, headway_time: f64) -> Self {
        Self {
            config,
            headway_time,
        }
    }

    pub fn config(&self) -> &AccConfig {
        &self.config
    }

    pub fn headway_time(&self) -> f64 {
        self.headway_time
    }

    /// A fresh model configured for `vtype`. Nothing is shared with `self`.
    pub fn duplicate(&self, vtype: &VehicleType) -> Self {
        Self::new(vtype)
    }

    /// Memory for a newly created vehicle of this class.
    pub fn create_vehicle_state(&self) -> ControlState {
        ControlState::default()
    }

    pub fn interaction_range(&self) -> f64 {
        INTERACTION_RANGE
    }

    /// Speed to adopt behind a leader.
    pub fn follow_speed(
        &self,
        state: &mut ControlState,
        input: &StepInput,
        kinematics: &impl Kinematics,
    ) -> f64 {
        let command =
            unconstrained_command(&self.config, self.headway_time, state, input, kinematics);
        let safe = kinematics.max_safe_follow_speed(
            input.gap,
            input.speed,
            input.leader_speed,
            input.leader_max_decel,
        );

        let limit = safe + self.config.emergency_override_margin;
        if limit < command.speed {
            debug!(
                "acc override t={} speed={:.2} leader={:.2} gap={:.2} v_acc={:.2} v_safe={:.2} mode={:?}",
                input.now.0,
                input.speed,
                input.leader_speed,
                input.gap,
                command.speed,
                safe,
                state.mode
            );
            return limit;
        }
        command.speed
    }

    /// Speed to adopt with no leader in range: the speed law alone.
    ///
    /// Leaves the vehicle's [`ControlState`] alone, so a leader coming back
    /// into range finds the mode and timestamp it last saw.
    pub fn free_speed(&self, input: &StepInput, kinematics: &impl Kinematics) -> f64 {
        let accel = speed_control_accel(&self.config, input.speed - input.desired_speed);
        (input.speed + kinematics.accel_to_speed(accel)).max(0.0)
    }

    /// Speed to adopt when approaching a standing obstacle `gap` ahead.
    ///
    /// Does not consult the ACC laws: there is no leader speed to track.
    pub fn stop_speed(
        &self,
        speed: f64,
        gap: f64,
        action_step_length: f64,
        kinematics: &impl Kinematics,
    ) -> f64 {
        kinematics
            .max_safe_stop_speed(gap, speed, action_step_length)
            .min(kinematics.max_next_speed(speed))
    }
}
