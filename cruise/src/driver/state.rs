use bevy_ecs::prelude::*;

use crate::SimTime;

/// Top-level control law an ACC vehicle is currently committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    SpeedControl,
    GapControl,
}

/// Per-vehicle ACC memory, carried across steps.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub mode: ControlMode,
    /// Time at which `mode` was last allowed to change.
    pub last_update: SimTime,
}

impl ControlState {
    /// Marks the start of an evaluation at `now`.
    ///
    /// Returns whether the mode may change during this call: only the first
    /// call of every timestamp gets to decide.
    pub fn begin_step(&mut self, now: SimTime) -> bool {
        if self.last_update == now {
            return false;
        }
        self.last_update = now;
        true
    }
}
