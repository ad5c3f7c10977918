//! Simulated time as seen by the controllers.
//!
//! The ACC law debounces its mode switches on exact timestamp equality, so the
//! clock counts whole milliseconds instead of accumulating float seconds.

use std::time::Duration;

use bevy_ecs::prelude::*;
use bevy_time::Time;

/// A point in simulated time, in milliseconds since the start of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Whole milliseconds of `elapsed`; the sub-millisecond part is dropped.
    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self(elapsed.as_millis() as u64)
    }
}

/// Current simulation time and the length of the step being simulated.
#[derive(Resource, Debug, Default)]
pub struct SimulationClock {
    pub now: SimTime,
    /// Seconds covered by the current step.
    pub step_length: f64,
    /// Exact time simulated so far; `now` is derived from it so that short
    /// frames still add up.
    elapsed: Duration,
}

impl SimulationClock {
    pub fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
        self.now = SimTime::from_elapsed(self.elapsed);
        self.step_length = delta.as_secs_f64();
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

pub fn advance_clock(time: Res<Time>, mut clock: ResMut<SimulationClock>) {
    clock.advance(time.delta());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        driver::{AccModel, ControlMode, StepInput},
        EulerKinematics, VehicleType,
    };

    #[test]
    fn advance_tracks_time_and_step() {
        let mut clock = SimulationClock::default();
        clock.advance(Duration::from_millis(100));
        clock.advance(Duration::from_millis(250));

        assert_eq!(clock.now, SimTime::from_millis(350));
        assert!((clock.step_length - 0.25).abs() < 1e-12);
        assert!((clock.now.as_secs_f64() - 0.35).abs() < 1e-12);
    }

    #[test]
    fn sub_millisecond_frames_accumulate() {
        let mut clock = SimulationClock::default();
        for _ in 0..1000 {
            clock.advance(Duration::from_micros(900));
        }
        assert_eq!(clock.now, SimTime::from_millis(900));
        assert_eq!(clock.elapsed(), Duration::from_millis(900));
    }

    #[test]
    fn sixty_hz_frames_do_not_drift() {
        let mut clock = SimulationClock::default();
        for _ in 0..60 {
            clock.advance(Duration::from_micros(16_667));
        }
        assert_eq!(clock.now, SimTime::from_millis(1000));
        assert!((clock.step_length - 0.016_667).abs() < 1e-12);
    }

    #[test]
    fn short_frames_still_let_the_mode_switch() {
        let model = AccModel::new(&VehicleType::new("acc_car"));
        let kinematics = EulerKinematics::new(&VehicleType::new("acc_car"), 0.0009);
        let mut clock = SimulationClock::default();
        let mut state = model.create_vehicle_state();

        for _ in 0..100 {
            clock.advance(Duration::from_micros(900));
            let input = StepInput {
                speed: 20.0,
                leader_speed: 20.0,
                gap: 50.0,
                leader_max_decel: 4.5,
                desired_speed: 30.0,
                min_gap: 2.5,
                action_step_length: clock.step_length,
                now: clock.now,
            };
            model.follow_speed(&mut state, &input, &kinematics);
        }
        assert_eq!(state.mode, ControlMode::GapControl);
    }

    #[test]
    fn zero_delta_keeps_timestamp() {
        let mut clock = SimulationClock::default();
        clock.advance(Duration::ZERO);
        assert_eq!(clock.now, SimTime::ZERO);
        assert_eq!(clock.step_length, 0.0);
    }
}
