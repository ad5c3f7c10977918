mod acc;
pub use acc::*;

mod config;
pub use config::*;

mod state;
pub use state::*;

pub mod regime;
pub use regime::{
    desired_free_flow_speed, unconstrained_command, AccCommand, ControlLaw, GapRegime, StepInput,
};

mod vehicle;
pub use vehicle::*;

mod occupancy;
pub use occupancy::*;

mod follow;
pub use follow::*;

#[cfg(test)]
pub(crate) mod testing {
    use crate::Kinematics;

    /// Fixed bounds for exercising the controller without a real kinematic model.
    pub struct StubKinematics {
        pub step_length: f64,
        pub safe_follow: f64,
        pub safe_stop: f64,
        pub next_speed: f64,
    }

    impl StubKinematics {
        pub fn unit_step() -> Self {
            Self {
                step_length: 1.0,
                safe_follow: f64::INFINITY,
                safe_stop: f64::INFINITY,
                next_speed: f64::INFINITY,
            }
        }
    }

    impl Kinematics for StubKinematics {
        fn max_safe_follow_speed(&self, _: f64, _: f64, _: f64, _: f64) -> f64 {
            self.safe_follow
        }

        fn max_safe_stop_speed(&self, _: f64, _: f64, _: f64) -> f64 {
            self.safe_stop
        }

        fn max_next_speed(&self, _: f64) -> f64 {
            self.next_speed
        }

        fn accel_to_speed(&self, accel: f64) -> f64 {
            accel * self.step_length
        }
    }
}
