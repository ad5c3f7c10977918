//! Kinematic bounds shared by car-following models.
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)
//! - Time: seconds (s)

use crate::VehicleType;

/// Gaps are shrunk by this much before solving for a stopping speed so that
/// rounding never lets a vehicle end up exactly on the obstacle.
const NUMERICAL_EPS: f64 = 0.001;

/// Generic speed bounds a controller may consult but does not own.
pub trait Kinematics {
    /// Highest speed from which the ego vehicle can still avoid a collision
    /// if the leader starts braking with `leader_max_decel` right now.
    fn max_safe_follow_speed(
        &self,
        gap: f64,
        speed: f64,
        leader_speed: f64,
        leader_max_decel: f64,
    ) -> f64;

    /// Highest speed from which the ego vehicle can stop within `gap`, reacting
    /// after `headway` seconds.
    fn max_safe_stop_speed(&self, gap: f64, speed: f64, headway: f64) -> f64;

    /// Highest speed reachable within one step.
    fn max_next_speed(&self, speed: f64) -> f64;

    /// Speed change produced by `accel` over one step.
    fn accel_to_speed(&self, accel: f64) -> f64;
}

/// Bounds for an Euler position update (`x += v_next * dt`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerKinematics {
    pub step_length: f64,
    pub accel: f64,
    pub decel: f64,
    pub tau: f64,
    pub max_speed: f64,
}

impl EulerKinematics {
    pub fn new(vtype: &VehicleType, step_length: f64) -> Self {
        Self {
            step_length,
            accel: vtype.accel,
            decel: vtype.decel,
            tau: vtype.tau,
            max_speed: vtype.max_speed,
        }
    }

    /// Overrides the top speed, e.g. for a vehicle with an individual speed factor.
    pub fn with_max_speed(mut self, max_speed: f64) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// Distance covered while braking from `speed` to standstill at `decel`,
    /// reducing speed once per step.
    pub fn brake_gap(&self, speed: f64, decel: f64) -> f64 {
        let reduction = self.accel_to_speed(decel);
        if reduction <= 0.0 {
            return 0.0;
        }
        let steps = (speed / reduction).floor();
        (steps * speed - reduction * steps * (steps + 1.0) / 2.0) * self.step_length
    }
}

impl Kinematics for EulerKinematics {
    fn max_safe_follow_speed(
        &self,
        gap: f64,
        speed: f64,
        leader_speed: f64,
        leader_max_decel: f64,
    ) -> f64 {
        let leader_brake_gap = self.brake_gap(leader_speed, leader_max_decel);
        self.max_safe_stop_speed(gap + leader_brake_gap, speed, self.tau)
    }

    fn max_safe_stop_speed(&self, gap: f64, speed: f64, headway: f64) -> f64 {
        let g = gap - NUMERICAL_EPS;
        if g < 0.0 {
            return 0.0;
        }

        let b = self.accel_to_speed(self.decel);
        let s = self.step_length;
        if s <= 0.0 || b <= 0.0 {
            // Nothing moves during an empty step.
            return speed;
        }
        let t = headway;

        // Number of full braking steps before the final partial one.
        let n = (0.5 - (t + (s * s + 4.0 * (s * (2.0 * g / b - t) + t * t)).sqrt() * -0.5) / s)
            .floor()
            .max(0.0);
        let h = 0.5 * n * (n - 1.0) * b * s + n * b * t;
        let r = (g - h) / (n * s + t);

        (n * b + r).max(0.0)
    }

    fn max_next_speed(&self, speed: f64) -> f64 {
        (speed + self.accel_to_speed(self.accel)).min(self.max_speed)
    }

    fn accel_to_speed(&self, accel: f64) -> f64 {
        accel * self.step_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinematics() -> EulerKinematics {
        EulerKinematics::new(&VehicleType::new("car"), 1.0)
    }

    #[test]
    fn stop_speed_is_zero_without_room() {
        let k = kinematics();
        assert_eq!(k.max_safe_stop_speed(0.0, 10.0, 1.0), 0.0);
        assert_eq!(k.max_safe_stop_speed(-5.0, 10.0, 1.0), 0.0);
    }

    #[test]
    fn stop_speed_grows_with_gap() {
        let k = kinematics();
        let mut previous = 0.0;
        for gap in [1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0] {
            let v = k.max_safe_stop_speed(gap, 0.0, 1.0);
            assert!(v > previous, "gap {gap}: {v} <= {previous}");
            previous = v;
        }
    }

    #[test]
    fn stopping_from_safe_speed_fits_in_gap() {
        let k = kinematics();
        let gap = 10.0;
        let mut v = k.max_safe_stop_speed(gap, 0.0, 1.0);
        assert!((v - 7.249).abs() < 0.01, "{v}");

        // React for one step, then brake at decel until standing.
        let mut travelled = v * 1.0;
        while v > 0.0 {
            v = (v - k.decel).max(0.0);
            travelled += v;
        }
        assert!(travelled <= gap);
    }

    #[test]
    fn follow_speed_credits_leader_brake_gap() {
        let k = kinematics();
        let behind_parked = k.max_safe_follow_speed(30.0, 20.0, 0.0, 4.5);
        let behind_moving = k.max_safe_follow_speed(30.0, 20.0, 20.0, 4.5);
        assert!(behind_moving > behind_parked);
        assert_eq!(behind_parked, k.max_safe_stop_speed(30.0, 20.0, k.tau));
    }

    #[test]
    fn brake_gap_sums_discrete_steps() {
        let k = kinematics();
        // 9 -> 4.5 -> 0: covers 4.5 m after the first reduction.
        assert!((k.brake_gap(9.0, 4.5) - 4.5).abs() < 1e-12);
        assert_eq!(k.brake_gap(0.0, 4.5), 0.0);
        assert_eq!(k.brake_gap(10.0, 0.0), 0.0);
    }

    #[test]
    fn next_speed_is_capped() {
        let k = kinematics().with_max_speed(30.0);
        assert!((k.max_next_speed(10.0) - 12.6).abs() < 1e-12);
        assert_eq!(k.max_next_speed(29.0), 30.0);
    }

    #[test]
    fn empty_step_keeps_speed() {
        let k = EulerKinematics::new(&VehicleType::new("car"), 0.0);
        assert_eq!(k.max_safe_stop_speed(50.0, 12.0, 1.0), 12.0);
        assert_eq!(k.accel_to_speed(3.0), 0.0);
    }
}
