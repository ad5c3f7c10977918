//! Single-lane road the vehicles drive on.
//!
//! Units:
//! - Distance/Position: meters (m)
//! - Speed: meters per second (m/s)
//!
//! Speed reference:
//! - 50 km/h ≈ 13.9 m/s (urban)
//! - 80 km/h ≈ 22.2 m/s (highway)
//! - 120 km/h ≈ 33.3 m/s (motorway)

use bevy_ecs::prelude::*;

/// Speed limit constants in m/s
pub mod speed {
    /// 50 km/h - urban
    pub const URBAN: f64 = 13.9;
    /// 80 km/h - rural/highway
    pub const HIGHWAY: f64 = 22.2;
    /// 120 km/h - motorway
    pub const MOTORWAY: f64 = 33.3;
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Lane {
    pub length: f64,
    pub speed_limit: f64,
    /// Vehicles must stop at the end of the lane instead of leaving it.
    pub stop_at_end: bool,
}

impl Default for Lane {
    fn default() -> Self {
        Self {
            length: 2000.0,
            speed_limit: speed::HIGHWAY,
            stop_at_end: false,
        }
    }
}

impl Lane {
    pub fn new(length: f64, speed_limit: f64) -> Self {
        Self {
            length,
            speed_limit,
            stop_at_end: false,
        }
    }

    pub fn with_stop_at_end(mut self) -> Self {
        self.stop_at_end = true;
        self
    }

    /// Distance (m) from `position` to the end of the lane, never negative.
    pub fn distance_to_end(&self, position: f64) -> f64 {
        (self.length - position).max(0.0)
    }
}
