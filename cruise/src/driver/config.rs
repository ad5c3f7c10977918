use crate::{CfParam, VehicleType};

pub const DEFAULT_SC_GAIN: f64 = -0.4;
pub const DEFAULT_GCC_GAIN_SPEED: f64 = 0.8;
pub const DEFAULT_GCC_GAIN_SPACE: f64 = 0.04;
pub const DEFAULT_GC_GAIN_SPEED: f64 = 0.07;
pub const DEFAULT_GC_GAIN_SPACE: f64 = 0.23;
pub const DEFAULT_CA_GAIN_SPEED: f64 = 0.23;
pub const DEFAULT_CA_GAIN_SPACE: f64 = 0.8;

/// ACC rarely keeps its min gap exactly, so collisions are only counted well
/// inside it.
pub const DEFAULT_COLLISION_MIN_GAP_FACTOR: f64 = 0.1;

/// Margin above the safe follow speed before the safety clamp intervenes (m/s).
pub const DEFAULT_EMERGENCY_OVERRIDE_MARGIN: f64 = 2.0;

/// Weights on relative speed and spacing error for one gap sub-regime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub speed: f64,
    pub space: f64,
}

impl Gains {
    pub const fn new(speed: f64, space: f64) -> Self {
        Self { speed, space }
    }

    pub fn accel(&self, delta_speed: f64, spacing_error: f64) -> f64 {
        self.speed * delta_speed + self.space * spacing_error
    }
}

/// Controller gains for one vehicle class. Never mutated once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccConfig {
    /// k1; negative so that driving too slow yields positive acceleration.
    pub speed_control_gain: f64,
    pub gap_closing_gain: Gains,
    pub gap_following_gain: Gains,
    pub collision_avoidance_gain: Gains,
    pub collision_min_gap_factor: f64,
    pub emergency_override_margin: f64,
}

impl Default for AccConfig {
    fn default() -> Self {
        Self {
            speed_control_gain: DEFAULT_SC_GAIN,
            gap_closing_gain: Gains::new(DEFAULT_GCC_GAIN_SPEED, DEFAULT_GCC_GAIN_SPACE),
            gap_following_gain: Gains::new(DEFAULT_GC_GAIN_SPEED, DEFAULT_GC_GAIN_SPACE),
            collision_avoidance_gain: Gains::new(DEFAULT_CA_GAIN_SPEED, DEFAULT_CA_GAIN_SPACE),
            collision_min_gap_factor: DEFAULT_COLLISION_MIN_GAP_FACTOR,
            emergency_override_margin: DEFAULT_EMERGENCY_OVERRIDE_MARGIN,
        }
    }
}

impl AccConfig {
    /// Resolves every gain from the vehicle type, falling back to the defaults.
    pub fn from_vehicle_type(vtype: &VehicleType) -> Self {
        let gains = |speed: CfParam, speed_default: f64, space: CfParam, space_default: f64| {
            Gains::new(
                vtype.cf_param(speed, speed_default),
                vtype.cf_param(space, space_default),
            )
        };

        Self {
            speed_control_gain: vtype.cf_param(CfParam::SpeedControlGain, DEFAULT_SC_GAIN),
            gap_closing_gain: gains(
                CfParam::GapClosingGainSpeed,
                DEFAULT_GCC_GAIN_SPEED,
                CfParam::GapClosingGainSpace,
                DEFAULT_GCC_GAIN_SPACE,
            ),
            gap_following_gain: gains(
                CfParam::GapFollowingGainSpeed,
                DEFAULT_GC_GAIN_SPEED,
                CfParam::GapFollowingGainSpace,
                DEFAULT_GC_GAIN_SPACE,
            ),
            collision_avoidance_gain: gains(
                CfParam::CollisionAvoidanceGainSpeed,
                DEFAULT_CA_GAIN_SPEED,
                CfParam::CollisionAvoidanceGainSpace,
                DEFAULT_CA_GAIN_SPACE,
            ),
            collision_min_gap_factor: vtype.cf_param(
                CfParam::CollisionMinGapFactor,
                DEFAULT_COLLISION_MIN_GAP_FACTOR,
            ),
            emergency_override_margin: vtype.cf_param(
                CfParam::EmergencyOverrideMargin,
                DEFAULT_EMERGENCY_OVERRIDE_MARGIN,
            ),
        }
    }
}
