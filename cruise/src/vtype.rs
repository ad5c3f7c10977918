//! Vehicle type definitions and their car-following parameters.
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Acceleration: meters per second squared (m/s²)
//! - Time: seconds (s)

use std::{fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Named car-following parameters a vehicle type may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfParam {
    SpeedControlGain,
    GapClosingGainSpeed,
    GapClosingGainSpace,
    GapFollowingGainSpeed,
    GapFollowingGainSpace,
    CollisionAvoidanceGainSpeed,
    CollisionAvoidanceGainSpace,
    CollisionMinGapFactor,
    EmergencyOverrideMargin,
}

impl CfParam {
    /// Key used in vehicle type files.
    pub fn key(self) -> &'static str {
        match self {
            CfParam::SpeedControlGain => "sc_gain",
            CfParam::GapClosingGainSpeed => "gcc_gain_speed",
            CfParam::GapClosingGainSpace => "gcc_gain_space",
            CfParam::GapFollowingGainSpeed => "gc_gain_speed",
            CfParam::GapFollowingGainSpace => "gc_gain_space",
            CfParam::CollisionAvoidanceGainSpeed => "ca_gain_speed",
            CfParam::CollisionAvoidanceGainSpace => "ca_gain_space",
            CfParam::CollisionMinGapFactor => "collision_min_gap_factor",
            CfParam::EmergencyOverrideMargin => "emergency_override_margin",
        }
    }
}

/// Per-type overrides; unset entries fall back to the model's defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CfParams {
    pub sc_gain: Option<f64>,
    pub gcc_gain_speed: Option<f64>,
    pub gcc_gain_space: Option<f64>,
    pub gc_gain_speed: Option<f64>,
    pub gc_gain_space: Option<f64>,
    pub ca_gain_speed: Option<f64>,
    pub ca_gain_space: Option<f64>,
    pub collision_min_gap_factor: Option<f64>,
    pub emergency_override_margin: Option<f64>,
}

impl CfParams {
    fn slot(&self, param: CfParam) -> Option<f64> {
        match param {
            CfParam::SpeedControlGain => self.sc_gain,
            CfParam::GapClosingGainSpeed => self.gcc_gain_speed,
            CfParam::GapClosingGainSpace => self.gcc_gain_space,
            CfParam::GapFollowingGainSpeed => self.gc_gain_speed,
            CfParam::GapFollowingGainSpace => self.gc_gain_space,
            CfParam::CollisionAvoidanceGainSpeed => self.ca_gain_speed,
            CfParam::CollisionAvoidanceGainSpace => self.ca_gain_space,
            CfParam::CollisionMinGapFactor => self.collision_min_gap_factor,
            CfParam::EmergencyOverrideMargin => self.emergency_override_margin,
        }
    }

    fn slot_mut(&mut self, param: CfParam) -> &mut Option<f64> {
        match param {
            CfParam::SpeedControlGain => &mut self.sc_gain,
            CfParam::GapClosingGainSpeed => &mut self.gcc_gain_speed,
            CfParam::GapClosingGainSpace => &mut self.gcc_gain_space,
            CfParam::GapFollowingGainSpeed => &mut self.gc_gain_speed,
            CfParam::GapFollowingGainSpace => &mut self.gc_gain_space,
            CfParam::CollisionAvoidanceGainSpeed => &mut self.ca_gain_speed,
            CfParam::CollisionAvoidanceGainSpace => &mut self.ca_gain_space,
            CfParam::CollisionMinGapFactor => &mut self.collision_min_gap_factor,
            CfParam::EmergencyOverrideMargin => &mut self.emergency_override_margin,
        }
    }
}

const ALL_CF_PARAMS: [CfParam; 9] = [
    CfParam::SpeedControlGain,
    CfParam::GapClosingGainSpeed,
    CfParam::GapClosingGainSpace,
    CfParam::GapFollowingGainSpeed,
    CfParam::GapFollowingGainSpace,
    CfParam::CollisionAvoidanceGainSpeed,
    CfParam::CollisionAvoidanceGainSpace,
    CfParam::CollisionMinGapFactor,
    CfParam::EmergencyOverrideMargin,
];

/// A class of vehicles sharing kinematic limits and controller parameters.
///
/// Defaults match a typical passenger car:
/// - Max acceleration: 2.6 m/s²
/// - Max deceleration: 4.5 m/s²
/// - Headway time (tau): 1.0 s
/// - Min gap: 2.5 m (bumper-to-bumper distance at standstill)
/// - Max speed: 55.55 m/s
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleType {
    pub id: String,
    #[serde(default = "defaults::accel")]
    pub accel: f64,
    #[serde(default = "defaults::decel")]
    pub decel: f64,
    #[serde(default = "defaults::tau")]
    pub tau: f64,
    #[serde(default = "defaults::min_gap")]
    pub min_gap: f64,
    #[serde(default = "defaults::max_speed")]
    pub max_speed: f64,
    #[serde(default = "defaults::length")]
    pub length: f64,
    #[serde(default)]
    pub cf: CfParams,
}

mod defaults {
    pub fn accel() -> f64 {
        2.6
    }
    pub fn decel() -> f64 {
        4.5
    }
    pub fn tau() -> f64 {
        1.0
    }
    pub fn min_gap() -> f64 {
        2.5
    }
    pub fn max_speed() -> f64 {
        55.55
    }
    pub fn length() -> f64 {
        5.0
    }
}

impl VehicleType {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            accel: defaults::accel(),
            decel: defaults::decel(),
            tau: defaults::tau(),
            min_gap: defaults::min_gap(),
            max_speed: defaults::max_speed(),
            length: defaults::length(),
            cf: CfParams::default(),
        }
    }

    pub fn with_cf_param(mut self, param: CfParam, value: f64) -> Self {
        *self.cf.slot_mut(param) = Some(value);
        self
    }

    /// The type's value for `param`, or `default` when the type leaves it unset.
    pub fn cf_param(&self, param: CfParam, default: f64) -> f64 {
        self.cf.slot(param).unwrap_or(default)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("accel", self.accel),
            ("decel", self.decel),
            ("tau", self.tau),
            ("max_speed", self.max_speed),
            ("length", self.length),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(self.invalid(name, value));
            }
        }

        if !self.min_gap.is_finite() || self.min_gap < 0.0 {
            return Err(self.invalid("min_gap", self.min_gap));
        }

        for param in ALL_CF_PARAMS {
            if let Some(value) = self.cf.slot(param) {
                if !value.is_finite() {
                    return Err(self.invalid(param.key(), value));
                }
            }
        }

        Ok(())
    }

    fn invalid(&self, name: &'static str, value: f64) -> ConfigError {
        ConfigError::InvalidParameter {
            vtype: self.id.clone(),
            name,
            value,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VehicleTypeFile {
    #[serde(default)]
    vtype: Vec<VehicleType>,
}

/// Validated set of vehicle types with unique ids.
#[derive(Debug, Clone, Default)]
pub struct VehicleTypes {
    types: Vec<VehicleType>,
}

impl VehicleTypes {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: VehicleTypeFile = toml::from_str(contents)?;

        let mut types = Self::default();
        for vtype in file.vtype {
            types.insert(vtype)?;
        }
        Ok(types)
    }

    pub fn insert(&mut self, vtype: VehicleType) -> Result<(), ConfigError> {
        vtype.validate()?;
        if self.get(&vtype.id).is_some() {
            return Err(ConfigError::DuplicateType(vtype.id));
        }
        self.types.push(vtype);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&VehicleType> {
        self.types.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
