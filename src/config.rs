// src/config.rs - Tunable thresholds for rep detection and velocity estimation
use crate::error::{Result, TrackingError};
use crate::fatigue::FatiguePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Hip, knee, ankle and shoulder must all be strictly above this to drive the state machine.
    pub min_visibility: f64,
    pub squat: SquatConfig,
    pub deadlift: DeadliftConfig,
    pub vision: VisionConfig,
    pub inertial: InertialConfig,
    pub fatigue_policy: FatiguePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatConfig {
    pub descent_angle: f64,
    pub lockout_angle: f64,
    pub depth_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeadliftConfig {
    /// Fraction of the elbow->wrist vector added past the wrist to approximate the gripped bar.
    pub grip_offset: f64,
    /// The bar is back on the floor once it is below `ankle_y - floor_margin_px`.
    pub floor_margin_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Weight of the raw sample in the exponential smoother.
    pub smoothing: f64,
    pub torso_length_m: f64,
    pub min_dt_s: f64,
    pub max_velocity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertialConfig {
    pub gravity: f64,
    pub dead_band: f64,
    pub decay: f64,
    pub snap_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_visibility: 0.5,
            squat: SquatConfig::default(),
            deadlift: DeadliftConfig::default(),
            vision: VisionConfig::default(),
            inertial: InertialConfig::default(),
            fatigue_policy: FatiguePolicy::RunningBest,
        }
    }
}

impl Default for SquatConfig {
    fn default() -> Self {
        Self {
            descent_angle: 140.0,
            lockout_angle: 160.0,
            depth_angle: 90.0,
        }
    }
}

impl Default for DeadliftConfig {
    fn default() -> Self {
        Self {
            grip_offset: 0.35,
            floor_margin_px: 30.0,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.8,
            torso_length_m: 0.5,
            min_dt_s: 0.05,
            max_velocity: 5.0,
        }
    }
}

impl Default for InertialConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            dead_band: 0.3,
            decay: 0.8,
            snap_threshold: 0.1,
        }
    }
}

impl TrackerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(TrackingError::InvalidConfig(msg.to_string()));

        if !(0.0..1.0).contains(&self.min_visibility) {
            return invalid("min_visibility must be in [0, 1)");
        }

        let s = &self.squat;
        if s.descent_angle >= s.lockout_angle {
            return invalid("squat.descent_angle must be below squat.lockout_angle");
        }
        if s.depth_angle > s.descent_angle {
            return invalid("squat.depth_angle must not exceed squat.descent_angle");
        }
        if s.lockout_angle > 180.0 || s.depth_angle < 0.0 {
            return invalid("squat angles must lie within [0, 180]");
        }

        if self.deadlift.grip_offset < 0.0 || self.deadlift.floor_margin_px < 0.0 {
            return invalid("deadlift offsets must be non-negative");
        }

        let v = &self.vision;
        if !(v.smoothing > 0.0 && v.smoothing <= 1.0) {
            return invalid("vision.smoothing must be in (0, 1]");
        }
        if v.torso_length_m <= 0.0 || v.min_dt_s <= 0.0 || v.max_velocity <= 0.0 {
            return invalid("vision torso length, min dt and max velocity must be positive");
        }

        let i = &self.inertial;
        if i.gravity <= 0.0 || i.dead_band < 0.0 || i.snap_threshold < 0.0 {
            return invalid("inertial gravity must be positive and thresholds non-negative");
        }
        if !(0.0..1.0).contains(&i.decay) {
            return invalid("inertial.decay must be in [0, 1)");
        }

        Ok(())
    }
}
