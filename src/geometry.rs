// src/geometry.rs - Joint angles and bar position estimation
use crate::keypoints::SideKeypoints;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exercise {
    Squat,
    Deadlift,
}

impl Exercise {
    pub fn name(&self) -> &'static str {
        match self {
            Exercise::Squat => "SQUAT",
            Exercise::Deadlift => "DEADLIFT",
        }
    }
}

/// Estimated bar position in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarProxyPoint {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: f64,
}

impl BarProxyPoint {
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Angle at `b` formed by `a` and `c`, in whole degrees within [0, 180].
///
/// Coincident or non-finite points yield 0.
pub fn joint_angle(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;

    if !(ba.x.is_finite() && ba.y.is_finite() && bc.x.is_finite() && bc.y.is_finite()) {
        return 0.0;
    }
    if ba.norm() < EPSILON || bc.norm() < EPSILON {
        return 0.0;
    }

    let radians = bc.y.atan2(bc.x) - ba.y.atan2(ba.x);
    let mut degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    degrees.round()
}

/// Hip-knee-ankle angle used for squat depth and lockout.
pub fn knee_angle(side: &SideKeypoints) -> f64 {
    joint_angle(side.hip, side.knee, side.ankle)
}

/// Shoulder to hip distance in pixels, used as the metric scale reference.
pub fn torso_length(side: &SideKeypoints) -> f64 {
    let len = (side.shoulder - side.hip).norm();
    if len.is_finite() {
        len
    } else {
        0.0
    }
}

pub fn locate_bar_proxy(
    side: &SideKeypoints,
    exercise: Exercise,
    grip_offset: f64,
    timestamp_ms: f64,
) -> BarProxyPoint {
    let position = match exercise {
        // Bar rides on the back: horizontal from the hands, vertical from the shoulder line
        Exercise::Squat => Point2::new(side.wrist.x, side.shoulder.y),
        Exercise::Deadlift => {
            let forearm = side.wrist - side.elbow;
            side.wrist + forearm * grip_offset
        }
    };

    BarProxyPoint {
        x: position.x,
        y: position.y,
        timestamp_ms,
    }
}
