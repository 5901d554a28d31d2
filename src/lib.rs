// src/lib.rs
//! Real-time repetition analysis for squat and deadlift sets.
//!
//! Pose keypoints and barbell accelerometer readings go in; validated reps with
//! peak concentric velocity and velocity loss come out. Capture, rendering and
//! persistence belong to the caller.

pub mod config;
pub mod data;
pub mod error;
pub mod fatigue;
pub mod geometry;
pub mod inertial;
pub mod keypoints;
pub mod mediapipe_bridge;
pub mod pipeline;
pub mod rep_counter;
pub mod sensor_bridge;
pub mod session;
pub mod tracking;
pub mod vision;

pub use config::TrackerConfig;
pub use error::{Result, TrackingError};
pub use geometry::{BarProxyPoint, Exercise};
pub use keypoints::{Joint, Keypoint, KeypointFrame, TrackedSide};
pub use rep_counter::RepEvent;
pub use session::{FailureEvent, RepRecord, RepStage, Session, SessionSummary, VelocitySource};
pub use tracking::{FrameResult, InertialResult, VbtTracker};
