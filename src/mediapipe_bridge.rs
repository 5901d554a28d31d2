// src/mediapipe_bridge.rs - Ingest MediaPipe pose landmarks into fixed-shape frames
use crate::error::{Result, TrackingError};
use crate::keypoints::{Joint, Keypoint, KeypointFrame};

/// Full MediaPipe pose topology size.
pub const POSE_LANDMARK_COUNT: usize = 33;

// Highest index we read is the right ankle
const REQUIRED_LANDMARKS: usize = 29;

/// Build a frame from MediaPipe landmarks laid out as `[x, y, z, visibility]`.
///
/// Only the twelve limb joints are kept; `z` is discarded.
pub fn frame_from_landmarks(
    landmarks: &[[f64; 4]],
    width: u32,
    height: u32,
    timestamp_ms: f64,
) -> Result<KeypointFrame> {
    if landmarks.len() < REQUIRED_LANDMARKS {
        return Err(TrackingError::TooFewLandmarks {
            got: landmarks.len(),
            needed: REQUIRED_LANDMARKS,
        });
    }
    if width == 0 || height == 0 {
        return Err(TrackingError::EmptyFrame { width, height });
    }

    let mut keypoints = [Keypoint::default(); Joint::COUNT];
    for joint in Joint::ALL {
        let index = joint.mediapipe_index();
        let [x, y, _z, visibility] = landmarks[index];
        if !(x.is_finite() && y.is_finite() && visibility.is_finite()) {
            return Err(TrackingError::NonFiniteLandmark { index });
        }
        keypoints[joint.slot()] = Keypoint::new(x, y, visibility.clamp(0.0, 1.0));
    }

    Ok(KeypointFrame::new(keypoints, width, height, timestamp_ms))
}
