// Synthetic pose frames shared by the integration tests
#![allow(dead_code)]

use vbt_tracker::{Joint, Keypoint, KeypointFrame};

pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 1000;

/// Side-on lifter with a knee angle of `knee_deg`, shoulder at `shoulder_y`
/// and wrist at `wrist_y` (normalized). Both sides are identical.
pub fn pose(knee_deg: f64, shoulder_y: f64, wrist_y: f64, timestamp_ms: f64) -> KeypointFrame {
    let vis = 0.9;
    let hip = (0.5, 0.5);
    let knee = (0.5, 0.7);
    let theta = knee_deg.to_radians();
    let ankle = (knee.0 + 0.2 * theta.sin(), knee.1 - 0.2 * theta.cos());
    let wrist = (0.55, wrist_y);
    let elbow = (0.55, wrist_y - 0.1);
    let shoulder = (0.5, shoulder_y);

    let mut keypoints = [Keypoint::default(); Joint::COUNT];
    let mut put = |joint: Joint, (x, y): (f64, f64)| {
        keypoints[joint.slot()] = Keypoint::new(x, y, vis);
    };
    for (l, r, p) in [
        (Joint::LeftShoulder, Joint::RightShoulder, shoulder),
        (Joint::LeftElbow, Joint::RightElbow, elbow),
        (Joint::LeftWrist, Joint::RightWrist, wrist),
        (Joint::LeftHip, Joint::RightHip, hip),
        (Joint::LeftKnee, Joint::RightKnee, knee),
        (Joint::LeftAnkle, Joint::RightAnkle, ankle),
    ] {
        put(l, p);
        put(r, p);
    }

    KeypointFrame::new(keypoints, WIDTH, HEIGHT, timestamp_ms)
}

/// Squat frame where the shoulder drops 1 px per degree of knee flexion.
pub fn squat_frame(knee_deg: f64, timestamp_ms: f64) -> KeypointFrame {
    let shoulder_y = 0.3 + (180.0 - knee_deg) / 1000.0;
    pose(knee_deg, shoulder_y, 0.45, timestamp_ms)
}

/// Deadlift frame with the hands at `wrist_y` and legs straight.
pub fn deadlift_frame(wrist_y: f64, timestamp_ms: f64) -> KeypointFrame {
    pose(180.0, 0.3, wrist_y, timestamp_ms)
}

pub const FULL_SQUAT: [f64; 11] = [
    180.0, 170.0, 150.0, 130.0, 95.0, 85.0, 95.0, 130.0, 150.0, 170.0, 180.0,
];
pub const SHALLOW_SQUAT: [f64; 8] = [180.0, 150.0, 130.0, 100.0, 95.0, 130.0, 170.0, 180.0];
