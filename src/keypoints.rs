// src/keypoints.rs - Fixed-shape keypoint frames and tracking side selection
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const COUNT: usize = 12;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    // Position inside KeypointFrame::keypoints, matches the order of ALL
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Index of this joint in the 33-point MediaPipe pose topology.
    pub fn mediapipe_index(self) -> usize {
        match self {
            Joint::LeftShoulder => 11,
            Joint::RightShoulder => 12,
            Joint::LeftElbow => 13,
            Joint::RightElbow => 14,
            Joint::LeftWrist => 15,
            Joint::RightWrist => 16,
            Joint::LeftHip => 23,
            Joint::RightHip => 24,
            Joint::LeftKnee => 25,
            Joint::RightKnee => 26,
            Joint::LeftAnkle => 27,
            Joint::RightAnkle => 28,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub visibility: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

/// One pose-estimation result. Coordinates are normalized to [0, 1], y grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointFrame {
    pub keypoints: [Keypoint; Joint::COUNT],
    pub width: u32,
    pub height: u32,
    pub timestamp_ms: f64,
}

impl KeypointFrame {
    pub fn new(
        keypoints: [Keypoint; Joint::COUNT],
        width: u32,
        height: u32,
        timestamp_ms: f64,
    ) -> Self {
        Self {
            keypoints,
            width,
            height,
            timestamp_ms,
        }
    }

    pub fn get(&self, joint: Joint) -> &Keypoint {
        &self.keypoints[joint.slot()]
    }

    /// Keypoint scaled from normalized coordinates into frame pixels.
    pub fn pixel(&self, joint: Joint) -> Point2<f64> {
        let kp = self.get(joint);
        Point2::new(kp.x * self.width as f64, kp.y * self.height as f64)
    }

    pub fn tracked_side(&self) -> TrackedSide {
        TrackedSide::select(self)
    }

    pub fn side(&self, side: TrackedSide) -> SideKeypoints {
        let [shoulder, elbow, wrist, hip, knee, ankle] = side.joints();
        SideKeypoints {
            side,
            shoulder: self.pixel(shoulder),
            elbow: self.pixel(elbow),
            wrist: self.pixel(wrist),
            hip: self.pixel(hip),
            knee: self.pixel(knee),
            ankle: self.pixel(ankle),
            min_core_visibility: [shoulder, hip, knee, ankle]
                .iter()
                .map(|j| self.get(*j).visibility)
                .fold(f64::INFINITY, f64::min),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackedSide {
    Left,
    Right,
}

impl TrackedSide {
    /// Picks the side whose shoulder is more visible. Equal visibility resolves to `Right`.
    pub fn select(frame: &KeypointFrame) -> Self {
        let left = frame.get(Joint::LeftShoulder).visibility;
        let right = frame.get(Joint::RightShoulder).visibility;
        if left > right {
            TrackedSide::Left
        } else {
            TrackedSide::Right
        }
    }

    // shoulder, elbow, wrist, hip, knee, ankle
    fn joints(self) -> [Joint; 6] {
        match self {
            TrackedSide::Left => [
                Joint::LeftShoulder,
                Joint::LeftElbow,
                Joint::LeftWrist,
                Joint::LeftHip,
                Joint::LeftKnee,
                Joint::LeftAnkle,
            ],
            TrackedSide::Right => [
                Joint::RightShoulder,
                Joint::RightElbow,
                Joint::RightWrist,
                Joint::RightHip,
                Joint::RightKnee,
                Joint::RightAnkle,
            ],
        }
    }
}

/// Pixel-space joints of the tracked side for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideKeypoints {
    pub side: TrackedSide,
    pub shoulder: Point2<f64>,
    pub elbow: Point2<f64>,
    pub wrist: Point2<f64>,
    pub hip: Point2<f64>,
    pub knee: Point2<f64>,
    pub ankle: Point2<f64>,
    /// Lowest visibility among shoulder, hip, knee and ankle.
    pub min_core_visibility: f64,
}

impl SideKeypoints {
    pub fn is_reliable(&self, min_visibility: f64) -> bool {
        self.min_core_visibility > min_visibility
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn uniform_frame(visibility: f64) -> KeypointFrame {
        KeypointFrame::new([Keypoint::new(0.5, 0.5, visibility); Joint::COUNT], 640, 480, 0.0)
    }

    #[test]
    fn more_visible_shoulder_wins() {
        let mut frame = uniform_frame(0.9);
        frame.keypoints[Joint::LeftShoulder.slot()].visibility = 0.95;
        frame.keypoints[Joint::RightShoulder.slot()].visibility = 0.4;
        assert_eq!(frame.tracked_side(), TrackedSide::Left);

        frame.keypoints[Joint::RightShoulder.slot()].visibility = 0.99;
        assert_eq!(frame.tracked_side(), TrackedSide::Right);
    }

    #[test]
    fn tie_resolves_to_right() {
        assert_eq!(uniform_frame(0.7).tracked_side(), TrackedSide::Right);
    }

    #[test]
    fn side_keypoints_are_scaled_to_pixels() {
        let mut frame = uniform_frame(0.9);
        frame.keypoints[Joint::LeftKnee.slot()] = Keypoint::new(0.25, 0.75, 0.9);
        let side = frame.side(TrackedSide::Left);
        assert_eq!(side.knee, Point2::new(160.0, 360.0));
    }

    #[test]
    fn reliability_uses_weakest_core_joint() {
        let mut frame = uniform_frame(0.9);
        frame.keypoints[Joint::RightAnkle.slot()].visibility = 0.5;
        // wrist and elbow are not part of the gate
        frame.keypoints[Joint::RightWrist.slot()].visibility = 0.1;
        let side = frame.side(TrackedSide::Right);
        assert_eq!(side.min_core_visibility, 0.5);
        assert!(!side.is_reliable(0.5));
        assert!(frame.side(TrackedSide::Left).is_reliable(0.5));
    }

    #[test]
    fn slots_follow_declaration_order() {
        for (i, joint) in Joint::ALL.iter().enumerate() {
            assert_eq!(joint.slot(), i);
        }
    }
}
