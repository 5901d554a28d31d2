// src/tracking.rs - Frame and sensor entry points driving one training session
use crate::config::TrackerConfig;
use crate::geometry::{self, BarProxyPoint, Exercise};
use crate::inertial::{InertialSample, InertialVelocityEstimator};
use crate::keypoints::{KeypointFrame, TrackedSide};
use crate::rep_counter::{RepEvent, RepInput, RepStateMachine};
use crate::session::{RepStage, Session, SessionSummary, VelocitySource};
use crate::vision::{VisionSample, VisionVelocityEstimator};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub angle: f64,
    pub bar_proxy: Option<BarProxyPoint>,
    pub vision_velocity: f64,
    pub tracked_side: TrackedSide,
    pub stage: RepStage,
    pub stage_changed: bool,
    pub rep_event: Option<RepEvent>,
    /// True when low keypoint visibility kept this frame out of the session.
    pub skipped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InertialResult {
    pub velocity: f64,
    pub phase_peak: f64,
}

pub struct VbtTracker {
    config: TrackerConfig,
    session: Session,
    vision: VisionVelocityEstimator,
    inertial: InertialVelocityEstimator,
    rep_machine: RepStateMachine,
    last_angle: f64,
}

impl VbtTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            session: Session::new(config.fatigue_policy),
            vision: VisionVelocityEstimator::new(config.vision.clone()),
            inertial: InertialVelocityEstimator::new(config.inertial.clone()),
            rep_machine: RepStateMachine::new(config.squat.clone(), config.deadlift.clone()),
            last_angle: 0.0,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn submit_frame(&mut self, frame: &KeypointFrame, exercise: Exercise) -> FrameResult {
        let side = frame.side(frame.tracked_side());

        if !side.is_reliable(self.config.min_visibility) {
            debug!(
                visibility = side.min_core_visibility,
                "low keypoint visibility, frame skipped"
            );
            return FrameResult {
                angle: self.last_angle,
                bar_proxy: None,
                vision_velocity: self.vision.velocity(),
                tracked_side: side.side,
                stage: self.session.stage(),
                stage_changed: false,
                rep_event: None,
                skipped: true,
            };
        }

        let angle = geometry::knee_angle(&side);
        self.last_angle = angle;

        let bar = geometry::locate_bar_proxy(
            &side,
            exercise,
            self.config.deadlift.grip_offset,
            frame.timestamp_ms,
        );
        let torso_px = geometry::torso_length(&side);
        if let VisionSample::Accepted(velocity) = self.vision.update(&bar, torso_px) {
            self.session.observe_vision(velocity);
        }

        let input = match exercise {
            Exercise::Squat => RepInput::Squat { angle },
            Exercise::Deadlift => RepInput::Deadlift {
                bar_y: bar.y,
                knee_y: side.knee.y,
                ankle_y: side.ankle.y,
            },
        };
        let transition = self.rep_machine.advance(&mut self.session, input, frame.timestamp_ms);

        FrameResult {
            angle,
            bar_proxy: Some(bar),
            vision_velocity: self.vision.velocity(),
            tracked_side: side.side,
            stage: self.session.stage(),
            stage_changed: transition.stage_changed(),
            rep_event: transition.event(),
            skipped: false,
        }
    }

    pub fn submit_accel_sample(&mut self, raw: f64, timestamp_ms: f64) -> InertialResult {
        if let InertialSample::Integrated(velocity) = self.inertial.update(raw, timestamp_ms) {
            self.session.observe_inertial(velocity);
        }

        InertialResult {
            velocity: self.inertial.velocity(),
            phase_peak: self.session.inertial_peak(),
        }
    }

    /// Select which estimator's peak is committed on the next rep.
    pub fn set_inertial_active(&mut self, active: bool) {
        let source = if active {
            VelocitySource::Inertial
        } else {
            VelocitySource::Vision
        };
        if self.session.source() != source {
            info!(?source, "velocity source switched");
        }
        self.session.set_source(source);
    }

    pub fn reset_session(&mut self) {
        self.session.reset();
        self.vision.reset();
        self.inertial.reset();
        self.last_angle = 0.0;
    }

    pub fn close_session(&self) -> SessionSummary {
        let summary = self.session.summary();
        info!(
            session = %self.session.id(),
            reps = summary.rep_count,
            best_velocity = summary.best_velocity,
            "session closed"
        );
        summary
    }
}

impl Default for VbtTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
