// src/session.rs - Per-set state: stage, depth flag, velocity peaks and committed reps
use crate::fatigue::{velocity_loss, FatiguePolicy};
use crate::geometry::Exercise;
use crate::vision::round2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepStage {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocitySource {
    #[default]
    Vision,
    Inertial,
}

/// Running maximum speed within one phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityTrack {
    peak: f64,
}

impl VelocityTrack {
    pub fn observe(&mut self, velocity: f64) {
        if velocity.is_finite() && velocity > self.peak {
            self.peak = velocity;
        }
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    pub fn reset(&mut self) {
        self.peak = 0.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepRecord {
    pub index: u32,
    pub exercise: Exercise,
    pub peak_velocity: f64,
    pub fatigue_percent: u8,
    pub source: VelocitySource,
    pub valid: bool,
}

/// A return to the top without reaching depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailureEvent {
    pub attempt_index: u32,
    pub exercise: Exercise,
    pub timestamp_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub rep_count: usize,
    pub best_velocity: f64,
    pub failed_attempts: usize,
    pub average_fatigue: f64,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    fatigue_policy: FatiguePolicy,
    records: Vec<RepRecord>,
    failures: Vec<FailureEvent>,
    stage: RepStage,
    depth_reached: bool,
    vision_track: VelocityTrack,
    inertial_track: VelocityTrack,
    source: VelocitySource,
}

impl Session {
    pub fn new(fatigue_policy: FatiguePolicy) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            fatigue_policy,
            records: Vec::new(),
            failures: Vec::new(),
            stage: RepStage::Up,
            depth_reached: false,
            vision_track: VelocityTrack::default(),
            inertial_track: VelocityTrack::default(),
            source: VelocitySource::Vision,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> RepStage {
        self.stage
    }

    pub fn depth_reached(&self) -> bool {
        self.depth_reached
    }

    pub fn source(&self) -> VelocitySource {
        self.source
    }

    pub fn set_source(&mut self, source: VelocitySource) {
        self.source = source;
    }

    pub fn records(&self) -> &[RepRecord] {
        &self.records
    }

    pub fn failures(&self) -> &[FailureEvent] {
        &self.failures
    }

    pub fn vision_peak(&self) -> f64 {
        self.vision_track.peak()
    }

    pub fn inertial_peak(&self) -> f64 {
        self.inertial_track.peak()
    }

    pub fn observe_vision(&mut self, velocity: f64) {
        self.vision_track.observe(velocity);
    }

    pub fn observe_inertial(&mut self, velocity: f64) {
        self.inertial_track.observe(velocity);
    }

    pub fn rep_count(&self) -> usize {
        self.records.len()
    }

    pub fn best_velocity(&self) -> f64 {
        self.records.iter().map(|r| r.peak_velocity).fold(0.0, f64::max)
    }

    /// Enter the DOWN phase: depth flag and both peaks start over.
    pub fn begin_descent(&mut self) {
        self.stage = RepStage::Down;
        self.depth_reached = false;
        self.vision_track.reset();
        self.inertial_track.reset();
    }

    /// Latch the depth flag. Has no effect outside the DOWN phase.
    pub fn mark_depth(&mut self) {
        if self.stage == RepStage::Down {
            self.depth_reached = true;
        }
    }

    /// Leave the DOWN phase and append a rep using the active source's peak.
    pub fn commit_rep(&mut self, exercise: Exercise) -> RepRecord {
        self.stage = RepStage::Up;

        let peak_velocity = round2(match self.source {
            VelocitySource::Inertial => self.inertial_track.peak(),
            VelocitySource::Vision => self.vision_track.peak(),
        });
        let prior: Vec<f64> = self.records.iter().map(|r| r.peak_velocity).collect();
        let record = RepRecord {
            index: self.records.len() as u32 + 1,
            exercise,
            peak_velocity,
            fatigue_percent: velocity_loss(peak_velocity, &prior, self.fatigue_policy),
            source: self.source,
            valid: true,
        };
        self.records.push(record);

        info!(
            rep = record.index,
            exercise = exercise.name(),
            peak_velocity = record.peak_velocity,
            fatigue = record.fatigue_percent,
            "rep committed"
        );
        record
    }

    /// Leave the DOWN phase without a rep.
    pub fn record_failure(&mut self, exercise: Exercise, timestamp_ms: f64) -> FailureEvent {
        self.stage = RepStage::Up;

        let event = FailureEvent {
            attempt_index: self.records.len() as u32 + 1,
            exercise,
            timestamp_ms,
        };
        self.failures.push(event);

        warn!(attempt = event.attempt_index, exercise = exercise.name(), "rep failed depth check");
        event
    }

    /// Drop every rep and in-flight phase state. Identity and start time are kept.
    pub fn reset(&mut self) {
        self.records.clear();
        self.failures.clear();
        self.stage = RepStage::Up;
        self.depth_reached = false;
        self.vision_track.reset();
        self.inertial_track.reset();
        info!(session = %self.id, "session reset");
    }

    pub fn summary(&self) -> SessionSummary {
        let average_fatigue = if self.records.is_empty() {
            0.0
        } else {
            let total: f64 = self.records.iter().map(|r| r.fatigue_percent as f64).sum();
            total / self.records.len() as f64
        };

        SessionSummary {
            session_id: self.id,
            started_at: self.started_at,
            rep_count: self.rep_count(),
            best_velocity: self.best_velocity(),
            failed_attempts: self.failures.len(),
            average_fatigue,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(FatiguePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_with_peak(session: &mut Session, peak: f64) -> RepRecord {
        session.begin_descent();
        session.mark_depth();
        session.observe_vision(peak);
        session.commit_rep(Exercise::Squat)
    }

    #[test]
    fn empty_session_summary() {
        let summary = Session::default().summary();
        assert_eq!(summary.rep_count, 0);
        assert_eq!(summary.best_velocity, 0.0);
        assert_eq!(summary.failed_attempts, 0);
    }

    #[test]
    fn indices_are_contiguous_and_fatigue_uses_running_best() {
        let mut session = Session::default();
        let records: Vec<RepRecord> = [1.0, 0.9, 0.7]
            .iter()
            .map(|&peak| commit_with_peak(&mut session, peak))
            .collect();

        assert_eq!(records.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(records.iter().map(|r| r.fatigue_percent).collect::<Vec<_>>(), vec![0, 10, 30]);
        assert_eq!(session.best_velocity(), 1.0);
        assert!((session.summary().average_fatigue - 40.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn failures_do_not_consume_indices() {
        let mut session = Session::default();
        commit_with_peak(&mut session, 0.8);
        session.begin_descent();
        let failure = session.record_failure(Exercise::Squat, 1234.0);
        assert_eq!(failure.attempt_index, 2);
        let next = commit_with_peak(&mut session, 0.7);
        assert_eq!(next.index, 2);
        assert_eq!(session.summary().failed_attempts, 1);
    }

    #[test]
    fn depth_only_latches_while_down() {
        let mut session = Session::default();
        session.mark_depth();
        assert!(!session.depth_reached());
        session.begin_descent();
        session.mark_depth();
        assert!(session.depth_reached());
        session.begin_descent();
        assert!(!session.depth_reached());
    }

    #[test]
    fn peaks_are_monotonic_and_reset_on_descent() {
        let mut session = Session::default();
        session.begin_descent();
        session.observe_vision(0.5);
        session.observe_vision(0.3);
        session.observe_inertial(0.9);
        session.observe_inertial(f64::NAN);
        assert_eq!(session.vision_peak(), 0.5);
        assert_eq!(session.inertial_peak(), 0.9);
        session.begin_descent();
        assert_eq!(session.vision_peak(), 0.0);
        assert_eq!(session.inertial_peak(), 0.0);
    }

    #[test]
    fn active_source_decides_committed_peak() {
        let mut session = Session::default();
        session.set_source(VelocitySource::Inertial);
        session.begin_descent();
        session.observe_vision(0.456);
        session.observe_inertial(0.614);
        let record = session.commit_rep(Exercise::Deadlift);
        assert_eq!(record.peak_velocity, 0.61);
        assert_eq!(record.source, VelocitySource::Inertial);
    }

    #[test]
    fn reset_mid_descent_returns_to_rest() {
        let mut session = Session::default();
        commit_with_peak(&mut session, 1.0);
        session.begin_descent();
        session.mark_depth();
        session.observe_vision(0.4);
        let id = session.id();
        session.reset();

        assert_eq!(session.id(), id);
        assert_eq!(session.stage(), RepStage::Up);
        assert!(!session.depth_reached());
        assert_eq!(session.vision_peak(), 0.0);
        let summary = session.summary();
        assert_eq!(summary.session_id, id);
        assert_eq!((summary.rep_count, summary.best_velocity), (0, 0.0));
    }
}
