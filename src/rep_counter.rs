// src/rep_counter.rs - UP/DOWN phase machine for squat and deadlift
use crate::config::{DeadliftConfig, SquatConfig};
use crate::geometry::Exercise;
use crate::session::{FailureEvent, RepRecord, RepStage, Session};
use serde::Serialize;
use tracing::debug;

/// Per-tick observation that drives the phase machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepInput {
    /// Hip-knee-ankle angle in degrees.
    Squat { angle: f64 },
    /// Vertical pixel positions, y grows downward.
    Deadlift { bar_y: f64, knee_y: f64, ankle_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepEvent {
    Committed(RepRecord),
    Failed(FailureEvent),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    None,
    Descended,
    Completed(RepEvent),
}

impl Transition {
    pub fn stage_changed(&self) -> bool {
        !matches!(self, Transition::None)
    }

    pub fn event(&self) -> Option<RepEvent> {
        match self {
            Transition::Completed(event) => Some(*event),
            _ => None,
        }
    }
}

pub struct RepStateMachine {
    squat: SquatConfig,
    deadlift: DeadliftConfig,
}

impl RepStateMachine {
    pub fn new(squat: SquatConfig, deadlift: DeadliftConfig) -> Self {
        Self { squat, deadlift }
    }

    pub fn advance(&self, session: &mut Session, input: RepInput, timestamp_ms: f64) -> Transition {
        match input {
            RepInput::Squat { angle } => self.advance_squat(session, angle, timestamp_ms),
            RepInput::Deadlift { bar_y, knee_y, ankle_y } => {
                self.advance_deadlift(session, bar_y, knee_y, ankle_y)
            }
        }
    }

    fn advance_squat(&self, session: &mut Session, angle: f64, timestamp_ms: f64) -> Transition {
        if !angle.is_finite() {
            return Transition::None;
        }

        match session.stage() {
            RepStage::Up => {
                if angle < self.squat.descent_angle {
                    session.begin_descent();
                    if angle <= self.squat.depth_angle {
                        session.mark_depth();
                    }
                    debug!(angle, "squat descent started");
                    Transition::Descended
                } else {
                    Transition::None
                }
            }
            RepStage::Down => {
                if angle <= self.squat.depth_angle {
                    session.mark_depth();
                }

                if angle > self.squat.lockout_angle {
                    let event = if session.depth_reached() {
                        RepEvent::Committed(session.commit_rep(Exercise::Squat))
                    } else {
                        RepEvent::Failed(session.record_failure(Exercise::Squat, timestamp_ms))
                    };
                    Transition::Completed(event)
                } else {
                    Transition::None
                }
            }
        }
    }

    fn advance_deadlift(
        &self,
        session: &mut Session,
        bar_y: f64,
        knee_y: f64,
        ankle_y: f64,
    ) -> Transition {
        if !(bar_y.is_finite() && knee_y.is_finite() && ankle_y.is_finite()) {
            return Transition::None;
        }

        match session.stage() {
            RepStage::Up => {
                if bar_y < knee_y {
                    session.begin_descent();
                    debug!(bar_y, knee_y, "deadlift bar passed the knee");
                    Transition::Descended
                } else {
                    Transition::None
                }
            }
            RepStage::Down => {
                if bar_y > ankle_y - self.deadlift.floor_margin_px {
                    let record = session.commit_rep(Exercise::Deadlift);
                    Transition::Completed(RepEvent::Committed(record))
                } else {
                    Transition::None
                }
            }
        }
    }
}

impl Default for RepStateMachine {
    fn default() -> Self {
        Self::new(SquatConfig::default(), DeadliftConfig::default())
    }
}
