// src/pipeline.rs - Serialize camera and sensor producers onto one tracker task
use crate::error::{Result, TrackingError};
use crate::geometry::Exercise;
use crate::keypoints::KeypointFrame;
use crate::session::SessionSummary;
use crate::tracking::{FrameResult, InertialResult, VbtTracker};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum TrackerCommand {
    Frame(Box<KeypointFrame>, Exercise),
    Accel { value: f64, timestamp_ms: f64 },
    SetInertialActive(bool),
    Reset,
    Close(oneshot::Sender<SessionSummary>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerOutput {
    Frame(FrameResult),
    Inertial(InertialResult),
}

/// Cloneable sender side. Hand one clone to each producer.
#[derive(Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
    pub async fn submit_frame(&self, frame: KeypointFrame, exercise: Exercise) -> Result<()> {
        self.send(TrackerCommand::Frame(Box::new(frame), exercise)).await
    }

    pub async fn submit_accel_sample(&self, value: f64, timestamp_ms: f64) -> Result<()> {
        self.send(TrackerCommand::Accel { value, timestamp_ms }).await
    }

    pub async fn set_inertial_active(&self, active: bool) -> Result<()> {
        self.send(TrackerCommand::SetInertialActive(active)).await
    }

    pub async fn reset_session(&self) -> Result<()> {
        self.send(TrackerCommand::Reset).await
    }

    /// Read the summary once every command queued before this call has been applied.
    pub async fn close_session(&self) -> Result<SessionSummary> {
        let (reply, rx) = oneshot::channel();
        self.send(TrackerCommand::Close(reply)).await?;
        rx.await.map_err(|_| TrackingError::PipelineClosed)
    }

    async fn send(&self, command: TrackerCommand) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| TrackingError::PipelineClosed)
    }
}

/// Move `tracker` into its own task. The task ends once every handle is dropped
/// and returns the tracker. Results are published without waiting: when the
/// output receiver falls `capacity` results behind, newer results are dropped
/// while the session itself keeps every rep.
pub fn spawn_tracker(
    tracker: VbtTracker,
    capacity: usize,
) -> (TrackerHandle, mpsc::Receiver<TrackerOutput>, JoinHandle<VbtTracker>) {
    let (tx, mut rx) = mpsc::channel::<TrackerCommand>(capacity);
    let (out_tx, out_rx) = mpsc::channel::<TrackerOutput>(capacity);

    let task = tokio::spawn(async move {
        let mut tracker = tracker;
        while let Some(command) = rx.recv().await {
            let output = match command {
                TrackerCommand::Frame(frame, exercise) => {
                    Some(TrackerOutput::Frame(tracker.submit_frame(&frame, exercise)))
                }
                TrackerCommand::Accel { value, timestamp_ms } => {
                    Some(TrackerOutput::Inertial(tracker.submit_accel_sample(value, timestamp_ms)))
                }
                TrackerCommand::SetInertialActive(active) => {
                    tracker.set_inertial_active(active);
                    None
                }
                TrackerCommand::Reset => {
                    tracker.reset_session();
                    None
                }
                TrackerCommand::Close(reply) => {
                    let _ = reply.send(tracker.close_session());
                    None
                }
            };

            // A slow reader must never hold up the producers
            let Some(output) = output else { continue };
            match out_tx.try_send(output) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("tracker output queue full, result dropped"),
                Err(TrySendError::Closed(_)) => debug!("tracker output receiver dropped"),
            }
        }
        tracker
    });

    (TrackerHandle { tx }, out_rx, task)
}
