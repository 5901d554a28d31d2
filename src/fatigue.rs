// src/fatigue.rs - Velocity loss relative to a session baseline
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatiguePolicy {
    /// Baseline is the fastest rep so far, including the current one.
    #[default]
    RunningBest,
    /// Baseline is fixed at the first committed rep of the session.
    FirstRep,
}

/// Percentage velocity loss of `peak` against the baseline chosen by `policy`.
///
/// `prior` holds the peak velocities of reps already committed, in order.
pub fn velocity_loss(peak: f64, prior: &[f64], policy: FatiguePolicy) -> u8 {
    let reference = match policy {
        FatiguePolicy::RunningBest => prior.iter().copied().fold(peak, f64::max),
        FatiguePolicy::FirstRep => prior.first().copied().unwrap_or(peak),
    };

    if !(reference > 0.0) || peak >= reference {
        return 0;
    }

    let loss = ((1.0 - peak / reference) * 100.0).round();
    loss.clamp(0.0, 100.0) as u8
}
