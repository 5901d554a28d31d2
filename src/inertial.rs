// src/inertial.rs - Bar velocity from accelerometer magnitude integration
use crate::config::InertialConfig;
use crate::vision::round2;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InertialSample {
    /// First sample, only establishes the time reference.
    Primed,
    /// Net acceleration above the dead-band was integrated. Carries the rounded speed.
    Integrated(f64),
    /// Below the dead-band, velocity decayed toward rest.
    Decayed,
    /// Out-of-order timestamp or non-finite reading.
    Ignored,
}

pub struct InertialVelocityEstimator {
    config: InertialConfig,
    velocity: f64,
    exposed: f64,
    last_timestamp_ms: Option<f64>,
}

impl InertialVelocityEstimator {
    pub fn new(config: InertialConfig) -> Self {
        Self {
            config,
            velocity: 0.0,
            exposed: 0.0,
            last_timestamp_ms: None,
        }
    }

    /// `raw` is the accelerometer magnitude in m/s^2 including gravity.
    pub fn update(&mut self, raw: f64, timestamp_ms: f64) -> InertialSample {
        if !raw.is_finite() || !timestamp_ms.is_finite() {
            return InertialSample::Ignored;
        }

        let last = match self.last_timestamp_ms {
            Some(last) => last,
            None => {
                self.last_timestamp_ms = Some(timestamp_ms);
                return InertialSample::Primed;
            }
        };

        let dt = (timestamp_ms - last) / 1000.0;
        if dt <= 0.0 {
            debug!(dt, "accelerometer sample out of order, ignored");
            return InertialSample::Ignored;
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        let net_accel = raw.abs() - self.config.gravity;
        if net_accel.abs() > self.config.dead_band {
            self.velocity += net_accel * dt;
            self.exposed = round2(self.velocity.abs());
            InertialSample::Integrated(self.exposed)
        } else {
            self.velocity *= self.config.decay;
            if self.velocity.abs() < self.config.snap_threshold {
                self.velocity = 0.0;
                self.exposed = 0.0;
            }
            InertialSample::Decayed
        }
    }

    /// Current speed in m/s, rounded for display.
    pub fn velocity(&self) -> f64 {
        self.exposed
    }

    pub fn reset(&mut self) {
        self.velocity = 0.0;
        self.exposed = 0.0;
        self.last_timestamp_ms = None;
    }
}
