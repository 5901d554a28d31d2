// src/vision.rs - Bar velocity from successive bar-proxy positions
use crate::config::VisionConfig;
use crate::geometry::BarProxyPoint;
use nalgebra::Point2;
use tracing::debug;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisionSample {
    /// First usable sample, there is no reference to measure against yet.
    Primed,
    Accepted(f64),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    TooSoon { dt: f64 },
    Implausible { velocity: f64 },
    NonFinite,
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    y: f64,
    timestamp_ms: f64,
}

pub struct VisionVelocityEstimator {
    config: VisionConfig,
    smoothed: Option<Point2<f64>>,
    anchor: Option<Anchor>,
    current: f64,
}

impl VisionVelocityEstimator {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            smoothed: None,
            anchor: None,
            current: 0.0,
        }
    }

    /// Feed one bar-proxy position. `torso_px` is the shoulder-hip distance of the same frame.
    pub fn update(&mut self, bar: &BarProxyPoint, torso_px: f64) -> VisionSample {
        let raw = bar.position();
        if !(raw.x.is_finite() && raw.y.is_finite() && bar.timestamp_ms.is_finite()) {
            return VisionSample::Rejected(RejectReason::NonFinite);
        }

        let alpha = self.config.smoothing;
        let smoothed = match self.smoothed {
            Some(prev) => Point2::from(prev.coords * (1.0 - alpha) + raw.coords * alpha),
            None => raw,
        };
        self.smoothed = Some(smoothed);

        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                self.anchor = Some(Anchor { y: smoothed.y, timestamp_ms: bar.timestamp_ms });
                return VisionSample::Primed;
            }
        };

        let dt = (bar.timestamp_ms - anchor.timestamp_ms) / 1000.0;
        if dt <= self.config.min_dt_s {
            // Keep the old anchor so displacement accumulates across fast frames
            debug!(dt, "vision sample too close to previous, skipped");
            return VisionSample::Rejected(RejectReason::TooSoon { dt });
        }

        let meters_per_pixel = self.config.torso_length_m / torso_px.max(EPSILON);
        let displacement = (smoothed.y - anchor.y) * meters_per_pixel;
        let velocity = displacement.abs() / dt;

        self.anchor = Some(Anchor { y: smoothed.y, timestamp_ms: bar.timestamp_ms });

        if !velocity.is_finite() || velocity > self.config.max_velocity {
            debug!(velocity, "implausible vision velocity treated as tracking noise");
            return VisionSample::Rejected(RejectReason::Implausible { velocity });
        }

        self.current = velocity;
        VisionSample::Accepted(velocity)
    }

    /// Last accepted velocity in m/s, rounded for display.
    pub fn velocity(&self) -> f64 {
        round2(self.current)
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
        self.anchor = None;
        self.current = 0.0;
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: f64, timestamp_ms: f64) -> BarProxyPoint {
        BarProxyPoint { x: 100.0, y, timestamp_ms }
    }

    fn unsmoothed() -> VisionVelocityEstimator {
        VisionVelocityEstimator::new(VisionConfig {
            smoothing: 1.0,
            ..VisionConfig::default()
        })
    }

    #[test]
    fn first_sample_only_primes() {
        let mut est = unsmoothed();
        assert_eq!(est.update(&bar(100.0, 0.0), 200.0), VisionSample::Primed);
        assert_eq!(est.velocity(), 0.0);
    }

    #[test]
    fn velocity_is_scaled_by_torso_length() {
        let mut est = unsmoothed();
        est.update(&bar(100.0, 0.0), 200.0);
        // 40 px at 0.5 m / 200 px is 0.1 m over 0.1 s
        match est.update(&bar(140.0, 100.0), 200.0) {
            VisionSample::Accepted(v) => assert!((v - 1.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(est.velocity(), 1.0);

        // upward motion reports the same magnitude
        match est.update(&bar(100.0, 200.0), 200.0) {
            VisionSample::Accepted(v) => assert!((v - 1.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn smoothing_blends_with_previous_position() {
        let mut est = VisionVelocityEstimator::new(VisionConfig::default());
        est.update(&bar(100.0, 0.0), 200.0);
        // smoothed y = 100 * 0.2 + 140 * 0.8 = 132, so 32 px in 0.1 s
        match est.update(&bar(140.0, 100.0), 200.0) {
            VisionSample::Accepted(v) => assert!((v - 0.8).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fast_frames_are_skipped_but_keep_reference() {
        let mut est = unsmoothed();
        est.update(&bar(100.0, 0.0), 200.0);
        assert!(matches!(
            est.update(&bar(110.0, 30.0), 200.0),
            VisionSample::Rejected(RejectReason::TooSoon { .. })
        ));
        assert!(matches!(
            est.update(&bar(115.0, 50.0), 200.0),
            VisionSample::Rejected(RejectReason::TooSoon { .. })
        ));
        assert_eq!(est.velocity(), 0.0);

        // measured against t=0, not against the skipped frames
        match est.update(&bar(140.0, 100.0), 200.0) {
            VisionSample::Accepted(v) => assert!((v - 1.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn implausible_jump_is_discarded() {
        let mut est = unsmoothed();
        est.update(&bar(100.0, 0.0), 200.0);
        est.update(&bar(140.0, 100.0), 200.0);
        assert!(matches!(
            est.update(&bar(900.0, 200.0), 200.0),
            VisionSample::Rejected(RejectReason::Implausible { .. })
        ));
        assert_eq!(est.velocity(), 1.0);
    }

    #[test]
    fn zero_torso_does_not_produce_nan() {
        let mut est = unsmoothed();
        est.update(&bar(100.0, 0.0), 0.0);
        let sample = est.update(&bar(100.0, 100.0), 0.0);
        assert_eq!(sample, VisionSample::Accepted(0.0));
        let sample = est.update(&bar(101.0, 200.0), 0.0);
        assert!(matches!(sample, VisionSample::Rejected(RejectReason::Implausible { .. })));
        assert!(est.velocity().is_finite());
    }

    #[test]
    fn reset_forgets_reference() {
        let mut est = unsmoothed();
        est.update(&bar(100.0, 0.0), 200.0);
        est.update(&bar(140.0, 100.0), 200.0);
        est.reset();
        assert_eq!(est.velocity(), 0.0);
        assert_eq!(est.update(&bar(500.0, 150.0), 200.0), VisionSample::Primed);
    }
}
