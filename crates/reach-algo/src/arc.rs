//! Arc-resistance adjustment.
//!
//! A raw reach `Z` is projected onto the relay characteristic angle `θ`:
//!
//! ```text
//! Zadj = |Z| / cos(∠Z − θ)  ∠θ
//! ```
//!
//! The divisor is zero only when `∠Z − θ` is an odd multiple of 90°; the
//! adjusted reach is then [`Phasor::Unbounded`]. A negative divisor yields a
//! negative magnitude, which [`Phasor::new`] folds into the opposite angle.

use reach_core::{normalize_degrees, ArcAngle, Phasor};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArcResistanceAdjuster {
    angle: ArcAngle,
}

impl ArcResistanceAdjuster {
    pub fn new(angle: ArcAngle) -> Self {
        Self { angle }
    }

    pub fn angle(&self) -> ArcAngle {
        self.angle
    }

    pub fn adjust(&self, reach: Phasor) -> Phasor {
        let theta = self.angle.degrees().value();
        match reach {
            Phasor::Unbounded => Phasor::Unbounded,
            Phasor::Finite {
                magnitude,
                angle_deg,
            } => {
                let divisor = cos_degrees(angle_deg - theta);
                if divisor == 0.0 {
                    warn!(
                        angle = angle_deg,
                        theta, "reach is perpendicular to the arc angle; adjusted reach is unbounded"
                    );
                    return Phasor::Unbounded;
                }
                Phasor::new(magnitude / divisor, theta)
            }
        }
    }
}

/// Cosine of an angle in degrees, exactly zero at ±90°.
fn cos_degrees(angle: f64) -> f64 {
    let wrapped = normalize_degrees(angle);
    if wrapped.abs() == 90.0 {
        0.0
    } else {
        wrapped.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_projects_onto_theta() {
        let adjuster = ArcResistanceAdjuster::new(ArcAngle::Deg60);
        let adjusted = adjuster.adjust(Phasor::new(8.5, 85.0));
        let expected = 8.5 / 25f64.to_radians().cos();
        assert!((adjusted.magnitude().unwrap() - expected).abs() < 1e-9);
        assert_eq!(adjusted.angle_deg(), Some(60.0));
    }

    #[test]
    fn test_reach_at_theta_is_unchanged() {
        let adjuster = ArcResistanceAdjuster::new(ArcAngle::Deg75);
        let adjusted = adjuster.adjust(Phasor::new(12.0, 75.0));
        assert_eq!(adjusted, Phasor::new(12.0, 75.0));
    }

    #[test]
    fn test_perpendicular_reach_is_unbounded() {
        let adjuster = ArcResistanceAdjuster::new(ArcAngle::Deg45);
        assert!(adjuster.adjust(Phasor::new(5.0, 135.0)).is_unbounded());
        assert!(adjuster.adjust(Phasor::new(5.0, -45.0)).is_unbounded());
        assert!(adjuster.adjust(Phasor::Unbounded).is_unbounded());
    }

    #[test]
    fn test_negative_divisor_flips_angle() {
        let adjuster = ArcResistanceAdjuster::new(ArcAngle::Deg60);
        let adjusted = adjuster.adjust(Phasor::new(4.0, -120.0));
        // cos(-180°) = -1
        assert!((adjusted.magnitude().unwrap() - 4.0).abs() < 1e-9);
        assert!((adjusted.angle_deg().unwrap() - (-120.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_reach_stays_zero() {
        let adjuster = ArcResistanceAdjuster::default();
        assert!(adjuster.adjust(Phasor::zero()).is_zero());
    }
}
