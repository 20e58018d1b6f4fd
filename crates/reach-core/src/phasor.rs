//! Polar phasor values for impedances and fault currents.
//!
//! A [`Phasor`] stores a magnitude and an angle in degrees. Addition goes
//! through rectangular form (via [`num_complex::Complex64`]), scalar
//! multiplication acts on the magnitude only, and comparisons look at the
//! magnitude alone.
//!
//! The [`Phasor::Unbounded`] variant stands in for an infinite impedance, e.g.
//! the reach bound contributed by a transformer that does not exist. It
//! absorbs every arithmetic operation and compares greater than any finite
//! value, so candidate selection never has to special-case IEEE infinity.
//!
//! ```
//! use reach_core::Phasor;
//!
//! let line = Phasor::new(10.0, 85.0);
//! let reach = line * 1.2;
//! assert_eq!(reach.magnitude(), Some(12.0));
//! assert!((line + Phasor::unbounded()).is_unbounded());
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul};

/// Impedance or current phasor in polar form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Phasor {
    /// Finite value; `magnitude >= 0`, `angle_deg` in (-180, 180]
    Finite { magnitude: f64, angle_deg: f64 },
    /// Infinite magnitude with no defined angle
    Unbounded,
}

/// Wrap an angle in degrees into the half-open interval (-180, 180].
pub fn normalize_degrees(angle_deg: f64) -> f64 {
    let wrapped = angle_deg % 360.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

impl Phasor {
    /// Build from magnitude and angle. A negative magnitude is folded into the
    /// angle (rotated by 180°); an infinite magnitude yields [`Phasor::Unbounded`].
    pub fn new(magnitude: f64, angle_deg: f64) -> Self {
        if magnitude.is_infinite() {
            return Phasor::Unbounded;
        }
        if magnitude < 0.0 {
            Phasor::Finite {
                magnitude: -magnitude,
                angle_deg: normalize_degrees(angle_deg + 180.0),
            }
        } else {
            Phasor::Finite {
                magnitude,
                angle_deg: normalize_degrees(angle_deg),
            }
        }
    }

    /// Build from rectangular components.
    pub fn from_rect(re: f64, im: f64) -> Self {
        Self::from_complex(Complex64::new(re, im))
    }

    pub fn from_complex(z: Complex64) -> Self {
        if !z.re.is_finite() || !z.im.is_finite() {
            return Phasor::Unbounded;
        }
        Phasor::Finite {
            magnitude: z.norm(),
            angle_deg: normalize_degrees(z.arg().to_degrees()),
        }
    }

    #[inline]
    pub const fn zero() -> Self {
        Phasor::Finite {
            magnitude: 0.0,
            angle_deg: 0.0,
        }
    }

    #[inline]
    pub const fn unbounded() -> Self {
        Phasor::Unbounded
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Phasor::Unbounded)
    }

    /// True for a finite phasor of exactly zero magnitude.
    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self, Phasor::Finite { magnitude, .. } if *magnitude == 0.0)
    }

    /// Magnitude, or `None` when unbounded.
    #[inline]
    pub fn magnitude(&self) -> Option<f64> {
        match self {
            Phasor::Finite { magnitude, .. } => Some(*magnitude),
            Phasor::Unbounded => None,
        }
    }

    /// Angle in degrees, or `None` when unbounded.
    #[inline]
    pub fn angle_deg(&self) -> Option<f64> {
        match self {
            Phasor::Finite { angle_deg, .. } => Some(*angle_deg),
            Phasor::Unbounded => None,
        }
    }

    /// Rectangular form, or `None` when unbounded.
    pub fn to_complex(&self) -> Option<Complex64> {
        match self {
            Phasor::Finite {
                magnitude,
                angle_deg,
            } => Some(Complex64::from_polar(*magnitude, angle_deg.to_radians())),
            Phasor::Unbounded => None,
        }
    }

    /// Total order on magnitudes; `Unbounded` sits above every finite value.
    pub fn cmp_magnitude(&self, other: &Phasor) -> Ordering {
        match (self.magnitude(), other.magnitude()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Same value with the angle replaced. Unbounded stays unbounded.
    pub fn with_angle(&self, angle_deg: f64) -> Self {
        match self {
            Phasor::Finite { magnitude, .. } => Phasor::new(*magnitude, angle_deg),
            Phasor::Unbounded => Phasor::Unbounded,
        }
    }
}

impl Default for Phasor {
    fn default() -> Self {
        Phasor::zero()
    }
}

impl Add for Phasor {
    type Output = Phasor;

    fn add(self, rhs: Phasor) -> Phasor {
        // a zero operand contributes nothing; skip the polar round trip
        if rhs.is_zero() {
            return self;
        }
        if self.is_zero() {
            return rhs;
        }
        match (self.to_complex(), rhs.to_complex()) {
            (Some(a), Some(b)) => Phasor::from_complex(a + b),
            _ => Phasor::Unbounded,
        }
    }
}

impl Mul<f64> for Phasor {
    type Output = Phasor;

    fn mul(self, rhs: f64) -> Phasor {
        match self {
            Phasor::Finite {
                magnitude,
                angle_deg,
            } => Phasor::new(magnitude * rhs, angle_deg),
            Phasor::Unbounded => Phasor::Unbounded,
        }
    }
}

impl Mul<Phasor> for f64 {
    type Output = Phasor;

    fn mul(self, rhs: Phasor) -> Phasor {
        rhs * self
    }
}

impl fmt::Display for Phasor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phasor::Finite {
                magnitude,
                angle_deg,
            } => write!(f, "{magnitude:.4}∠{angle_deg:.2}°"),
            Phasor::Unbounded => write!(f, "∞"),
        }
    }
}
