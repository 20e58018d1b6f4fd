//! Unit newtypes for the scalar quantities that flow through a reach study.
//!
//! Phasors carry their own magnitude and angle; these wrappers are for the
//! plain scalars around them (relay and downstream fault currents, circle
//! radii, operating angles) so that amperes never get added to ohms.
//!
//! ```
//! use reach_core::units::{Amperes, Degrees};
//!
//! let relay = Amperes(500.0);
//! let downstream = Amperes(200.0) + Amperes(100.0);
//! assert!((downstream / relay - 0.6).abs() < 1e-12);
//!
//! let theta = Degrees(60.0);
//! assert!((theta.to_radians() - std::f64::consts::FRAC_PI_3).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div};

/// Declares a transparent `f64` newtype that can be summed with itself,
/// divided into a plain ratio and printed with its unit symbol.
macro_rules! scalar_unit {
    ($(#[$meta:meta])* $name:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        /// Ratio of two quantities of the same unit.
        impl Div for $name {
            type Output = f64;
            fn div(self, rhs: Self) -> f64 {
                self.0 / rhs.0
            }
        }

        impl std::iter::Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.2} {}", self.0, $symbol)
            }
        }
    };
}

scalar_unit!(
    /// Fault-current magnitude in amperes
    Amperes,
    "A"
);

scalar_unit!(
    /// Impedance-plane length in ohms
    Ohms,
    "Ω"
);

scalar_unit!(
    /// Angle in degrees
    Degrees,
    "°"
);

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}
