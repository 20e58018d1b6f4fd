//! Mho characteristic of a reach setting.
//!
//! A mho relay trips for apparent impedances inside the circle whose diameter
//! runs from the origin to the reach point on the R-X plane.

use num_complex::Complex64;
use reach_core::{Ohms, Phasor};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MhoCircle {
    /// Resistive coordinate of the centre
    pub center_r: Ohms,
    /// Reactive coordinate of the centre
    pub center_x: Ohms,
    pub radius: Ohms,
}

impl MhoCircle {
    /// Circle through the origin and `reach`; `None` for an unbounded reach.
    pub fn through_origin(reach: Phasor) -> Option<Self> {
        let z = reach.to_complex()?;
        let center: Complex64 = z / 2.0;
        Some(Self {
            center_r: Ohms(center.re),
            center_x: Ohms(center.im),
            radius: Ohms(z.norm() / 2.0),
        })
    }

    /// Whether an apparent impedance falls inside (or on) the characteristic.
    pub fn contains(&self, apparent: Phasor) -> bool {
        match apparent.to_complex() {
            Some(z) => {
                let dr = z.re - self.center_r.value();
                let dx = z.im - self.center_x.value();
                dr.hypot(dx) <= self.radius.value() + 1e-12
            }
            None => false,
        }
    }

    /// Points on the circle, starting at the reach point, for plotting.
    pub fn outline(&self, points: usize) -> Vec<(f64, f64)> {
        let (cr, cx, r) = (
            self.center_r.value(),
            self.center_x.value(),
            self.radius.value(),
        );
        let start = cx.atan2(cr);
        (0..points)
            .map(|i| {
                let t = start + std::f64::consts::TAU * i as f64 / points as f64;
                (cr + r * t.cos(), cx + r * t.sin())
            })
            .collect()
    }
}
