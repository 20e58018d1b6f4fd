//! # reach-algo: Distance-Protection Zone Reach Settings
//!
//! Computes the four graded reach settings of a distance relay on one
//! protected line, from a validated [`reach_core::NetworkGraph`].
//!
//! | Stage | Type | Applies to |
//! |-------|------|------------|
//! | Raw reach selection | [`ZoneReachCalculator`] | Zones 1–4 |
//! | Arc-resistance adjustment | [`ArcResistanceAdjuster`] | Zones 1–4 |
//! | Infeed correction | [`InfeedCorrector`] | Zones 2, 3 |
//! | Mho characteristic | [`MhoCircle`] | Zones 1–4 |
//!
//! [`compute_reach_settings`] runs all stages and collects the results in a
//! [`ProtectionReport`]. A zone that fails (missing neighbor parameters, no
//! non-zero Zone-4 candidate) is reported as such; the rest still compute.
//!
//! ## Example
//!
//! ```rust
//! use reach_algo::{compute_reach_settings, Zone};
//! use reach_core::{ElementEntry, NetworkSnapshot, ProtectionSettings};
//!
//! let snapshot = NetworkSnapshot::new(["A", "B", "C"])
//!     .with_line(ElementEntry::new("A", "B").with_impedance(10.0, 85.0).with_fault_current(500.0, -80.0))
//!     .with_line(ElementEntry::new("B", "C").with_impedance(6.0, 85.0).with_fault_current(300.0, -75.0));
//! let network = snapshot.build_network().unwrap();
//!
//! let report = compute_reach_settings(&network, &ProtectionSettings::default()).unwrap();
//! let zone2 = report.zone(Zone::Two).and_then(|z| z.reach()).unwrap();
//! assert_eq!(zone2.selected, "Z2min");
//! ```

pub mod arc;
pub mod infeed;
pub mod mho;
pub mod pipeline;
pub mod test_utils;
pub mod zones;

pub use arc::ArcResistanceAdjuster;
pub use infeed::{InfeedCorrection, InfeedCorrector};
pub use mho::MhoCircle;
pub use pipeline::{compute_reach_settings, run_snapshot, ProtectionReport, ZoneEntry, ZoneReach};
pub use zones::{Candidate, CandidateBranch, RawReach, Zone, ZoneReachCalculator};
