//! End-to-end reach calculation.
//!
//! For each zone the pipeline selects the raw reach, rotates it onto the arc
//! angle, applies the infeed correction (Zones 2 and 3 only) and derives the
//! mho circle of the arc-adjusted reach. A zone that cannot be computed is
//! reported as failed without stopping the others.

use crate::arc::ArcResistanceAdjuster;
use crate::infeed::{InfeedCorrection, InfeedCorrector};
use crate::mho::MhoCircle;
use crate::zones::{Candidate, RawReach, Zone, ZoneReachCalculator};
use reach_core::{
    Amperes, Diagnostics, ElementId, NetworkGraph, NetworkSnapshot, NodeId, Phasor,
    ProtectionSettings, ReachResult, ZoneError,
};
use serde::{Serialize, Serializer};
use tracing::{info, warn};

/// Full result for one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneReach {
    pub zone: Zone,
    pub operating_time: &'static str,
    pub candidates: Vec<Candidate>,
    pub selected: &'static str,
    pub raw: Phasor,
    pub arc_adjusted: Phasor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infeed: Option<InfeedCorrection>,
    /// Mho circle of the arc-adjusted reach
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristic: Option<MhoCircle>,
}

impl ZoneReach {
    /// Operative relay setting: the arc-adjusted reach.
    pub fn setting(&self) -> Phasor {
        self.arc_adjusted
    }

    /// Raw reach scaled by `1 + K`, for Zones 2 and 3.
    pub fn infeed_corrected(&self) -> Option<Phasor> {
        self.infeed.as_ref().map(|infeed| infeed.corrected)
    }
}

fn serialize_display<T: std::fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Outcome of one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ZoneEntry {
    Computed(ZoneReach),
    Failed {
        zone: Zone,
        #[serde(serialize_with = "serialize_display")]
        error: ZoneError,
    },
}

impl ZoneEntry {
    pub fn zone(&self) -> Zone {
        match self {
            ZoneEntry::Computed(reach) => reach.zone,
            ZoneEntry::Failed { zone, .. } => *zone,
        }
    }

    pub fn reach(&self) -> Option<&ZoneReach> {
        match self {
            ZoneEntry::Computed(reach) => Some(reach),
            ZoneEntry::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ZoneError> {
        match self {
            ZoneEntry::Computed(_) => None,
            ZoneEntry::Failed { error, .. } => Some(error),
        }
    }
}

/// Everything computed for one protected line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtectionReport {
    pub protected_line: ElementId,
    pub near: NodeId,
    pub far: NodeId,
    pub line_impedance: Phasor,
    pub relay_current: Amperes,
    /// `RTC/RTP` applied to the entered impedances, when run from a snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_ratio: Option<f64>,
    pub settings: ProtectionSettings,
    pub zones: Vec<ZoneEntry>,
    pub diagnostics: Diagnostics,
}

impl ProtectionReport {
    pub fn zone(&self, zone: Zone) -> Option<&ZoneEntry> {
        self.zones.iter().find(|entry| entry.zone() == zone)
    }

    pub fn failed_zones(&self) -> impl Iterator<Item = &ZoneEntry> {
        self.zones.iter().filter(|entry| entry.error().is_some())
    }
}

/// Compute all four zones for the protected line of `network`.
///
/// Fails only when the protected line itself has no parameters; per-zone
/// failures are recorded in the report. The network is never modified, so
/// repeated calls return identical reports.
pub fn compute_reach_settings(
    network: &NetworkGraph,
    settings: &ProtectionSettings,
) -> ReachResult<ProtectionReport> {
    let calculator = ZoneReachCalculator::new(network)?;
    let infeed = InfeedCorrector::new(network);
    let arc = ArcResistanceAdjuster::new(settings.arc_angle());
    let relay_current = infeed.relay_current()?;

    let raws = [
        Ok(calculator.zone1(settings)),
        calculator.zone2(),
        calculator.zone3(),
        calculator.zone4(),
    ];
    let zones = Zone::ALL
        .into_iter()
        .zip(raws)
        .map(|(zone, raw)| match raw.and_then(|raw| finish(raw, &arc, &infeed)) {
            Ok(reach) => ZoneEntry::Computed(reach),
            Err(error) => {
                warn!(%zone, %error, "zone could not be computed");
                ZoneEntry::Failed { zone, error }
            }
        })
        .collect::<Vec<_>>();

    let protected = network.protected_line();
    info!(
        line = %protected.id,
        computed = zones.iter().filter(|z| z.reach().is_some()).count(),
        "reach settings computed"
    );

    Ok(ProtectionReport {
        protected_line: protected.id.clone(),
        near: network.near().clone(),
        far: network.far().clone(),
        line_impedance: calculator.line_impedance(),
        relay_current,
        instrument_ratio: None,
        settings: *settings,
        zones,
        diagnostics: network.diagnostics(),
    })
}

fn finish(
    raw: RawReach,
    arc: &ArcResistanceAdjuster,
    infeed: &InfeedCorrector<'_>,
) -> Result<ZoneReach, ZoneError> {
    let correction = if raw.zone.receives_infeed() {
        Some(infeed.correct(&raw)?)
    } else {
        None
    };
    let arc_adjusted = arc.adjust(raw.reach());
    Ok(ZoneReach {
        zone: raw.zone,
        operating_time: raw.zone.operating_time(),
        selected: raw.selected_candidate().label,
        raw: raw.reach(),
        arc_adjusted,
        infeed: correction,
        characteristic: MhoCircle::through_origin(arc_adjusted),
        candidates: raw.candidates,
    })
}

/// Build the network from a snapshot and compute its reach settings.
pub fn run_snapshot(
    snapshot: &NetworkSnapshot,
    settings: &ProtectionSettings,
) -> ReachResult<ProtectionReport> {
    let ratio = snapshot.instrument_ratio().factor()?;
    let network = snapshot.build_network()?;
    let mut report = compute_reach_settings(&network, settings)?;
    report.instrument_ratio = Some(ratio);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{line, network};

    #[test]
    fn test_failed_zone_does_not_stop_others() {
        let net = network(&[line("L1", "A", "B", 0.0, 85.0, 500.0)], &[]);
        let report = compute_reach_settings(&net, &ProtectionSettings::default()).unwrap();
        assert_eq!(report.zones.len(), 4);
        assert!(report.zone(Zone::One).unwrap().reach().is_some());
        assert_eq!(
            report.zone(Zone::Four).unwrap().error(),
            Some(&ZoneError::NoValidReach { zone: 4 })
        );
        assert_eq!(report.failed_zones().count(), 1);
    }

    #[test]
    fn test_missing_protected_params_is_fatal() {
        let lines = vec![reach_core::Element::new("L1", "A", "B")];
        let net = network(&lines, &[]);
        let err = compute_reach_settings(&net, &ProtectionSettings::default()).unwrap_err();
        assert!(matches!(err, reach_core::ReachError::Zone(ZoneError::MissingParameter { .. })));
    }

    #[test]
    fn test_infeed_only_for_zones_two_and_three() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "C", 4.0, 80.0, 300.0),
            ],
            &[],
        );
        let report = compute_reach_settings(&net, &ProtectionSettings::default()).unwrap();
        for entry in &report.zones {
            let reach = entry.reach().unwrap();
            assert_eq!(reach.infeed.is_some(), reach.zone.receives_infeed());
        }
    }

    #[test]
    fn test_setting_is_arc_adjusted_reach() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "C", 6.0, 85.0, 300.0),
            ],
            &[],
        );
        let settings = ProtectionSettings::default();
        let report = compute_reach_settings(&net, &settings).unwrap();
        let theta = settings.arc_angle().degrees().value();
        for reach in report.zones.iter().filter_map(ZoneEntry::reach) {
            assert_eq!(reach.setting(), reach.arc_adjusted);
            assert!((reach.setting().angle_deg().unwrap() - theta).abs() < 1e-9);
        }
        let z1 = report.zone(Zone::One).and_then(ZoneEntry::reach).unwrap();
        let expected = 8.5 / (25f64).to_radians().cos();
        assert!((z1.setting().magnitude().unwrap() - expected).abs() < 1e-9);
        assert_eq!(z1.infeed_corrected(), None);

        let z2 = report.zone(Zone::Two).and_then(ZoneEntry::reach).unwrap();
        let corrected = z2.infeed_corrected().unwrap();
        assert!((corrected.magnitude().unwrap() - 19.2).abs() < 1e-9);
        assert_ne!(z2.setting(), corrected);
    }

    #[test]
    fn test_failed_zone_serializes_message() {
        let entry = ZoneEntry::Failed {
            zone: Zone::Four,
            error: ZoneError::NoValidReach { zone: 4 },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["zone"], 4);
        assert_eq!(json["error"], "zone 4 has no non-zero reach candidate");
    }
}
