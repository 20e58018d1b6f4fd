//! Raw Zone 1–4 reach selection.
//!
//! With `Zline` the protected line impedance, `far`/`near` its destination and
//! origin nodes:
//!
//! | Zone | Candidates | Rule |
//! |------|------------|------|
//! | 1 | `pct/100 · Zline` | single candidate |
//! | 2 | `1.2·Zline`, `Zline + 0.5·Zshortest line @far`, `Zline + 0.5·Zsmallest transformer @far` | see [`ZoneReachCalculator::zone2`] |
//! | 3 | `1.2·(Zline + Zfarthest)`, `Zline + 1.25·Zfarthest`, `Zline + 0.8·Zlargest transformer @far` | smallest magnitude |
//! | 4 | `0.2·Zshortest line from near`, `0.2·Zline`, `0.2·Zsmallest transformer @near` | smallest non-zero magnitude |
//!
//! Zone 2 searches the far node undirected. Zone 3 looks for lines leaving
//! the far node (directed) but transformers on either side of it; Zone 4 does
//! the same at the near node. A missing transformer bound is
//! [`Phasor::Unbounded`]; a missing line contributes zero.

use reach_core::{
    ElementId, ElementKind, ElementRef, Incident, NetworkGraph, Phasor, ProtectionSettings,
    TopologyQuery, ZoneError,
};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Protection zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum Zone {
    One,
    Two,
    Three,
    Four,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::One, Zone::Two, Zone::Three, Zone::Four];

    pub fn number(self) -> u8 {
        match self {
            Zone::One => 1,
            Zone::Two => 2,
            Zone::Three => 3,
            Zone::Four => 4,
        }
    }

    /// Descriptive operating-time band.
    pub fn operating_time(self) -> &'static str {
        match self {
            Zone::One => "instantaneous",
            Zone::Two => "300-400 ms with PUTT teleprotection, 150-250 ms without",
            Zone::Three => "800-1000 ms",
            Zone::Four => "< 1500 ms",
        }
    }

    /// Zones 2 and 3 are corrected for downstream infeed.
    pub fn receives_infeed(self) -> bool {
        matches!(self, Zone::Two | Zone::Three)
    }
}

impl From<Zone> for u8 {
    fn from(zone: Zone) -> u8 {
        zone.number()
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z{}", self.number())
    }
}

/// The element a candidate formula is built on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateBranch {
    pub at: ElementRef,
    pub id: ElementId,
}

impl CandidateBranch {
    fn from_incident(incident: &Incident<'_>) -> Self {
        Self {
            at: incident.at,
            id: incident.element.id.clone(),
        }
    }
}

/// One candidate reach.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub label: &'static str,
    pub reach: Phasor,
    /// Branch already represented in this candidate's formula. It is left
    /// out of the infeed current sum when this candidate is selected. `None`
    /// for margin-only formulas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<CandidateBranch>,
}

impl Candidate {
    fn margin(label: &'static str, reach: Phasor) -> Self {
        Self {
            label,
            reach,
            branch: None,
        }
    }

    fn on_branch(label: &'static str, reach: Phasor, branch: Option<CandidateBranch>) -> Self {
        Self {
            label,
            reach,
            branch,
        }
    }
}

/// All candidates of a zone plus the index of the selected one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawReach {
    pub zone: Zone,
    pub candidates: Vec<Candidate>,
    pub selected: usize,
}

impl RawReach {
    pub fn selected_candidate(&self) -> &Candidate {
        &self.candidates[self.selected]
    }

    pub fn reach(&self) -> Phasor {
        self.selected_candidate().reach
    }
}

/// First element with the extreme impedance magnitude in `prefer` direction.
fn extreme(
    incidents: &[Incident<'_>],
    kind: ElementKind,
    prefer: Ordering,
) -> Result<Option<(CandidateBranch, Phasor)>, ZoneError> {
    let mut best: Option<(&Incident<'_>, Phasor)> = None;
    for incident in incidents.iter().filter(|i| i.kind() == kind) {
        let z = incident.impedance()?;
        let better = match &best {
            None => true,
            Some((_, current)) => z.cmp_magnitude(current) == prefer,
        };
        if better {
            best = Some((incident, z));
        }
    }
    Ok(best.map(|(incident, z)| (CandidateBranch::from_incident(incident), z)))
}

fn split(found: Option<(CandidateBranch, Phasor)>) -> (Option<CandidateBranch>, Option<Phasor>) {
    match found {
        Some((branch, z)) => (Some(branch), Some(z)),
        None => (None, None),
    }
}

/// Computes raw zone reaches for the protected line of a network.
#[derive(Debug, Clone, Copy)]
pub struct ZoneReachCalculator<'a> {
    network: &'a NetworkGraph,
    query: TopologyQuery<'a>,
    zline: Phasor,
}

impl<'a> ZoneReachCalculator<'a> {
    /// Fails when the protected line has no impedance parameters.
    pub fn new(network: &'a NetworkGraph) -> Result<Self, ZoneError> {
        let zline = network.protected_params()?.impedance;
        Ok(Self {
            network,
            query: network.query(),
            zline,
        })
    }

    pub fn line_impedance(&self) -> Phasor {
        self.zline
    }

    /// Zone searches never consider circuits parallel to the protected line.
    fn neighbors(&self, found: Vec<Incident<'a>>) -> Vec<Incident<'a>> {
        self.query.without_parallel_lines(found)
    }

    /// `Z1 = pct/100 · Zline`.
    pub fn zone1(&self, settings: &ProtectionSettings) -> RawReach {
        RawReach {
            zone: Zone::One,
            candidates: vec![Candidate::margin(
                "Z1",
                settings.zone1_fraction() * self.zline,
            )],
            selected: 0,
        }
    }

    /// Zone 2 picks among `Z2min = 1.2·Zline`, `Z2med` (shortest line at the
    /// far node) and `Z2max` (smallest transformer at the far node):
    ///
    /// - `|Z2med| < |Z2min|` → `Z2med`
    /// - else `|Z2med| > |Z2max|` → `Z2max`
    /// - else → `Z2min`
    ///
    /// The last branch returns `Z2min` even though `Z2med` lies between the
    /// bounds there.
    pub fn zone2(&self) -> Result<RawReach, ZoneError> {
        let around_far = self.neighbors(self.query.incident_undirected(self.network.far()));
        let (line, z_line) = split(extreme(&around_far, ElementKind::Line, Ordering::Less)?);
        let (transformer, z_transformer) =
            split(extreme(&around_far, ElementKind::Transformer, Ordering::Less)?);

        let z2_min = 1.2 * self.zline;
        let z2_med = z_line.map_or(Phasor::zero(), |z| self.zline + 0.5 * z);
        let z2_max = z_transformer.map_or(Phasor::unbounded(), |z| self.zline + 0.5 * z);

        let selected = if z2_med.cmp_magnitude(&z2_min) == Ordering::Less {
            1
        } else if z2_med.cmp_magnitude(&z2_max) == Ordering::Greater {
            2
        } else {
            0
        };

        let raw = RawReach {
            zone: Zone::Two,
            candidates: vec![
                Candidate::margin("Z2min", z2_min),
                Candidate::on_branch("Z2med", z2_med, line),
                Candidate::on_branch("Z2max", z2_max, transformer),
            ],
            selected,
        };
        debug!(zone = 2, %z2_min, %z2_med, %z2_max, selected = raw.selected_candidate().label, "zone candidates");
        Ok(raw)
    }

    /// Zone 3: smallest of `1.2·(Zline + Zfar)`, `Zline + 1.25·Zfar` and
    /// `Zline + 0.8·Ztransformer`, where `Zfar` is the largest line leaving
    /// the far node and `Ztransformer` the largest transformer at it.
    pub fn zone3(&self) -> Result<RawReach, ZoneError> {
        let far = self.network.far();
        let leaving_far = self.neighbors(self.query.incident_directed_from(far));
        let around_far = self.neighbors(self.query.incident_undirected(far));
        let (line, z_line) = split(extreme(&leaving_far, ElementKind::Line, Ordering::Greater)?);
        let (transformer, z_transformer) =
            split(extreme(&around_far, ElementKind::Transformer, Ordering::Greater)?);

        let z_far = z_line.unwrap_or_default();
        let candidates = vec![
            Candidate::margin("Z3_1", 1.2 * (self.zline + z_far)),
            Candidate::on_branch("Z3_2", self.zline + 1.25 * z_far, line),
            Candidate::on_branch(
                "Z3_3",
                z_transformer.map_or(Phasor::unbounded(), |z| self.zline + 0.8 * z),
                transformer,
            ),
        ];
        let selected = smallest(candidates.iter().enumerate()).unwrap_or(0);

        let raw = RawReach {
            zone: Zone::Three,
            candidates,
            selected,
        };
        debug!(zone = 3, selected = raw.selected_candidate().label, reach = %raw.reach(), "zone candidates");
        Ok(raw)
    }

    /// Zone 4: smallest non-zero of `0.2·Zshortest line leaving near`,
    /// `0.2·Zline` and `0.2·Zsmallest transformer at near`.
    pub fn zone4(&self) -> Result<RawReach, ZoneError> {
        let near = self.network.near();
        let leaving_near = self.neighbors(self.query.incident_directed_from(near));
        let around_near = self.neighbors(self.query.incident_undirected(near));
        let (line, z_line) = split(extreme(&leaving_near, ElementKind::Line, Ordering::Less)?);
        let (transformer, z_transformer) =
            split(extreme(&around_near, ElementKind::Transformer, Ordering::Less)?);

        let candidates = vec![
            Candidate::on_branch("Z4_1", 0.2 * z_line.unwrap_or_default(), line),
            Candidate::margin("Z4_2", 0.2 * self.zline),
            Candidate::on_branch("Z4_3", 0.2 * z_transformer.unwrap_or_default(), transformer),
        ];
        let selected = smallest(
            candidates
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.reach.is_zero()),
        )
        .ok_or(ZoneError::NoValidReach { zone: 4 })?;

        let raw = RawReach {
            zone: Zone::Four,
            candidates,
            selected,
        };
        debug!(zone = 4, selected = raw.selected_candidate().label, reach = %raw.reach(), "zone candidates");
        Ok(raw)
    }
}

/// Index of the first candidate with the smallest magnitude.
fn smallest<'c>(candidates: impl Iterator<Item = (usize, &'c Candidate)>) -> Option<usize> {
    candidates
        .min_by(|(_, a), (_, b)| a.reach.cmp_magnitude(&b.reach))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{line, network, transformer};

    const TOL: f64 = 1e-9;

    fn mag(z: Phasor) -> f64 {
        z.magnitude().unwrap()
    }

    #[test]
    fn test_zone1_percentages() {
        let net = network(&[line("L1", "A", "B", 10.0, 85.0, 500.0)], &[]);
        let calc = ZoneReachCalculator::new(&net).unwrap();
        for pct in [0, 50, 85, 100] {
            let settings = ProtectionSettings::default().with_zone1_percent(pct).unwrap();
            let z1 = calc.zone1(&settings).reach();
            assert!((mag(z1) - pct as f64 / 100.0 * 10.0).abs() < TOL);
        }
        let full = ProtectionSettings::default().with_zone1_percent(100).unwrap();
        assert_eq!(calc.zone1(&full).reach(), Phasor::new(10.0, 85.0));
    }

    #[test]
    fn test_zone2_falls_back_to_min_between_bounds() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "C", 6.0, 85.0, 300.0),
            ],
            &[transformer("T1", "B", "D", 20.0, 85.0, 100.0)],
        );
        let raw = ZoneReachCalculator::new(&net).unwrap().zone2().unwrap();
        // Z2med = 13 sits between Z2min = 12 and Z2max = 20 -> Z2min
        assert_eq!(raw.selected_candidate().label, "Z2min");
        assert!((mag(raw.reach()) - 12.0).abs() < TOL);
        assert!((mag(raw.candidates[2].reach) - 20.0).abs() < TOL);
    }

    #[test]
    fn test_zone2_picks_med_below_min() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "C", "B", 2.0, 85.0, 300.0),
                line("L3", "B", "D", 6.0, 85.0, 300.0),
            ],
            &[],
        );
        let raw = ZoneReachCalculator::new(&net).unwrap().zone2().unwrap();
        assert_eq!(raw.selected_candidate().label, "Z2med");
        assert!((mag(raw.reach()) - 11.0).abs() < TOL);
        // undirected search found the incoming line
        assert_eq!(raw.selected_candidate().branch.as_ref().unwrap().id.as_str(), "L2");
    }

    #[test]
    fn test_parallel_circuit_is_not_a_neighbor() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "A", 2.0, 85.0, 100.0),
                line("L3", "B", "C", 6.0, 85.0, 300.0),
            ],
            &[],
        );
        let calc = ZoneReachCalculator::new(&net).unwrap();

        let z2 = calc.zone2().unwrap();
        // Z2med is built on L3 (13 Ω), not on the 2 Ω parallel circuit
        assert!((mag(z2.candidates[1].reach) - 13.0).abs() < TOL);
        assert_eq!(z2.candidates[1].branch.as_ref().unwrap().id.as_str(), "L3");
        assert_eq!(z2.selected_candidate().label, "Z2min");
        assert!((mag(z2.reach()) - 12.0).abs() < TOL);

        let z3 = calc.zone3().unwrap();
        assert_eq!(z3.candidates[1].branch.as_ref().unwrap().id.as_str(), "L3");

        // nothing but the protected pair leaves A
        let z4 = calc.zone4().unwrap();
        assert!(z4.candidates[0].reach.is_zero());
        assert_eq!(z4.selected_candidate().label, "Z4_2");
    }

    #[test]
    fn test_zone2_picks_max_when_med_exceeds_it() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "C", 30.0, 85.0, 300.0),
            ],
            &[transformer("T1", "B", "D", 2.0, 85.0, 100.0)],
        );
        let raw = ZoneReachCalculator::new(&net).unwrap().zone2().unwrap();
        // Z2med = 25 > Z2max = 11
        assert_eq!(raw.selected_candidate().label, "Z2max");
        assert_eq!(raw.selected_candidate().branch.as_ref().unwrap().id.as_str(), "T1");
    }

    #[test]
    fn test_zone2_without_lines_selects_zero_med() {
        let net = network(&[line("L1", "A", "B", 10.0, 85.0, 500.0)], &[]);
        let raw = ZoneReachCalculator::new(&net).unwrap().zone2().unwrap();
        assert_eq!(raw.selected_candidate().label, "Z2med");
        assert!(raw.reach().is_zero());
        assert!(raw.candidates[2].reach.is_unbounded());
    }

    #[test]
    fn test_zone3_is_minimum_of_candidates() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "C", 4.0, 85.0, 300.0),
                line("L3", "B", "D", 8.0, 85.0, 200.0),
                line("L4", "E", "B", 50.0, 85.0, 200.0),
            ],
            &[transformer("T1", "F", "B", 5.0, 85.0, 100.0)],
        );
        let raw = ZoneReachCalculator::new(&net).unwrap().zone3().unwrap();
        // farthest leaving line is L3 (8), L4 is incoming and ignored
        assert!((mag(raw.candidates[0].reach) - 21.6).abs() < TOL);
        assert!((mag(raw.candidates[1].reach) - 20.0).abs() < TOL);
        assert!((mag(raw.candidates[2].reach) - 14.0).abs() < TOL);
        let min = raw
            .candidates
            .iter()
            .map(|c| mag(c.reach))
            .fold(f64::INFINITY, f64::min);
        assert!((mag(raw.reach()) - min).abs() < TOL);
        assert_eq!(raw.selected_candidate().label, "Z3_3");
    }

    #[test]
    fn test_zone3_without_neighbors() {
        let net = network(&[line("L1", "A", "B", 10.0, 85.0, 500.0)], &[]);
        let raw = ZoneReachCalculator::new(&net).unwrap().zone3().unwrap();
        assert_eq!(raw.selected_candidate().label, "Z3_2");
        assert_eq!(raw.reach(), Phasor::new(10.0, 85.0));
    }

    #[test]
    fn test_zone4_ignores_absent_candidates() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "A", "C", 5.0, 80.0, 300.0),
                line("L3", "D", "A", 1.0, 80.0, 300.0),
            ],
            &[],
        );
        let raw = ZoneReachCalculator::new(&net).unwrap().zone4().unwrap();
        // L3 is incoming to A and ignored; no transformer at A
        assert!(raw.candidates[2].reach.is_zero());
        assert_eq!(raw.selected_candidate().label, "Z4_1");
        assert!((mag(raw.reach()) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_zone4_without_valid_candidate() {
        let net = network(&[line("L1", "A", "B", 0.0, 85.0, 500.0)], &[]);
        let err = ZoneReachCalculator::new(&net).unwrap().zone4().unwrap_err();
        assert_eq!(err, ZoneError::NoValidReach { zone: 4 });
    }

    #[test]
    fn test_missing_neighbor_params_fail_zone() {
        let mut lines = vec![line("L1", "A", "B", 10.0, 85.0, 500.0)];
        lines.push(reach_core::Element::new("L2", "B", "C"));
        let net = network(&lines, &[]);
        let calc = ZoneReachCalculator::new(&net).unwrap();
        assert!(matches!(calc.zone2(), Err(ZoneError::MissingParameter { .. })));
        assert!(calc.zone4().is_ok());
    }

    #[test]
    fn test_ties_keep_first_entered_element() {
        let net = network(
            &[
                line("L1", "A", "B", 10.0, 85.0, 500.0),
                line("L2", "B", "C", 4.0, 85.0, 300.0),
                line("L3", "B", "D", 4.0, 85.0, 300.0),
            ],
            &[],
        );
        let raw = ZoneReachCalculator::new(&net).unwrap().zone3().unwrap();
        assert_eq!(raw.candidates[1].branch.as_ref().unwrap().id.as_str(), "L2");
    }
}
