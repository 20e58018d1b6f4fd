use reach_algo::test_utils::{line, network, transformer};
use reach_algo::{compute_reach_settings, run_snapshot, Zone, ZoneReach};
use reach_core::{
    ArcAngle, ElementEntry, NetworkGraph, NetworkSnapshot, Phasor, ProtectionSettings,
    ReachError, TopologyError,
};

const TOL: f64 = 1e-9;

fn mag(z: Phasor) -> f64 {
    z.magnitude().unwrap()
}

fn reach(report: &reach_algo::ProtectionReport, zone: Zone) -> &ZoneReach {
    report.zone(zone).and_then(|entry| entry.reach()).unwrap()
}

/// A -> B protected (10∠85°, 500 A), B -> C (4∠80°, 300 A).
fn three_bus() -> NetworkSnapshot {
    NetworkSnapshot::new(["A", "B", "C"])
        .with_line(
            ElementEntry::new("A", "B")
                .with_impedance(10.0, 85.0)
                .with_fault_current(500.0, -80.0),
        )
        .with_line(
            ElementEntry::new("B", "C")
                .with_impedance(4.0, 80.0)
                .with_fault_current(300.0, -75.0),
        )
}

fn meshed() -> NetworkGraph {
    network(
        &[
            line("L1", "A", "B", 10.0, 85.0, 500.0),
            line("L2", "B", "C", 4.0, 80.0, 300.0),
            line("L3", "B", "D", 7.0, 82.0, 150.0),
            line("L4", "E", "B", 3.0, 78.0, 120.0),
            line("L5", "A", "E", 5.0, 84.0, 400.0),
        ],
        &[
            transformer("T1", "B", "F", 9.0, 88.0, 80.0),
            transformer("T2", "A", "G", 12.0, 87.0, 60.0),
        ],
    )
}

#[test]
fn three_bus_example() {
    let settings = ProtectionSettings::new(85, ArcAngle::Deg60).unwrap();
    let report = run_snapshot(&three_bus(), &settings).unwrap();

    let z1 = reach(&report, Zone::One);
    assert!((mag(z1.raw) - 8.5).abs() < TOL);
    assert!((z1.raw.angle_deg().unwrap() - 85.0).abs() < TOL);
    assert!(z1.infeed.is_none());

    let z2 = reach(&report, Zone::Two);
    assert!((mag(z2.candidates[0].reach) - 12.0).abs() < TOL);
    assert!(z2.candidates[2].reach.is_unbounded());
    // 10∠85° + 2∠80° is just under 12 Ω, so Z2med wins the first test
    let expected_med = (104.0 + 40.0 * 5f64.to_radians().cos()).sqrt();
    assert!((mag(z2.candidates[1].reach) - expected_med).abs() < TOL);
    assert_eq!(z2.selected, "Z2med");

    // Z2med is built on B -> C, so its current is not counted again
    let infeed = z2.infeed.as_ref().unwrap();
    assert_eq!(infeed.excluded.as_ref().unwrap().as_str(), "L2");
    assert_eq!(infeed.infeed_factor, 0.0);
    assert_eq!(infeed.corrected, z2.raw);

    // Z3_2 keeps B -> C as its branch; Z3_1 would not
    let z3 = reach(&report, Zone::Three);
    assert_eq!(z3.selected, "Z3_2");
}

#[test]
fn three_bus_infeed_with_margin_candidate() {
    let snapshot = NetworkSnapshot::new(["A", "B", "C"])
        .with_line(
            ElementEntry::new("A", "B")
                .with_impedance(10.0, 85.0)
                .with_fault_current(500.0, -80.0),
        )
        .with_line(
            ElementEntry::new("B", "C")
                .with_impedance(6.0, 85.0)
                .with_fault_current(300.0, -75.0),
        );
    let report = run_snapshot(&snapshot, &ProtectionSettings::default()).unwrap();
    let z2 = reach(&report, Zone::Two);
    assert_eq!(z2.selected, "Z2min");
    let infeed = z2.infeed.as_ref().unwrap();
    assert!((infeed.infeed_factor - 0.6).abs() < 1e-12);
    assert!((mag(infeed.corrected) - 19.2).abs() < TOL);
    assert!((infeed.corrected.angle_deg().unwrap() - 85.0).abs() < TOL);
}

#[test]
fn repeated_runs_are_identical() {
    let net = meshed();
    let settings = ProtectionSettings::default();
    let first = compute_reach_settings(&net, &settings).unwrap();
    let second = compute_reach_settings(&net, &settings).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn zone_properties_hold_for_every_arc_angle() {
    let net = meshed();
    let zline = mag(net.protected_params().unwrap().impedance);
    for angle in ArcAngle::ALL {
        for pct in [0, 40, 85, 100] {
            let settings = ProtectionSettings::new(pct, angle).unwrap();
            let report = compute_reach_settings(&net, &settings).unwrap();
            assert_eq!(report.failed_zones().count(), 0);

            let z1 = reach(&report, Zone::One);
            assert!(mag(z1.raw) <= zline + TOL);

            let z3 = reach(&report, Zone::Three);
            let min = z3
                .candidates
                .iter()
                .filter_map(|c| c.reach.magnitude())
                .fold(f64::INFINITY, f64::min);
            assert!((mag(z3.raw) - min).abs() < TOL);

            let z4 = reach(&report, Zone::Four);
            assert!(mag(z4.raw) > 0.0);

            let theta = angle.degrees().value();
            for entry in &report.zones {
                let zone = entry.reach().unwrap();
                if let Some(adjusted) = zone.arc_adjusted.angle_deg() {
                    if !zone.arc_adjusted.is_zero() {
                        assert!((adjusted - theta).abs() < 1e-6, "{} angle", zone.zone);
                    }
                }
                if let Some(infeed) = &zone.infeed {
                    assert!(infeed.infeed_factor >= 0.0);
                    assert!(mag(infeed.corrected) >= mag(zone.raw) - TOL);
                }
            }
        }
    }
}

#[test]
fn zone2_selection_is_one_of_its_candidates() {
    let net = meshed();
    let report = compute_reach_settings(&net, &ProtectionSettings::default()).unwrap();
    let z2 = reach(&report, Zone::Two);
    let selected = z2
        .candidates
        .iter()
        .find(|c| c.label == z2.selected)
        .unwrap();
    assert_eq!(selected.reach, z2.raw);
    // shortest neighbour at B is the incoming L4 (3 Ω)
    assert_eq!(z2.candidates[1].branch.as_ref().unwrap().id.as_str(), "L4");
}

#[test]
fn instrument_ratio_scales_reaches() {
    let primary = run_snapshot(&three_bus(), &ProtectionSettings::default()).unwrap();
    let scaled = run_snapshot(
        &three_bus().with_instrument_ratio(600.0, 1200.0),
        &ProtectionSettings::default(),
    )
    .unwrap();
    for zone in Zone::ALL {
        let a = reach(&primary, zone).raw;
        let b = reach(&scaled, zone).raw;
        assert!((mag(b) - 0.5 * mag(a)).abs() < TOL, "{zone}");
    }
    assert_eq!(primary.relay_current, scaled.relay_current);
}

#[test]
fn topology_errors_abort_before_zones() {
    let snapshot = three_bus().with_transformer(ElementEntry::new("C", "B").with_impedance(5.0, 85.0));
    let err = run_snapshot(&snapshot, &ProtectionSettings::default()).unwrap_err();
    match err {
        ReachError::Topology(TopologyError::DuplicatePair(pairs)) => {
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].to_string(), "(B, C)");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn protected_line_parallel_to_transformer_is_rejected() {
    let snapshot = three_bus().with_transformer(ElementEntry::new("B", "A").with_impedance(5.0, 85.0));
    let err = run_snapshot(&snapshot, &ProtectionSettings::default()).unwrap_err();
    assert!(matches!(
        err,
        ReachError::Topology(TopologyError::ProtectedLineConflict { .. })
    ));
}
