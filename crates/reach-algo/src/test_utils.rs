//! Small network builders shared by unit and integration tests.

use reach_core::{Element, ElementParams, NetworkGraph, NodeId, Phasor};
use std::collections::BTreeSet;

/// Line with impedance `z∠angle` Ω and a fault current of `current` A.
pub fn line(id: &str, origin: &str, destination: &str, z: f64, angle: f64, current: f64) -> Element {
    Element::new(id, origin, destination).with_params(ElementParams::new(
        Phasor::new(z, angle),
        Phasor::new(current, angle - 165.0),
    ))
}

/// Transformer; same parameter layout as [`line`].
pub fn transformer(
    id: &str,
    origin: &str,
    destination: &str,
    z: f64,
    angle: f64,
    current: f64,
) -> Element {
    line(id, origin, destination, z, angle, current)
}

/// Network over every endpoint in `lines` and `transformers`, protecting the
/// first line.
///
/// # Panics
///
/// Panics if the topology is rejected.
pub fn network(lines: &[Element], transformers: &[Element]) -> NetworkGraph {
    let nodes: BTreeSet<NodeId> = lines
        .iter()
        .chain(transformers)
        .flat_map(|e| [e.origin.clone(), e.destination.clone()])
        .collect();
    match NetworkGraph::build(nodes, lines.to_vec(), transformers.to_vec(), 0) {
        Ok(network) => network,
        Err(err) => panic!("test network rejected: {err}"),
    }
}
