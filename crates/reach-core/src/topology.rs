//! Neighbor searches over a [`NetworkGraph`].
//!
//! Two flavours, both of which skip the protected line itself:
//!
//! - [`TopologyQuery::incident_undirected`]: elements with the node at either end.
//! - [`TopologyQuery::incident_directed_from`]: elements whose *origin* is the node.
//!
//! Zone 2 searches the far node undirected; Zone 3, Zone 4 and the infeed sum
//! search directed. The zone searches additionally drop lines running parallel
//! to the protected line ([`TopologyQuery::without_parallel_lines`]); the
//! infeed sum keeps them. Results come back in entry order (lines first, then
//! transformers) so extremum searches break ties the same way every run.

use crate::error::ZoneError;
use crate::network::NetworkGraph;
use crate::{Element, ElementKind, ElementParams, ElementRef, NodeId, Phasor};
use petgraph::visit::EdgeRef;

/// An element found by a neighbor search.
#[derive(Debug, Clone, Copy)]
pub struct Incident<'a> {
    pub at: ElementRef,
    pub element: &'a Element,
}

impl<'a> Incident<'a> {
    pub fn kind(&self) -> ElementKind {
        self.at.kind
    }

    pub fn params(&self) -> Result<&'a ElementParams, ZoneError> {
        self.element
            .params
            .as_ref()
            .ok_or_else(|| ZoneError::MissingParameter {
                kind: self.at.kind,
                id: self.element.id.clone(),
            })
    }

    pub fn impedance(&self) -> Result<Phasor, ZoneError> {
        self.params().map(|p| p.impedance)
    }
}

/// Read-only neighbor queries.
#[derive(Debug, Clone, Copy)]
pub struct TopologyQuery<'a> {
    network: &'a NetworkGraph,
}

impl<'a> TopologyQuery<'a> {
    pub fn new(network: &'a NetworkGraph) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &'a NetworkGraph {
        self.network
    }

    /// Elements with `node` at either endpoint.
    pub fn incident_undirected(&self, node: &NodeId) -> Vec<Incident<'a>> {
        self.collect(node, |element| element.touches(node))
    }

    /// Elements whose origin is `node`.
    pub fn incident_directed_from(&self, node: &NodeId) -> Vec<Incident<'a>> {
        self.collect(node, |element| &element.origin == node)
    }

    /// Drops lines on the protected line's node pair. Transformers on that
    /// pair are rejected when the network is built, so only lines can match.
    pub fn without_parallel_lines(&self, found: Vec<Incident<'a>>) -> Vec<Incident<'a>> {
        let protected = self.network.protected_line().pair();
        found
            .into_iter()
            .filter(|incident| incident.kind() != ElementKind::Line || incident.element.pair() != protected)
            .collect()
    }

    fn collect(&self, node: &NodeId, keep: impl Fn(&Element) -> bool) -> Vec<Incident<'a>> {
        let Some(idx) = self.network.node_index(node) else {
            return Vec::new();
        };
        let network = self.network;
        let protected = network.protected_ref();
        let mut found: Vec<Incident<'a>> = network
            .graph()
            .edges(idx)
            .map(|edge| *edge.weight())
            .filter(|at| *at != protected)
            .filter_map(|at| network.element(at).map(|element| Incident { at, element }))
            .filter(|incident| keep(incident.element))
            .collect();
        found.sort_by_key(|incident| incident.at);
        found
    }
}
