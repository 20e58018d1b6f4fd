//! # reach-core: Network Model for Distance-Protection Reach Studies
//!
//! Provides the data structures shared by the reach calculation: phasors,
//! nodes, lines and transformers, the validated [`NetworkGraph`] around one
//! protected line, and the neighbor queries used to grade relay zones.
//!
//! ## Design Philosophy
//!
//! A network is built once from an immutable [`NetworkSnapshot`] and never
//! mutated afterwards. Topology changes mean building a new graph. Elements
//! are stored as undirected edges of a petgraph multigraph (parallel lines are
//! allowed) but keep the origin/destination order the user entered, because
//! some neighbor searches are directional.
//!
//! ## Quick Start
//!
//! ```rust
//! use reach_core::*;
//!
//! let lines = vec![
//!     Element::new("L1", "A", "B").with_params(ElementParams::new(
//!         Phasor::new(10.0, 85.0),
//!         Phasor::new(500.0, -80.0),
//!     )),
//!     Element::new("L2", "B", "C").with_params(ElementParams::new(
//!         Phasor::new(4.0, 80.0),
//!         Phasor::new(300.0, -75.0),
//!     )),
//! ];
//! let nodes = ["A", "B", "C"].map(NodeId::new);
//! let network = NetworkGraph::build(nodes, lines, Vec::new(), 0).unwrap();
//!
//! let downstream = network.query().incident_directed_from(network.far());
//! assert_eq!(downstream.len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`phasor`] - Polar phasor arithmetic with an explicit unbounded variant
//! - [`network`] - Topology validation and the [`NetworkGraph`] snapshot
//! - [`topology`] - Directed and undirected incident-element queries
//! - [`snapshot`] - Serializable input snapshot and instrument-ratio scaling
//! - [`settings`] - Zone-1 percentage and arc-resistance angle
//! - [`diagnostics`] - Non-fatal topology warnings
//! - [`graph_utils`] - Connectivity statistics

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod network;
pub mod phasor;
pub mod settings;
pub mod snapshot;
pub mod topology;
pub mod units;

pub use diagnostics::{Category, DiagnosticIssue, Diagnostics, Severity};
pub use error::{ReachError, ReachResult, SettingsError, TopologyError, ZoneError};
pub use graph_utils::{find_islands, graph_stats, GraphStats, IslandAnalysis};
pub use network::{validate_topology, NetworkGraph, TopologyReport, TopologyStatus};
pub use phasor::{normalize_degrees, Phasor};
pub use settings::{ArcAngle, ProtectionSettings, DEFAULT_ZONE1_PERCENT};
pub use snapshot::{ElementEntry, InstrumentRatio, NetworkSnapshot, PolarEntry, SnapshotSettings};
pub use topology::{Incident, TopologyQuery};
pub use units::{Amperes, Degrees, Ohms};

/// Node identifier; surrounding whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(value: impl AsRef<str>) -> Self {
        NodeId(value.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element identifier as entered by the user (e.g. "L1", "T2").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(value: impl Into<String>) -> Self {
        ElementId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        ElementId(value.to_string())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Branch category. Lines sort before transformers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Line,
    Transformer,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Line => f.write_str("line"),
            ElementKind::Transformer => f.write_str("transformer"),
        }
    }
}

/// Position of an element inside a [`NetworkGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub index: usize,
}

impl ElementRef {
    #[inline]
    pub fn line(index: usize) -> Self {
        ElementRef {
            kind: ElementKind::Line,
            index,
        }
    }

    #[inline]
    pub fn transformer(index: usize) -> Self {
        ElementRef {
            kind: ElementKind::Transformer,
            index,
        }
    }
}

/// Electrical parameters of a line or transformer, already on the relay side
/// of the instrument transformers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementParams {
    /// Series impedance (Ω, secondary)
    pub impedance: Phasor,
    /// Short-circuit current contributed through the element (A)
    pub fault_current: Phasor,
}

impl ElementParams {
    pub fn new(impedance: Phasor, fault_current: Phasor) -> Self {
        Self {
            impedance,
            fault_current,
        }
    }

    /// Fault-current magnitude; an unbounded current is treated as zero.
    pub fn fault_current_magnitude(&self) -> Amperes {
        Amperes(self.fault_current.magnitude().unwrap_or(0.0))
    }
}

/// A line or transformer between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub origin: NodeId,
    pub destination: NodeId,
    /// `None` until impedance data has been entered
    pub params: Option<ElementParams>,
}

impl Element {
    pub fn new(id: impl Into<String>, origin: impl AsRef<str>, destination: impl AsRef<str>) -> Self {
        Self {
            id: ElementId::new(id),
            origin: NodeId::new(origin),
            destination: NodeId::new(destination),
            params: None,
        }
    }

    pub fn with_params(mut self, params: ElementParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Unordered endpoint pair used for conflict detection.
    pub fn pair(&self) -> NodePair {
        NodePair::new(self.origin.clone(), self.destination.clone())
    }

    pub fn has_valid_endpoints(&self) -> bool {
        !self.origin.is_empty() && !self.destination.is_empty() && self.origin != self.destination
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.origin == node || &self.destination == node
    }
}

/// Unordered pair of nodes, stored with the smaller identifier first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePair(pub NodeId, pub NodeId);

impl NodePair {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            NodePair(a, b)
        } else {
            NodePair(b, a)
        }
    }
}

impl fmt::Display for NodePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}
