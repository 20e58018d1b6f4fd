//! Validated network snapshot around one protected line.
//!
//! [`NetworkGraph::build`] checks, in order:
//!
//! 1. every line and transformer has two distinct, non-empty endpoints
//!    (fail-fast, [`TopologyError::EmptyEndpoint`]);
//! 2. the protected line index refers to an entered line;
//! 3. no transformer connects the protected line's endpoints
//!    (fail-fast, [`TopologyError::ProtectedLineConflict`]);
//! 4. no unordered endpoint pair is shared by a line and a transformer. All
//!    such pairs are collected before reporting ([`TopologyError::DuplicatePair`]).
//!
//! Once built the graph is never mutated.

use crate::diagnostics::{Category, Diagnostics};
use crate::error::{TopologyError, ZoneError};
use crate::graph_utils::find_islands;
use crate::topology::TopologyQuery;
use crate::{Element, ElementKind, ElementParams, ElementRef, NodeId, NodePair};
use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Immutable network of nodes, lines and transformers with a designated
/// protected line.
///
/// Elements are edges of an undirected petgraph multigraph whose weights are
/// [`ElementRef`]s back into the line and transformer lists.
#[derive(Debug, Clone)]
pub struct NetworkGraph {
    nodes: BTreeSet<NodeId>,
    lines: Vec<Element>,
    transformers: Vec<Element>,
    protected_line: usize,
    graph: UnGraph<NodeId, ElementRef>,
    node_index: HashMap<NodeId, NodeIndex>,
    undeclared: Vec<NodeId>,
}

impl NetworkGraph {
    /// Validate the topology and build the graph.
    ///
    /// Endpoints that are missing from `nodes` are added to the node set and
    /// reported by [`NetworkGraph::diagnostics`].
    pub fn build(
        nodes: impl IntoIterator<Item = NodeId>,
        lines: Vec<Element>,
        transformers: Vec<Element>,
        protected_line: usize,
    ) -> Result<Self, TopologyError> {
        check_topology(&lines, &transformers, protected_line)?;

        let declared: BTreeSet<NodeId> = nodes.into_iter().filter(|n| !n.is_empty()).collect();
        let mut all_nodes = declared.clone();
        let mut undeclared = Vec::new();
        for element in lines.iter().chain(&transformers) {
            for endpoint in [&element.origin, &element.destination] {
                if !declared.contains(endpoint) && all_nodes.insert(endpoint.clone()) {
                    undeclared.push(endpoint.clone());
                }
            }
        }

        let mut graph = UnGraph::with_capacity(all_nodes.len(), lines.len() + transformers.len());
        let mut node_index = HashMap::with_capacity(all_nodes.len());
        for node in &all_nodes {
            let idx = graph.add_node(node.clone());
            node_index.insert(node.clone(), idx);
        }
        for (kind, elements) in [
            (ElementKind::Line, &lines),
            (ElementKind::Transformer, &transformers),
        ] {
            for (index, element) in elements.iter().enumerate() {
                // endpoints were inserted above
                let from = node_index[&element.origin];
                let to = node_index[&element.destination];
                graph.add_edge(from, to, ElementRef { kind, index });
            }
        }

        debug!(
            nodes = all_nodes.len(),
            lines = lines.len(),
            transformers = transformers.len(),
            protected = %lines[protected_line].id,
            "network graph built"
        );

        Ok(Self {
            nodes: all_nodes,
            lines,
            transformers,
            protected_line,
            graph,
            node_index,
            undeclared,
        })
    }

    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    pub fn lines(&self) -> &[Element] {
        &self.lines
    }

    pub fn transformers(&self) -> &[Element] {
        &self.transformers
    }

    pub fn graph(&self) -> &UnGraph<NodeId, ElementRef> {
        &self.graph
    }

    pub fn node_index(&self, node: &NodeId) -> Option<NodeIndex> {
        self.node_index.get(node).copied()
    }

    pub fn element(&self, at: ElementRef) -> Option<&Element> {
        match at.kind {
            ElementKind::Line => self.lines.get(at.index),
            ElementKind::Transformer => self.transformers.get(at.index),
        }
    }

    pub fn protected_ref(&self) -> ElementRef {
        ElementRef::line(self.protected_line)
    }

    pub fn protected_line(&self) -> &Element {
        &self.lines[self.protected_line]
    }

    /// Parameters of the protected line; every zone needs them.
    pub fn protected_params(&self) -> Result<&ElementParams, ZoneError> {
        let line = self.protected_line();
        line.params.as_ref().ok_or_else(|| ZoneError::MissingParameter {
            kind: ElementKind::Line,
            id: line.id.clone(),
        })
    }

    /// Origin of the protected line (relay location).
    pub fn near(&self) -> &NodeId {
        &self.protected_line().origin
    }

    /// Destination of the protected line.
    pub fn far(&self) -> &NodeId {
        &self.protected_line().destination
    }

    pub fn query(&self) -> TopologyQuery<'_> {
        TopologyQuery::new(self)
    }

    /// Non-fatal findings about this network.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();

        let needed = self.nodes.len().saturating_sub(1);
        if self.lines.len() < needed {
            diag.warn(
                Category::Topology,
                &format!(
                    "Only {} line(s) for {} node(s); at least {} are needed to connect every node",
                    self.lines.len(),
                    self.nodes.len(),
                    needed
                ),
            );
        }

        let islands = find_islands(self);
        if islands.islands.len() > 1 {
            diag.warn(
                Category::Topology,
                &format!("Network is split into {} islands", islands.islands.len()),
            );
        }

        for node in &self.undeclared {
            diag.warn_about(
                Category::Topology,
                node.as_str(),
                "Endpoint was not declared as a node; added implicitly",
            );
        }

        for (idx, node) in self.graph.node_indices().map(|i| (i, &self.graph[i])) {
            if self.graph.edges(idx).next().is_none() {
                diag.warn_about(Category::Topology, node.as_str(), "Node has no lines or transformers");
            }
        }

        let protected_pair = self.protected_line().pair();
        for (index, line) in self.lines.iter().enumerate() {
            if index != self.protected_line && line.pair() == protected_pair {
                diag.warn_about(
                    Category::Topology,
                    line.id.as_str(),
                    "Line runs parallel to the protected line; zone searches skip it, the infeed sum keeps it",
                );
            }
        }

        for (kind, elements) in [
            (ElementKind::Line, &self.lines),
            (ElementKind::Transformer, &self.transformers),
        ] {
            for element in elements.iter().filter(|e| e.params.is_none()) {
                diag.warn_about(
                    Category::Parameters,
                    element.id.as_str(),
                    &format!("No impedance entered for {kind}"),
                );
            }
        }

        diag
    }
}

/// Unordered endpoint pairs used by both a line and a transformer, sorted and
/// de-duplicated. Elements with invalid endpoints are ignored.
pub fn conflicting_pairs(lines: &[Element], transformers: &[Element]) -> Vec<NodePair> {
    let line_pairs: HashSet<NodePair> = lines
        .iter()
        .filter(|e| e.has_valid_endpoints())
        .map(Element::pair)
        .collect();
    transformers
        .iter()
        .filter(|e| e.has_valid_endpoints())
        .map(Element::pair)
        .filter(|pair| line_pairs.contains(pair))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn check_topology(
    lines: &[Element],
    transformers: &[Element],
    protected_line: usize,
) -> Result<(), TopologyError> {
    for (kind, elements) in [
        (ElementKind::Line, lines),
        (ElementKind::Transformer, transformers),
    ] {
        if let Some(bad) = elements.iter().find(|e| !e.has_valid_endpoints()) {
            return Err(TopologyError::EmptyEndpoint {
                kind,
                id: bad.id.clone(),
            });
        }
    }

    let protected = lines
        .get(protected_line)
        .ok_or(TopologyError::InvalidProtectedLine {
            index: protected_line,
            count: lines.len(),
        })?;
    let protected_pair = protected.pair();
    if let Some(transformer) = transformers.iter().find(|t| t.pair() == protected_pair) {
        return Err(TopologyError::ProtectedLineConflict {
            line: protected.id.clone(),
            transformer: transformer.id.clone(),
            pair: protected_pair,
        });
    }

    let conflicts = conflicting_pairs(lines, transformers);
    if !conflicts.is_empty() {
        return Err(TopologyError::DuplicatePair(conflicts));
    }
    Ok(())
}

/// Whether zone computation may proceed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TopologyStatus {
    Ready,
    Aborted { reason: String },
}

/// Outcome of topology validation: conflicting pairs (empty if none), the
/// terminal status, and warnings for a network that did build.
#[derive(Debug, Clone, Serialize)]
pub struct TopologyReport {
    pub conflicts: Vec<NodePair>,
    pub status: TopologyStatus,
    pub diagnostics: Diagnostics,
    #[serde(skip)]
    pub error: Option<TopologyError>,
}

impl TopologyReport {
    pub fn is_ready(&self) -> bool {
        self.status == TopologyStatus::Ready
    }
}

/// Validate a topology without keeping the built graph.
///
/// Unlike [`NetworkGraph::build`], the conflict list is always filled in, even
/// when another check fails first.
pub fn validate_topology(
    nodes: impl IntoIterator<Item = NodeId>,
    lines: &[Element],
    transformers: &[Element],
    protected_line: usize,
) -> TopologyReport {
    let conflicts = conflicting_pairs(lines, transformers);
    match NetworkGraph::build(nodes, lines.to_vec(), transformers.to_vec(), protected_line) {
        Ok(network) => TopologyReport {
            conflicts,
            status: TopologyStatus::Ready,
            diagnostics: network.diagnostics(),
            error: None,
        },
        Err(err) => {
            let mut diagnostics = Diagnostics::new();
            diagnostics.error(Category::Topology, &err.to_string());
            TopologyReport {
                conflicts,
                status: TopologyStatus::Aborted {
                    reason: err.to_string(),
                },
                diagnostics,
                error: Some(err),
            }
        }
    }
}
