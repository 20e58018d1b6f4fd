//! Error types for reach studies
//!
//! Domain failures are split by how far they reach:
//!
//! - [`TopologyError`] aborts the whole calculation; no zone is produced.
//! - [`ZoneError`] is fatal for a single zone only; the other zones still report.
//! - [`SettingsError`] rejects operator settings before anything is computed.
//!
//! [`ReachError`] unifies them (plus snapshot parsing) for API boundaries.
//!
//! Numeric degeneracies such as `RTP = 0`, a zero relay current, or a zero
//! arc-resistance divisor are not errors: they are absorbed where they occur
//! with documented fallback values.

use crate::{ElementId, ElementKind, NodePair};
use thiserror::Error;

/// Fatal problems with the network topology.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// An element lacks two distinct, non-empty endpoints
    #[error("{kind} '{id}' needs two distinct, non-empty endpoints")]
    EmptyEndpoint { kind: ElementKind, id: ElementId },

    /// Lines and transformers share unordered endpoint pairs
    #[error("lines and transformers share endpoints: {}", format_pairs(.0))]
    DuplicatePair(Vec<NodePair>),

    /// A transformer sits between the protected line's endpoints
    #[error("protected line '{line}' cannot be protected: transformer '{transformer}' connects the same nodes {pair}")]
    ProtectedLineConflict {
        line: ElementId,
        transformer: ElementId,
        pair: NodePair,
    },

    /// The protected line index does not refer to an entered line
    #[error("protected line index {index} is out of range ({count} line(s) entered)")]
    InvalidProtectedLine { index: usize, count: usize },
}

fn format_pairs(pairs: &[NodePair]) -> String {
    pairs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failures scoped to one zone computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ZoneError {
    #[error("{kind} '{id}' has no impedance parameters")]
    MissingParameter { kind: ElementKind, id: ElementId },

    #[error("zone {zone} has no non-zero reach candidate")]
    NoValidReach { zone: u8 },
}

/// Rejected operator settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("zone 1 percentage must lie in [0, 100], got {0}")]
    Zone1Percent(i64),

    #[error("arc-resistance angle must be 45, 60 or 75 degrees, got {0}")]
    ArcAngle(String),

    #[error("{name} must be positive and finite, got {value}")]
    InstrumentRatio { name: &'static str, value: f64 },

    #[error("{quantity} of '{element}' must be a finite value >= 0, got {value}")]
    Magnitude {
        element: String,
        quantity: &'static str,
        value: f64,
    },

    #[error("{quantity} angle of '{element}' must be finite, got {value}")]
    Angle {
        element: String,
        quantity: &'static str,
        value: f64,
    },
}

/// Unified error type for reach operations.
#[derive(Error, Debug)]
pub enum ReachError {
    /// Snapshot deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Zone error: {0}")]
    Zone(#[from] ZoneError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Convenience type alias for Results using ReachError.
pub type ReachResult<T> = Result<T, ReachError>;

impl From<serde_json::Error> for ReachError {
    fn from(err: serde_json::Error) -> Self {
        ReachError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ReachError {
    fn from(err: toml::de::Error) -> Self {
        ReachError::Parse(err.to_string())
    }
}
