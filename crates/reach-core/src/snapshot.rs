//! Serializable input snapshot.
//!
//! A snapshot is everything the data-entry layer collects: node names, lines
//! and transformers with their primary-side parameters, the protected line,
//! the instrument-transformer ratios and optional settings. It can be read
//! from TOML or JSON:
//!
//! ```toml
//! nodes = ["A", "B", "C"]
//! protected_line = 0
//! rtc = 600.0
//! rtp = 1000.0
//!
//! [settings]
//! zone1_percent = 85
//! arc_angle = 60
//!
//! [[lines]]
//! id = "L1"
//! origin = "A"
//! destination = "B"
//! impedance = { magnitude = 10.0, angle = 85.0 }
//! fault_current = { magnitude = 500.0, angle = -80.0 }
//! ```
//!
//! Impedance magnitudes are scaled by `RTC/RTP` exactly once, when the
//! snapshot is turned into [`Element`]s.

use crate::error::{ReachResult, SettingsError};
use crate::network::{validate_topology, NetworkGraph, TopologyReport};
use crate::settings::{ArcAngle, ProtectionSettings};
use crate::{Element, ElementParams, NodeId, Phasor};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Magnitude/angle pair as entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarEntry {
    pub magnitude: f64,
    /// Degrees
    #[serde(default)]
    pub angle: f64,
}

impl PolarEntry {
    pub fn to_phasor(self) -> Phasor {
        Phasor::new(self.magnitude, self.angle)
    }

    /// Rejects negative and non-finite magnitudes and non-finite angles.
    fn check(self, element: &str, quantity: &'static str) -> Result<Self, SettingsError> {
        if !self.magnitude.is_finite() || self.magnitude < 0.0 {
            return Err(SettingsError::Magnitude {
                element: element.to_string(),
                quantity,
                value: self.magnitude,
            });
        }
        if !self.angle.is_finite() {
            return Err(SettingsError::Angle {
                element: element.to_string(),
                quantity,
                value: self.angle,
            });
        }
        Ok(self)
    }
}

/// A line or transformer as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementEntry {
    /// Defaults to `L<n>` / `T<n>` (1-based position)
    #[serde(default)]
    pub id: Option<String>,
    pub origin: String,
    pub destination: String,
    /// Primary-side impedance (Ω)
    #[serde(default)]
    pub impedance: Option<PolarEntry>,
    /// Short-circuit current (A); zero when omitted
    #[serde(default)]
    pub fault_current: Option<PolarEntry>,
}

impl ElementEntry {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            id: None,
            origin: origin.into(),
            destination: destination.into(),
            impedance: None,
            fault_current: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_impedance(mut self, magnitude: f64, angle: f64) -> Self {
        self.impedance = Some(PolarEntry { magnitude, angle });
        self
    }

    pub fn with_fault_current(mut self, magnitude: f64, angle: f64) -> Self {
        self.fault_current = Some(PolarEntry { magnitude, angle });
        self
    }

    /// Element with its impedance magnitude scaled by `ratio`.
    fn to_element(&self, default_id: String, ratio: f64) -> Result<Element, SettingsError> {
        let element = Element::new(
            self.id.clone().unwrap_or(default_id),
            &self.origin,
            &self.destination,
        );
        let id = element.id.as_str();
        let fault_current = self
            .fault_current
            .map(|i| i.check(id, "fault current"))
            .transpose()?;
        let Some(z) = self.impedance.map(|z| z.check(id, "impedance")).transpose()? else {
            return Ok(element);
        };
        let impedance = Phasor::new(z.magnitude * ratio, z.angle);
        let fault_current = fault_current.map(PolarEntry::to_phasor).unwrap_or_default();
        Ok(element.with_params(ElementParams::new(impedance, fault_current)))
    }
}

/// Current/potential transformer ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRatio {
    pub rtc: f64,
    pub rtp: f64,
}

impl Default for InstrumentRatio {
    fn default() -> Self {
        Self { rtc: 1.0, rtp: 1.0 }
    }
}

impl InstrumentRatio {
    pub fn new(rtc: f64, rtp: f64) -> Self {
        Self { rtc, rtp }
    }

    /// `RTC/RTP`, the factor applied to impedance magnitudes. `RTP = 0` falls
    /// back to a factor of 1.0.
    pub fn factor(&self) -> Result<f64, SettingsError> {
        if !self.rtc.is_finite() || self.rtc <= 0.0 {
            return Err(SettingsError::InstrumentRatio {
                name: "RTC",
                value: self.rtc,
            });
        }
        if !self.rtp.is_finite() || self.rtp < 0.0 {
            return Err(SettingsError::InstrumentRatio {
                name: "RTP",
                value: self.rtp,
            });
        }
        if self.rtp == 0.0 {
            warn!(rtc = self.rtc, "RTP is zero; using an impedance ratio of 1.0");
            return Ok(1.0);
        }
        Ok(self.rtc / self.rtp)
    }
}

/// Optional settings carried in the snapshot file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSettings {
    #[serde(default)]
    pub zone1_percent: Option<i64>,
    #[serde(default)]
    pub arc_angle: Option<ArcAngle>,
}

impl SnapshotSettings {
    /// Overlay the values present here on `base`.
    pub fn apply(&self, base: ProtectionSettings) -> Result<ProtectionSettings, SettingsError> {
        let mut settings = base;
        if let Some(percent) = self.zone1_percent {
            settings = settings.with_zone1_percent(percent)?;
        }
        if let Some(angle) = self.arc_angle {
            settings = settings.with_arc_angle(angle);
        }
        Ok(settings)
    }
}

fn default_ratio() -> f64 {
    1.0
}

/// Immutable input for one calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub lines: Vec<ElementEntry>,
    #[serde(default)]
    pub transformers: Vec<ElementEntry>,
    /// 0-based index into `lines`
    #[serde(default)]
    pub protected_line: usize,
    #[serde(default = "default_ratio")]
    pub rtc: f64,
    #[serde(default = "default_ratio")]
    pub rtp: f64,
    #[serde(default)]
    pub settings: SnapshotSettings,
}

impl NetworkSnapshot {
    pub fn new(nodes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            lines: Vec::new(),
            transformers: Vec::new(),
            protected_line: 0,
            rtc: default_ratio(),
            rtp: default_ratio(),
            settings: SnapshotSettings::default(),
        }
    }

    pub fn with_line(mut self, line: ElementEntry) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_transformer(mut self, transformer: ElementEntry) -> Self {
        self.transformers.push(transformer);
        self
    }

    pub fn with_protected_line(mut self, index: usize) -> Self {
        self.protected_line = index;
        self
    }

    pub fn with_instrument_ratio(mut self, rtc: f64, rtp: f64) -> Self {
        self.rtc = rtc;
        self.rtp = rtp;
        self
    }

    pub fn from_toml_str(input: &str) -> ReachResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> ReachResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn instrument_ratio(&self) -> InstrumentRatio {
        InstrumentRatio::new(self.rtc, self.rtp)
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(NodeId::new).collect()
    }

    /// Lines and transformers with impedances on the relay side. Fails on the
    /// first entry with a negative or non-finite value.
    pub fn elements(&self) -> Result<(Vec<Element>, Vec<Element>), SettingsError> {
        let ratio = self.instrument_ratio().factor()?;
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.to_element(format!("L{}", i + 1), ratio))
            .collect::<Result<_, _>>()?;
        let transformers = self
            .transformers
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.to_element(format!("T{}", i + 1), ratio))
            .collect::<Result<_, _>>()?;
        Ok((lines, transformers))
    }

    pub fn build_network(&self) -> ReachResult<NetworkGraph> {
        let (lines, transformers) = self.elements()?;
        Ok(NetworkGraph::build(
            self.node_ids(),
            lines,
            transformers,
            self.protected_line,
        )?)
    }

    pub fn validate(&self) -> ReachResult<TopologyReport> {
        let (lines, transformers) = self.elements()?;
        Ok(validate_topology(
            self.node_ids(),
            &lines,
            &transformers,
            self.protected_line,
        ))
    }
}
