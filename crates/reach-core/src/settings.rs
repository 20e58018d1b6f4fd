//! Operator settings for a reach calculation.
//!
//! Two knobs: the Zone-1 coverage percentage (0–100, default 85) and the
//! arc-resistance operating angle, restricted to 45°, 60° or 75° (default 60°).

use crate::error::SettingsError;
use crate::units::Degrees;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ZONE1_PERCENT: u8 = 85;

/// Operating angle the arc-resistance adjustment rotates every reach onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ArcAngle {
    Deg45,
    #[default]
    Deg60,
    Deg75,
}

impl ArcAngle {
    pub const ALL: [ArcAngle; 3] = [ArcAngle::Deg45, ArcAngle::Deg60, ArcAngle::Deg75];

    pub fn whole_degrees(self) -> u32 {
        match self {
            ArcAngle::Deg45 => 45,
            ArcAngle::Deg60 => 60,
            ArcAngle::Deg75 => 75,
        }
    }

    pub fn degrees(self) -> Degrees {
        Degrees(self.whole_degrees() as f64)
    }
}

impl TryFrom<u32> for ArcAngle {
    type Error = SettingsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            45 => Ok(ArcAngle::Deg45),
            60 => Ok(ArcAngle::Deg60),
            75 => Ok(ArcAngle::Deg75),
            other => Err(SettingsError::ArcAngle(other.to_string())),
        }
    }
}

impl From<ArcAngle> for u32 {
    fn from(angle: ArcAngle) -> u32 {
        angle.whole_degrees()
    }
}

impl FromStr for ArcAngle {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('°');
        trimmed
            .parse::<u32>()
            .map_err(|_| SettingsError::ArcAngle(s.to_string()))
            .and_then(ArcAngle::try_from)
    }
}

impl fmt::Display for ArcAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.whole_degrees())
    }
}

/// Validated settings passed to the zone pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtectionSettings {
    zone1_percent: u8,
    arc_angle: ArcAngle,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            zone1_percent: DEFAULT_ZONE1_PERCENT,
            arc_angle: ArcAngle::default(),
        }
    }
}

impl ProtectionSettings {
    pub fn new(zone1_percent: i64, arc_angle: ArcAngle) -> Result<Self, SettingsError> {
        Self::default()
            .with_zone1_percent(zone1_percent)
            .map(|settings| settings.with_arc_angle(arc_angle))
    }

    pub fn with_zone1_percent(mut self, percent: i64) -> Result<Self, SettingsError> {
        if !(0..=100).contains(&percent) {
            return Err(SettingsError::Zone1Percent(percent));
        }
        self.zone1_percent = percent as u8;
        Ok(self)
    }

    pub fn with_arc_angle(mut self, arc_angle: ArcAngle) -> Self {
        self.arc_angle = arc_angle;
        self
    }

    pub fn zone1_percent(&self) -> u8 {
        self.zone1_percent
    }

    /// Zone-1 percentage as a fraction of the protected line.
    pub fn zone1_fraction(&self) -> f64 {
        self.zone1_percent as f64 / 100.0
    }

    pub fn arc_angle(&self) -> ArcAngle {
        self.arc_angle
    }
}
