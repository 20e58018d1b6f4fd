//! Infeed correction for Zones 2 and 3.
//!
//! Current injected at the far bus by other sources makes a remote fault look
//! farther away to the relay. The raw reach is stretched by
//!
//! ```text
//! K     = Idown / Ir
//! Zcorr = Zraw · (1 + K)
//! ```
//!
//! where `Ir` is the fault-current magnitude through the protected line and
//! `Idown` sums the fault-current magnitudes of every element leaving the far
//! node, minus the branch the selected candidate was built on.

use crate::zones::RawReach;
use reach_core::{Amperes, ElementId, NetworkGraph, Phasor, TopologyQuery, ZoneError};
use serde::Serialize;
use tracing::{debug, warn};

/// Corrected reach plus the currents behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfeedCorrection {
    pub corrected: Phasor,
    pub relay_current: Amperes,
    pub downstream_current: Amperes,
    /// `K = Idown / Ir`, or 0 when `Ir` is zero
    pub infeed_factor: f64,
    /// Elements whose currents were summed
    pub contributors: Vec<ElementId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded: Option<ElementId>,
}

#[derive(Debug, Clone, Copy)]
pub struct InfeedCorrector<'a> {
    network: &'a NetworkGraph,
    query: TopologyQuery<'a>,
}

impl<'a> InfeedCorrector<'a> {
    pub fn new(network: &'a NetworkGraph) -> Self {
        Self {
            network,
            query: network.query(),
        }
    }

    /// Fault-current magnitude through the protected line.
    pub fn relay_current(&self) -> Result<Amperes, ZoneError> {
        Ok(self.network.protected_params()?.fault_current_magnitude())
    }

    pub fn correct(&self, raw: &RawReach) -> Result<InfeedCorrection, ZoneError> {
        let relay_current = self.relay_current()?;
        let excluded = raw.selected_candidate().branch.as_ref();

        let mut downstream_current = Amperes(0.0);
        let mut contributors = Vec::new();
        for incident in self.query.incident_directed_from(self.network.far()) {
            if excluded.is_some_and(|branch| branch.at == incident.at) {
                continue;
            }
            downstream_current += incident.params()?.fault_current_magnitude();
            contributors.push(incident.element.id.clone());
        }

        let infeed_factor = if relay_current.value() == 0.0 {
            warn!(zone = raw.zone.number(), "relay fault current is zero; infeed factor set to 0");
            0.0
        } else {
            downstream_current / relay_current
        };
        let corrected = raw.reach() * (1.0 + infeed_factor);
        debug!(
            zone = raw.zone.number(),
            k = infeed_factor,
            %corrected,
            "infeed correction"
        );

        Ok(InfeedCorrection {
            corrected,
            relay_current,
            downstream_current,
            infeed_factor,
            contributors,
            excluded: excluded.map(|branch| branch.id.clone()),
        })
    }
}
