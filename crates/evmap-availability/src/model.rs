//! Normalized availability snapshots.

use chrono::{DateTime, Utc};
use evmap_core::plug::plugs_equivalent;
use evmap_core::Chargepoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargepointStatus {
    Available,
    Occupied,
    Faulted,
    Unknown,
}

/// Live status of one chargepoint entry of a charger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorAvailability {
    pub chargepoint: Chargepoint,
    /// One status per instance; `statuses.len() == chargepoint.count`.
    pub statuses: Vec<ChargepointStatus>,
    /// Provider EVSE id per instance, where the provider reports one.
    pub evse_ids: Vec<Option<String>>,
}

/// Immutable availability snapshot for one charger.
///
/// `connectors` is aligned with the charger's `chargepoints`: same length,
/// same order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    /// Provider label, e.g. `"NewMotion"`.
    pub source: String,
    pub connectors: Vec<ConnectorAvailability>,
    pub retrieved_at: DateTime<Utc>,
}

impl AvailabilityResult {
    #[must_use]
    pub fn total_chargepoints(&self) -> usize {
        self.connectors.iter().map(|c| c.statuses.len()).sum()
    }

    /// Number of chargepoint instances currently in `status`.
    #[must_use]
    pub fn count(&self, status: ChargepointStatus) -> usize {
        self.connectors
            .iter()
            .flat_map(|c| c.statuses.iter())
            .filter(|s| **s == status)
            .count()
    }

    /// Keeps only connectors with a plug equivalent to one of `plugs` and at
    /// least `min_power` kW. `None` disables the respective filter.
    #[must_use]
    pub fn filtered(&self, plugs: Option<&[&str]>, min_power: Option<f64>) -> AvailabilityResult {
        let connectors = self
            .connectors
            .iter()
            .filter(|c| {
                plugs.is_none_or(|wanted| {
                    wanted
                        .iter()
                        .any(|p| plugs_equivalent(p, &c.chargepoint.plug_type))
                })
            })
            .filter(|c| {
                min_power.is_none_or(|min| c.chargepoint.power.is_some_and(|p| p >= min))
            })
            .cloned()
            .collect();
        AvailabilityResult {
            source: self.source.clone(),
            connectors,
            retrieved_at: self.retrieved_at,
        }
    }
}
