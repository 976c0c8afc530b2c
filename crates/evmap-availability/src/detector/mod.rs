//! Provider-specific availability detectors.
//!
//! The set of providers is closed, so dispatch is a plain enum rather than a
//! trait object.

mod chargecloud;
mod enbw;
mod newmotion;
mod site;

use std::sync::Arc;

use evmap_core::{normalize_operator_name, ChargeLocation, DetectorConfig, DetectorKind};
use reqwest::Client;

use crate::cache::ProviderMappingCache;
use crate::error::AvailabilityError;
use crate::model::AvailabilityResult;

pub use chargecloud::ChargecloudDetector;
pub use enbw::EnBwDetector;
pub use newmotion::NewMotionDetector;

/// Operator names a detector is responsible for, pre-normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorFilter {
    names: Vec<String>,
}

impl OperatorFilter {
    #[must_use]
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            names: names
                .iter()
                .map(|n| normalize_operator_name(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Exact, case-insensitive comparison against the charger's network,
    /// falling back to its operator.
    #[must_use]
    pub fn matches(&self, charger: &ChargeLocation) -> bool {
        charger
            .network_or_operator()
            .map(normalize_operator_name)
            .is_some_and(|name| self.names.iter().any(|n| *n == name))
    }
}

#[derive(Debug)]
pub enum Detector {
    NewMotion(NewMotionDetector),
    Chargecloud(ChargecloudDetector),
    EnBw(EnBwDetector),
}

impl Detector {
    /// Build a detector from one `detectors.yaml` entry.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] if the configured base
    /// URL does not parse.
    pub fn from_config(
        config: &DetectorConfig,
        client: Client,
        cache: Arc<ProviderMappingCache>,
    ) -> Result<Self, AvailabilityError> {
        let operators = OperatorFilter::new(&config.operators);
        match config.kind {
            DetectorKind::NewMotion => Ok(Detector::NewMotion(NewMotionDetector::new(
                client,
                config.base_url.as_deref(),
                operators,
                config.tolerance,
                cache,
            )?)),
            DetectorKind::Chargecloud => {
                let operator_id = config.operator_id.as_deref().unwrap_or_default();
                Ok(Detector::Chargecloud(ChargecloudDetector::new(
                    client,
                    config.base_url.as_deref(),
                    operator_id,
                    operators,
                    config.tolerance,
                )?))
            }
            DetectorKind::EnBw => Ok(Detector::EnBw(EnBwDetector::new(
                client,
                config.base_url.as_deref(),
                config.api_key.as_deref().unwrap_or_default(),
                operators,
                config.tolerance,
                cache,
            )?)),
        }
    }

    /// Provider label reported as [`AvailabilityResult::source`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Detector::NewMotion(_) => newmotion::NAME,
            Detector::Chargecloud(_) => chargecloud::NAME,
            Detector::EnBw(_) => enbw::NAME,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        match self {
            Detector::NewMotion(d) => d.base_url(),
            Detector::Chargecloud(d) => d.base_url(),
            Detector::EnBw(d) => d.base_url(),
        }
    }

    /// Pure predicate; performs no I/O.
    #[must_use]
    pub fn is_charger_supported(&self, charger: &ChargeLocation) -> bool {
        match self {
            Detector::NewMotion(d) => d.operators().matches(charger),
            Detector::Chargecloud(d) => d.operators().matches(charger),
            Detector::EnBw(d) => d.operators().matches(charger),
        }
    }

    /// Fetch live availability for `charger` from this provider.
    ///
    /// # Errors
    ///
    /// Any per-lookup [`AvailabilityError`].
    pub async fn get_availability(
        &self,
        charger: &ChargeLocation,
    ) -> Result<AvailabilityResult, AvailabilityError> {
        match self {
            Detector::NewMotion(d) => d.get_availability(charger).await,
            Detector::Chargecloud(d) => d.get_availability(charger).await,
            Detector::EnBw(d) => d.get_availability(charger).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evmap_core::Coordinate;

    fn charger(network: Option<&str>, operator: Option<&str>) -> ChargeLocation {
        ChargeLocation {
            id: 1,
            data_source: "goingelectric".to_owned(),
            name: "Test".to_owned(),
            coordinates: Coordinate::new(50.0, 7.0),
            network: network.map(str::to_owned),
            operator: operator.map(str::to_owned),
            country: None,
            chargepoints: vec![],
        }
    }

    #[test]
    fn operator_filter_is_case_and_whitespace_insensitive() {
        let filter = OperatorFilter::new(&["Shell  Recharge", "NewMotion"]);
        assert!(filter.matches(&charger(Some("shell recharge"), None)));
        assert!(filter.matches(&charger(Some(" NEWMOTION "), None)));
    }

    #[test]
    fn operator_filter_rejects_partial_names() {
        let filter = OperatorFilter::new(&["RheinEnergie"]);
        assert!(!filter.matches(&charger(Some("RheinEnergie AG"), None)));
        assert!(!filter.matches(&charger(Some("Rhein"), None)));
    }

    #[test]
    fn operator_filter_falls_back_to_operator() {
        let filter = OperatorFilter::new(&["RheinEnergie"]);
        assert!(filter.matches(&charger(None, Some("RheinEnergie"))));
        assert!(filter.matches(&charger(Some("  "), Some("rheinenergie"))));
        assert!(!filter.matches(&charger(None, None)));
    }
}
