//! chargecloud.de OCPI app API, used by municipal utilities such as
//! `RheinEnergie`. Each utility is a tenant addressed by its operator id.

use std::collections::HashMap;

use chrono::Utc;
use evmap_core::plug::{CCS_TYPE_2, CHADEMO, SCHUKO, TYPE_2_UNKNOWN};
use evmap_core::{ChargeLocation, MatchTolerance};
use reqwest::Client;
use serde::Deserialize;

use crate::detector::site::nearest_site;
use crate::detector::OperatorFilter;
use crate::error::AvailabilityError;
use crate::http::ProviderHttp;
use crate::matching::{align_to_chargepoints, match_chargepoints, ConnectorState, ProviderConnector};
use crate::model::{AvailabilityResult, ChargepointStatus};

pub(crate) const NAME: &str = "chargecloud.de";
pub(crate) const DEFAULT_BASE_URL: &str = "https://app.chargecloud.de/emobility:ocpi/";

#[derive(Debug, Deserialize)]
struct CcResponse {
    data: Vec<CcLocation>,
}

#[derive(Debug, Deserialize)]
struct CcLocation {
    #[serde(default)]
    evses: Vec<CcEvse>,
    distance_in_m: String,
}

#[derive(Debug, Deserialize)]
struct CcEvse {
    id: String,
    #[serde(default)]
    connectors: Vec<CcConnector>,
}

#[derive(Debug, Deserialize)]
struct CcConnector {
    id: i64,
    standard: String,
    max_power: f64,
    status: String,
}

fn plug_type(standard: &str) -> &str {
    match standard {
        "IEC_62196_T2" => TYPE_2_UNKNOWN,
        "DOMESTIC_F" => SCHUKO,
        "IEC_62196_T2_COMBO" => CCS_TYPE_2,
        "CHADEMO" => CHADEMO,
        other => other,
    }
}

fn status(connector_status: &str) -> ChargepointStatus {
    match connector_status {
        "AVAILABLE" => ChargepointStatus::Available,
        "CHARGING" => ChargepointStatus::Occupied,
        "OUTOFORDER" => ChargepointStatus::Faulted,
        _ => ChargepointStatus::Unknown,
    }
}

#[derive(Debug)]
pub struct ChargecloudDetector {
    http: ProviderHttp,
    operator_id: String,
    operators: OperatorFilter,
    tolerance: MatchTolerance,
}

impl ChargecloudDetector {
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        client: Client,
        base_url: Option<&str>,
        operator_id: &str,
        operators: OperatorFilter,
        tolerance: MatchTolerance,
    ) -> Result<Self, AvailabilityError> {
        Ok(Self {
            http: ProviderHttp::new(client, NAME, base_url.unwrap_or(DEFAULT_BASE_URL))?,
            operator_id: operator_id.trim().to_owned(),
            operators,
            tolerance,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        self.http.base_url().as_str()
    }

    pub(crate) fn operators(&self) -> &OperatorFilter {
        &self.operators
    }

    pub(crate) async fn get_availability(
        &self,
        charger: &ChargeLocation,
    ) -> Result<AvailabilityResult, AvailabilityError> {
        let path = format!("{}/app/2.0/locations", self.operator_id);
        #[allow(clippy::cast_possible_truncation)]
        let radius = self.tolerance.max_distance_m.round() as i64;
        let query = [
            ("latitude", charger.coordinates.lat.to_string()),
            ("longitude", charger.coordinates.lng.to_string()),
            ("radius", radius.to_string()),
            ("offset", "0".to_string()),
            ("limit", "10".to_string()),
        ];
        let response: CcResponse = self.http.get_json(&path, &query).await?;

        let mut candidates: Vec<(&CcLocation, f64)> = Vec::with_capacity(response.data.len());
        for location in &response.data {
            let distance: f64 = location.distance_in_m.trim().parse().map_err(|e| {
                AvailabilityError::parse(
                    NAME,
                    "distance_in_m",
                    format!("'{}': {e}", location.distance_in_m),
                )
            })?;
            candidates.push((location, distance));
        }
        // Only the nearest location is used, so every other one in range is
        // a rival.
        let site = nearest_site(&candidates, |(_, d)| *d, |_, _| false, &self.tolerance)
            .map_err(|reason| AvailabilityError::ambiguous(NAME, reason))?;
        let Some(&&(location, distance)) = site.first() else {
            return Err(AvailabilityError::ambiguous(NAME, "no location selected"));
        };
        tracing::debug!(distance, evses = location.evses.len(), "chargecloud nearest location");

        let mut connectors = Vec::new();
        let mut states = HashMap::new();
        for evse in &location.evses {
            for connector in &evse.connectors {
                let id = connector.id.to_string();
                connectors.push(ProviderConnector::new(
                    id.clone(),
                    connector.max_power,
                    plug_type(&connector.standard),
                ));
                states.insert(
                    id,
                    ConnectorState {
                        status: status(&connector.status),
                        evse_id: Some(evse.id.clone()),
                    },
                );
            }
        }
        if connectors.is_empty() {
            return Err(AvailabilityError::parse(
                NAME,
                "locations",
                "nearest location has no connectors",
            ));
        }

        let matches = match_chargepoints(&connectors, &charger.merged_chargepoints()).map_err(
            |e| AvailabilityError::ConnectorMismatch {
                provider: NAME.to_owned(),
                reason: e.0,
            },
        )?;

        Ok(AvailabilityResult {
            source: NAME.to_owned(),
            connectors: align_to_chargepoints(charger, &matches, &states),
            retrieved_at: Utc::now(),
        })
    }
}
