//! fronyx occupancy predictions for individual EVSEs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use evmap_core::plug::{CCS_TYPE_2, CCS_UNKNOWN, CHADEMO};
use evmap_core::{ChargeLocation, Chargepoint};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AvailabilityError;
use crate::http::ProviderHttp;

const NAME: &str = "fronyx";
pub const FRONYX_BASE_URL: &str = "https://api.fronyx.io/api/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FronyxStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FronyxPrediction {
    pub timestamp: DateTime<Utc>,
    pub status: FronyxStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FronyxEvseIdResponse {
    pub evse_id: String,
    pub predictions: Vec<FronyxPrediction>,
}

pub struct FronyxClient {
    http: ProviderHttp,
    api_key: String,
}

impl std::fmt::Debug for FronyxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FronyxClient")
            .field("base_url", &self.http.base_url().as_str())
            .field("api_key", &"[redacted]")
            .finish()
    }
}

impl FronyxClient {
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] only if the built-in
    /// base URL is broken.
    pub fn new(client: Client, api_key: &str) -> Result<Self, AvailabilityError> {
        Self::with_base_url(client, api_key, FRONYX_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        api_key: &str,
        base_url: &str,
    ) -> Result<Self, AvailabilityError> {
        Ok(Self {
            http: ProviderHttp::new(client, NAME, base_url)?,
            api_key: api_key.to_owned(),
        })
    }

    /// Predictions for several EVSEs in one request.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::RemoteUnavailable`] or
    /// [`AvailabilityError::Parse`] as described on
    /// [`ProviderHttp::get_json`].
    pub async fn get_predictions_for_evse_ids(
        &self,
        evse_ids: &[String],
    ) -> Result<Vec<FronyxEvseIdResponse>, AvailabilityError> {
        if evse_ids.is_empty() {
            return Ok(Vec::new());
        }
        // fronyx expects a literal comma-separated list, not an encoded one.
        let path = format!("predictions/evses?evseIds={}", evse_ids.join(","));
        self.http
            .get_json_with_headers(&path, &[], &[("X-API-Token", self.api_key.as_str())])
            .await
    }
}

/// Heuristic without I/O: fronyx only predicts DC chargepoints in Germany.
#[must_use]
pub fn is_chargepoint_supported(charger: &ChargeLocation, chargepoint: &Chargepoint) -> bool {
    let in_germany = charger
        .country
        .as_deref()
        .is_some_and(|c| matches!(c.trim(), "Deutschland" | "Germany"));
    in_germany
        && matches!(
            chargepoint.plug_type.as_str(),
            CCS_UNKNOWN | CCS_TYPE_2 | CHADEMO
        )
}

/// Number of EVSEs predicted unavailable at each future timestamp.
///
/// Timestamps at which any of the EVSEs lacks a prediction are skipped.
/// Returns `None` when nothing remains.
#[must_use]
pub fn prediction_graph(
    responses: &[FronyxEvseIdResponse],
    now: DateTime<Utc>,
) -> Option<BTreeMap<DateTime<Utc>, usize>> {
    if responses.is_empty() {
        return None;
    }

    let mut by_timestamp: BTreeMap<DateTime<Utc>, (usize, usize)> = BTreeMap::new();
    for response in responses {
        for prediction in &response.predictions {
            let entry = by_timestamp.entry(prediction.timestamp).or_default();
            entry.0 += 1;
            if prediction.status == FronyxStatus::Unavailable {
                entry.1 += 1;
            }
        }
    }

    let graph: BTreeMap<_, _> = by_timestamp
        .into_iter()
        .filter(|(ts, (seen, _))| *ts > now && *seen == responses.len())
        .map(|(ts, (_, unavailable))| (ts, unavailable))
        .collect();

    (!graph.is_empty()).then_some(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use evmap_core::plug::TYPE_2_UNKNOWN;
    use evmap_core::Coordinate;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn response(evse: &str, predictions: &[(u32, FronyxStatus)]) -> FronyxEvseIdResponse {
        FronyxEvseIdResponse {
            evse_id: evse.to_owned(),
            predictions: predictions
                .iter()
                .map(|(h, s)| FronyxPrediction {
                    timestamp: at(*h),
                    status: *s,
                })
                .collect(),
        }
    }

    #[test]
    fn graph_counts_unavailable_evses_in_the_future() {
        use FronyxStatus::{Available, Unavailable};
        let responses = [
            response("A", &[(9, Unavailable), (10, Unavailable), (11, Available)]),
            response("B", &[(9, Unavailable), (10, Available), (11, Available)]),
        ];
        let graph = prediction_graph(&responses, at(9)).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[&at(10)], 1);
        assert_eq!(graph[&at(11)], 0);
    }

    #[test]
    fn graph_skips_incomplete_timestamps() {
        use FronyxStatus::Unavailable;
        let responses = [
            response("A", &[(10, Unavailable), (11, Unavailable)]),
            response("B", &[(11, Unavailable)]),
        ];
        let graph = prediction_graph(&responses, at(8)).unwrap();
        assert_eq!(graph.keys().copied().collect::<Vec<_>>(), vec![at(11)]);
        assert_eq!(graph[&at(11)], 2);
    }

    #[test]
    fn graph_is_none_without_data() {
        assert!(prediction_graph(&[], at(8)).is_none());
        let past_only = [response("A", &[(7, FronyxStatus::Available)])];
        assert!(prediction_graph(&past_only, at(8)).is_none());
    }

    #[test]
    fn only_german_dc_chargepoints_are_supported() {
        let mut charger = ChargeLocation {
            id: 1,
            data_source: "goingelectric".to_owned(),
            name: "HPC".to_owned(),
            coordinates: Coordinate::new(50.0, 7.0),
            network: None,
            operator: None,
            country: Some("Deutschland".to_owned()),
            chargepoints: vec![],
        };
        let ccs = Chargepoint::new(CCS_TYPE_2, Some(150.0), 2);
        let type2 = Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 2);
        assert!(is_chargepoint_supported(&charger, &ccs));
        assert!(!is_chargepoint_supported(&charger, &type2));

        charger.country = Some("France".to_owned());
        assert!(!is_chargepoint_supported(&charger, &ccs));
    }

    #[test]
    fn country_codes_and_ccs_type_1_are_not_supported() {
        let mut charger = ChargeLocation {
            id: 1,
            data_source: "goingelectric".to_owned(),
            name: "HPC".to_owned(),
            coordinates: Coordinate::new(50.0, 7.0),
            network: None,
            operator: None,
            country: Some("Germany".to_owned()),
            chargepoints: vec![],
        };
        let ccs1 = Chargepoint::new(evmap_core::plug::CCS_TYPE_1, Some(50.0), 1);
        let ccs = Chargepoint::new(CCS_UNKNOWN, Some(50.0), 1);
        assert!(!is_chargepoint_supported(&charger, &ccs1));
        assert!(is_chargepoint_supported(&charger, &ccs));

        charger.country = Some("DE".to_owned());
        assert!(!is_chargepoint_supported(&charger, &ccs));
    }

    #[test]
    fn status_decodes_uppercase() {
        let p: FronyxPrediction =
            serde_json::from_str(r#"{"timestamp":"2024-05-01T10:00:00Z","status":"UNAVAILABLE"}"#)
                .unwrap();
        assert_eq!(p.status, FronyxStatus::Unavailable);
    }
}
