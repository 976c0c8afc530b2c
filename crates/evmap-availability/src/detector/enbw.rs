//! EnBW mobility+ public charge station API.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use evmap_core::plug::{CCS_TYPE_1, CCS_TYPE_2, CHADEMO, SCHUKO, TYPE_1, TYPE_2_UNKNOWN, TYPE_3};
use evmap_core::{
    haversine_distance_meters, BoundingBox, ChargeLocation, Coordinate, MatchTolerance,
};
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;

use crate::cache::{MappingKey, ProviderMappingCache};
use crate::detector::site::nearest_site;
use crate::detector::OperatorFilter;
use crate::error::{AvailabilityError, RemoteCause};
use crate::http::ProviderHttp;
use crate::matching::{align_to_chargepoints, match_chargepoints, ConnectorState, ProviderConnector};
use crate::model::{AvailabilityResult, ChargepointStatus};

pub(crate) const NAME: &str = "EnBW";
pub(crate) const DEFAULT_BASE_URL: &str =
    "https://enbw-emp.azure-api.net/emobility-public-api/api/v1/";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnBwMarker {
    lat: f64,
    lon: f64,
    station_id: Option<i64>,
    #[serde(default)]
    grouped: bool,
    #[serde(default)]
    number_of_charge_points: u32,
    #[serde(default)]
    operator: String,
    view_port: Option<EnBwViewport>,
}

impl EnBwMarker {
    fn position(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnBwViewport {
    lower_left_lat: f64,
    lower_left_lon: f64,
    upper_right_lat: f64,
    upper_right_lon: f64,
}

impl From<EnBwViewport> for BoundingBox {
    fn from(v: EnBwViewport) -> Self {
        BoundingBox {
            min_lat: v.lower_left_lat,
            max_lat: v.upper_right_lat,
            min_lng: v.lower_left_lon,
            max_lng: v.upper_right_lon,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnBwStation {
    station_id: i64,
    #[serde(default)]
    charge_points: Vec<EnBwChargePoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnBwChargePoint {
    evse_id: Option<String>,
    status: String,
    #[serde(default)]
    connectors: Vec<EnBwConnector>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnBwConnector {
    plug_type_name: String,
    max_power_in_kw: Option<f64>,
}

fn plug_type(plug_type_name: &str) -> &str {
    match plug_type_name {
        "Typ 3A" | "Typ 3C \"Scame\"" => TYPE_3,
        "Typ 2" => TYPE_2_UNKNOWN,
        "Typ 1" => TYPE_1,
        "Steckdose(D)" => SCHUKO,
        "CCS (Typ 1)" => CCS_TYPE_1,
        "CCS (Typ 2)" => CCS_TYPE_2,
        "CHAdeMO" => CHADEMO,
        other => other,
    }
}

fn status(charge_point_status: &str) -> ChargepointStatus {
    match charge_point_status {
        "AVAILABLE" => ChargepointStatus::Available,
        "OCCUPIED" => ChargepointStatus::Occupied,
        "UNAVAILABLE" | "OUT_OF_SERVICE" => ChargepointStatus::Faulted,
        _ => ChargepointStatus::Unknown,
    }
}

/// Station ids making up the site at `center`.
///
/// Neighbouring markers of the same operator are only combined when the
/// nearest station alone has fewer chargepoints than the charger.
fn site_station_ids(
    markers: &[EnBwMarker],
    center: &Coordinate,
    total_chargepoints: u32,
    tolerance: &MatchTolerance,
) -> Result<Vec<i64>, String> {
    let site = nearest_site(
        markers,
        |m| haversine_distance_meters(center, &m.position()),
        |nearest, m| {
            haversine_distance_meters(&nearest.position(), &m.position())
                < tolerance.cluster_distance_m
        },
        tolerance,
    )?;
    let Some(&nearest) = site.first() else {
        return Err("no marker selected".to_string());
    };

    let mut ids: Vec<i64> = Vec::new();
    let combine = nearest.number_of_charge_points < total_chargepoints;
    for marker in site {
        if !combine && !std::ptr::eq(marker, nearest) {
            continue;
        }
        if marker.operator != nearest.operator {
            continue;
        }
        if let Some(id) = marker.station_id {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    if ids.is_empty() {
        return Err("nearest marker has no station id".to_string());
    }
    Ok(ids)
}

pub struct EnBwDetector {
    http: ProviderHttp,
    api_key: String,
    operators: OperatorFilter,
    tolerance: MatchTolerance,
    cache: Arc<ProviderMappingCache>,
}

impl std::fmt::Debug for EnBwDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnBwDetector")
            .field("base_url", &self.http.base_url().as_str())
            .field("api_key", &"[redacted]")
            .field("operators", &self.operators)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl EnBwDetector {
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        client: Client,
        base_url: Option<&str>,
        api_key: &str,
        operators: OperatorFilter,
        tolerance: MatchTolerance,
        cache: Arc<ProviderMappingCache>,
    ) -> Result<Self, AvailabilityError> {
        Ok(Self {
            http: ProviderHttp::new(client, NAME, base_url.unwrap_or(DEFAULT_BASE_URL))?,
            api_key: api_key.trim().to_owned(),
            operators,
            tolerance,
            cache,
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        self.http.base_url().as_str()
    }

    pub(crate) fn operators(&self) -> &OperatorFilter {
        &self.operators
    }

    fn headers(&self) -> [(&str, &str); 4] {
        [
            ("Ocp-Apim-Subscription-Key", self.api_key.as_str()),
            ("Origin", "https://www.enbw.com"),
            ("Referer", "https://www.enbw.com/"),
            ("Accept", "application/json"),
        ]
    }

    pub(crate) async fn get_availability(
        &self,
        charger: &ChargeLocation,
    ) -> Result<AvailabilityResult, AvailabilityError> {
        let stations = self.resolve_stations(charger).await?;

        // Connector ids are positions in the flattened list of this response.
        let mut connectors = Vec::new();
        let mut states = HashMap::new();
        for charge_point in stations.iter().flat_map(|s| &s.charge_points) {
            for connector in &charge_point.connectors {
                let id = connectors.len().to_string();
                connectors.push(ProviderConnector::new(
                    id.clone(),
                    connector.max_power_in_kw.unwrap_or(0.0),
                    plug_type(&connector.plug_type_name),
                ));
                states.insert(
                    id,
                    ConnectorState {
                        status: status(&charge_point.status),
                        evse_id: charge_point.evse_id.clone(),
                    },
                );
            }
        }
        if connectors.is_empty() {
            let ids: Vec<String> = stations.iter().map(|s| s.station_id.to_string()).collect();
            return Err(AvailabilityError::parse(
                NAME,
                format!("stations {}", ids.join(",")),
                "stations have no connectors",
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

    async fn resolve_stations(
        &self,
        charger: &ChargeLocation,
    ) -> Result<Vec<EnBwStation>, AvailabilityError> {
        let key = MappingKey::new(NAME, &charger.data_source, charger.id);

        if let Some(mapping) = self.cache.get(&key) {
            match self.fetch_stations(&mapping.provider_ids).await {
                Err(AvailabilityError::RemoteUnavailable {
                    cause: RemoteCause::Status(404),
                    ..
                }) => {
                    tracing::info!(charger_id = charger.id, "cached EnBW station vanished");
                    self.cache.invalidate(&key);
                }
                other => return other,
            }
        }

        let markers = self.find_markers(&charger.coordinates).await?;
        let ids: Vec<String> = site_station_ids(
            &markers,
            &charger.coordinates,
            charger.total_chargepoints(),
            &self.tolerance,
        )
        .map_err(|reason| AvailabilityError::ambiguous(NAME, reason))?
        .iter()
        .map(ToString::to_string)
        .collect();

        let stations = self.fetch_stations(&ids).await?;
        self.cache.insert(key, ids);
        Ok(stations)
    }

    /// Ungrouped markers around `center`. Grouped markers are expanded once
    /// by searching their viewport.
    async fn find_markers(
        &self,
        center: &Coordinate,
    ) -> Result<Vec<EnBwMarker>, AvailabilityError> {
        let markers = self
            .fetch_markers(&BoundingBox::around(center, self.tolerance.search_range_deg))
            .await?;

        let (grouped, mut ungrouped): (Vec<_>, Vec<_>) =
            markers.into_iter().partition(|m| m.grouped);
        let viewports = grouped
            .iter()
            .map(|m| {
                m.view_port.ok_or_else(|| {
                    AvailabilityError::parse(
                        NAME,
                        "chargestations",
                        "grouped marker without viewPort",
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let expanded = try_join_all(
            viewports
                .into_iter()
                .map(|viewport| async move { self.fetch_markers(&viewport.into()).await }),
        )
        .await?;

        for marker in expanded.into_iter().flatten() {
            if marker.grouped {
                return Err(AvailabilityError::ambiguous(NAME, "markers are still grouped"));
            }
            ungrouped.push(marker);
        }
        tracing::debug!(markers = ungrouped.len(), "EnBW marker search");
        Ok(ungrouped)
    }

    async fn fetch_markers(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<EnBwMarker>, AvailabilityError> {
        let query = [
            ("grouping", "false".to_string()),
            ("fromLon", bbox.min_lng.to_string()),
            ("toLon", bbox.max_lng.to_string()),
            ("fromLat", bbox.min_lat.to_string()),
            ("toLat", bbox.max_lat.to_string()),
        ];
        self.http
            .get_json_with_headers("chargestations", &query, &self.headers())
            .await
    }

    async fn fetch_stations(&self, ids: &[String]) -> Result<Vec<EnBwStation>, AvailabilityError> {
        let headers = self.headers();
        let headers = &headers;
        try_join_all(ids.iter().map(|id| async move {
            self.http
                .get_json_with_headers::<EnBwStation>(
                    &format!("chargestations/{id}"),
                    &[],
                    headers,
                )
                .await
        }))
        .await
    }
}
