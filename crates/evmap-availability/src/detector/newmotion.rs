//! `NewMotion` (Shell Recharge) public map API.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use evmap_core::plug::{CCS_TYPE_2, CHADEMO, SCHUKO, TYPE_2_UNKNOWN};
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

pub(crate) const NAME: &str = "NewMotion";
pub(crate) const DEFAULT_BASE_URL: &str = "https://my.newmotion.com/api/map/v2/";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NmMarker {
    coordinates: NmCoordinates,
    location_uid: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct NmCoordinates {
    latitude: f64,
    longitude: f64,
}

impl From<NmCoordinates> for Coordinate {
    fn from(c: NmCoordinates) -> Self {
        Coordinate::new(c.latitude, c.longitude)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NmLocation {
    uid: i64,
    operator_name: String,
    #[serde(default)]
    evses: Vec<NmEvse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NmEvse {
    evse_id: Option<String>,
    status: String,
    #[serde(default)]
    connectors: Vec<NmConnector>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NmConnector {
    uid: i64,
    connector_type: String,
    electrical_properties: NmElectricalProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NmElectricalProperties {
    power_type: String,
    voltage: i64,
    amperage: i64,
}

impl NmElectricalProperties {
    /// kW, snapped to the nominal values chargers are usually listed with.
    #[allow(clippy::cast_precision_loss)]
    fn power(&self) -> f64 {
        let phases = if self.power_type == "AC3Phase" { 3 } else { 1 };
        let volt = if self.voltage == 277 { 230 } else { self.voltage };
        match volt * self.amperage * phases {
            3680 => 3.7,
            11040 => 11.0,
            22080 => 22.0,
            43470 => 43.0,
            watts => watts as f64 / 1000.0,
        }
    }
}

fn plug_type(connector_type: &str) -> &str {
    match connector_type {
        "Type2" => TYPE_2_UNKNOWN,
        "Domestic" => SCHUKO,
        "Type2Combo" => CCS_TYPE_2,
        "TepcoCHAdeMO" => CHADEMO,
        other => other,
    }
}

fn status(evse_status: &str) -> ChargepointStatus {
    match evse_status {
        "Available" => ChargepointStatus::Available,
        "Occupied" => ChargepointStatus::Occupied,
        "Unavailable" => ChargepointStatus::Faulted,
        _ => ChargepointStatus::Unknown,
    }
}

/// Location uids of the marker nearest to `center` and of every marker
/// within `cluster_distance_m` of it.
///
/// # Errors
///
/// Returns a reason string when no marker lies within `max_distance_m`, or
/// when another site is nearly as close as the nearest one.
fn cluster_markers(
    markers: &[NmMarker],
    center: &Coordinate,
    tolerance: &MatchTolerance,
) -> Result<Vec<i64>, String> {
    let site = nearest_site(
        markers,
        |m| haversine_distance_meters(center, &m.coordinates.into()),
        |nearest, m| {
            haversine_distance_meters(&nearest.coordinates.into(), &m.coordinates.into())
                < tolerance.cluster_distance_m
        },
        tolerance,
    )?;

    let mut uids: Vec<i64> = Vec::new();
    for marker in site {
        if !uids.contains(&marker.location_uid) {
            uids.push(marker.location_uid);
        }
    }
    Ok(uids)
}

#[derive(Debug)]
pub struct NewMotionDetector {
    http: ProviderHttp,
    operators: OperatorFilter,
    tolerance: MatchTolerance,
    cache: Arc<ProviderMappingCache>,
}

impl NewMotionDetector {
    /// # Errors
    ///
    /// Returns [`AvailabilityError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        client: Client,
        base_url: Option<&str>,
        operators: OperatorFilter,
        tolerance: MatchTolerance,
        cache: Arc<ProviderMappingCache>,
    ) -> Result<Self, AvailabilityError> {
        Ok(Self {
            http: ProviderHttp::new(client, NAME, base_url.unwrap_or(DEFAULT_BASE_URL))?,
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

    pub(crate) async fn get_availability(
        &self,
        charger: &ChargeLocation,
    ) -> Result<AvailabilityResult, AvailabilityError> {
        let locations = self.resolve_locations(charger).await?;

        let Some(first) = locations.first() else {
            return Err(AvailabilityError::ambiguous(NAME, "no locations resolved"));
        };
        let operator = first.operator_name.clone();

        let mut connectors = Vec::new();
        let mut states = HashMap::new();
        for location in locations.iter().filter(|l| l.operator_name == operator) {
            for evse in &location.evses {
                for connector in &evse.connectors {
                    let id = connector.uid.to_string();
                    connectors.push(ProviderConnector::new(
                        id.clone(),
                        connector.electrical_properties.power(),
                        plug_type(&connector.connector_type),
                    ));
                    states.insert(
                        id,
                        ConnectorState {
                            status: status(&evse.status),
                            evse_id: evse.evse_id.clone(),
                        },
                    );
                }
            }
        }
        if connectors.is_empty() {
            return Err(AvailabilityError::parse(
                NAME,
                format!("location {}", first.uid),
                "location has no connectors",
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

    /// Location details for `charger`, via the mapping cache when possible.
    async fn resolve_locations(
        &self,
        charger: &ChargeLocation,
    ) -> Result<Vec<NmLocation>, AvailabilityError> {
        let key = MappingKey::new(NAME, &charger.data_source, charger.id);

        if let Some(mapping) = self.cache.get(&key) {
            match self.fetch_locations(&mapping.provider_ids).await {
                Err(AvailabilityError::RemoteUnavailable {
                    cause: RemoteCause::Status(404),
                    ..
                }) => {
                    tracing::info!(charger_id = charger.id, "cached NewMotion location vanished");
                    self.cache.invalidate(&key);
                }
                other => return other,
            }
        }

        let uids = self.find_site(&charger.coordinates).await?;
        let ids: Vec<String> = uids.iter().map(ToString::to_string).collect();
        let locations = self.fetch_locations(&ids).await?;
        self.cache.insert(key, ids);
        Ok(locations)
    }

    async fn find_site(&self, center: &Coordinate) -> Result<Vec<i64>, AvailabilityError> {
        let bbox = BoundingBox::around(center, self.tolerance.search_range_deg);
        let path = format!(
            "markers/{}/{}/{}/{}",
            bbox.min_lng, bbox.max_lng, bbox.min_lat, bbox.max_lat
        );
        let markers: Vec<NmMarker> = self.http.get_json(&path, &[]).await?;
        tracing::debug!(markers = markers.len(), "NewMotion marker search");

        cluster_markers(&markers, center, &self.tolerance)
            .map_err(|reason| AvailabilityError::ambiguous(NAME, reason))
    }

    async fn fetch_locations(&self, ids: &[String]) -> Result<Vec<NmLocation>, AvailabilityError> {
        try_join_all(ids.iter().map(|id| async move {
            self.http
                .get_json::<NmLocation>(&format!("locations/{id}"), &[])
                .await
        }))
        .await
    }
}
