//! Chargeprice request and response types.
//!
//! The API speaks JSON:API: requests and responses are wrapped in a
//! `{"data": {"type": ..., "attributes": ..., "relationships": ...}}`
//! document. The public types here are the flat attribute structs; the
//! envelope types are private to the crate.

use std::collections::HashMap;

use evmap_core::plug::{
    equivalent_plug_types, CCS_UNKNOWN, CEE_BLAU, CEE_ROT, CHADEMO, SCHUKO, SUPERCHARGER, TYPE_1,
    TYPE_2_PLUG, TYPE_2_SOCKET, TYPE_2_UNKNOWN,
};
use evmap_core::ChargeLocation;
use serde::{Deserialize, Serialize};

use crate::error::ChargepriceError;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargepriceChargepoint {
    pub power: f64,
    pub plug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargepriceStation {
    pub longitude: f64,
    pub latitude: f64,
    pub country: Option<String>,
    pub network: Option<String>,
    pub charge_points: Vec<ChargepriceChargepoint>,
}

impl ChargepriceStation {
    /// Station description for `charger`, limited to chargepoints whose plug
    /// is equivalent to one of `compatible_plugs`.
    ///
    /// # Errors
    ///
    /// Returns [`ChargepriceError::NoCompatibleChargepoints`] if no
    /// chargepoint remains.
    pub fn from_charger(
        charger: &ChargeLocation,
        compatible_plugs: &[&str],
    ) -> Result<Self, ChargepriceError> {
        let charge_points: Vec<ChargepriceChargepoint> = charger
            .chargepoints
            .iter()
            .filter(|cp| {
                equivalent_plug_types(&cp.plug_type)
                    .iter()
                    .any(|p| compatible_plugs.contains(p))
            })
            .map(|cp| ChargepriceChargepoint {
                power: cp.power.unwrap_or(0.0),
                plug: cp.plug_type.clone(),
            })
            .collect();

        if charge_points.is_empty() {
            return Err(ChargepriceError::NoCompatibleChargepoints);
        }

        Ok(Self {
            longitude: charger.coordinates.lng,
            latitude: charger.coordinates.lat,
            country: charger.country.clone(),
            network: charger.network.clone(),
            charge_points,
        })
    }
}

/// Charging scenario to price. Unset fields are omitted so the API applies
/// its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChargepriceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_monthly_fees: Option<f64>,
    /// kWh to charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    /// Minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    /// State of charge range in percent, e.g. `[20.0, 80.0]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_ac_phases: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Minutes after midnight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unbalanced_load: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_customer_tariffs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_price_unavailable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargepriceRequest {
    pub data_adapter: String,
    pub station: ChargepriceStation,
    pub options: ChargepriceOptions,
    pub vehicle_id: Option<String>,
    /// Restrict results to these tariffs; empty means all.
    pub tariff_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestDocument<'a> {
    data: RequestResource<'a>,
}

#[derive(Debug, Serialize)]
struct RequestResource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: RequestAttributes<'a>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    relationships: HashMap<&'static str, RelationshipObject>,
}

#[derive(Debug, Serialize)]
struct RequestAttributes<'a> {
    data_adapter: &'a str,
    station: &'a ChargepriceStation,
    options: &'a ChargepriceOptions,
}

impl ChargepriceRequest {
    pub(crate) fn to_document(&self) -> RequestDocument<'_> {
        let mut relationships = HashMap::new();
        if !self.tariff_ids.is_empty() {
            relationships.insert(
                "tariffs",
                RelationshipObject::new(Relationship::ToMany(
                    self.tariff_ids
                        .iter()
                        .map(|id| ResourceIdentifier::new("tariff", id))
                        .collect(),
                )),
            );
        }
        if let Some(vehicle_id) = &self.vehicle_id {
            relationships.insert(
                "vehicle",
                RelationshipObject::new(Relationship::ToOne(Some(ResourceIdentifier::new(
                    "car", vehicle_id,
                )))),
            );
        }

        RequestDocument {
            data: RequestResource {
                kind: "charge_price_request",
                attributes: RequestAttributes {
                    data_adapter: &self.data_adapter,
                    station: &self.station,
                    options: &self.options,
                },
                relationships,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// JSON:API plumbing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ResourceIdentifier {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

impl ResourceIdentifier {
    fn new(kind: &str, id: &str) -> Self {
        Self {
            kind: kind.to_owned(),
            id: id.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Relationship {
    ToMany(Vec<ResourceIdentifier>),
    ToOne(Option<ResourceIdentifier>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RelationshipObject {
    #[serde(default)]
    data: Option<Relationship>,
}

impl RelationshipObject {
    fn new(data: Relationship) -> Self {
        Self { data: Some(data) }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseDocument<T> {
    pub(crate) data: Vec<ResponseResource<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseResource<T> {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) attributes: T,
    #[serde(default)]
    pub(crate) relationships: HashMap<String, RelationshipObject>,
}

impl<T> ResponseResource<T> {
    /// Id of a to-one relationship, e.g. `tariff`.
    pub(crate) fn to_one_id(&self, name: &str) -> Option<String> {
        match self.relationships.get(name)?.data.as_ref()? {
            Relationship::ToOne(Some(identifier)) => Some(identifier.id.clone()),
            Relationship::ToOne(None) | Relationship::ToMany(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PriceDistribution {
    pub kwh: Option<f64>,
    pub session: Option<f64>,
    pub minute: Option<f64>,
}

impl PriceDistribution {
    /// `true` when the price is purely energy based.
    #[must_use]
    pub fn is_only_kwh(&self) -> bool {
        let zero = |v: Option<f64>| v.is_none_or(|v| v == 0.0);
        self.kwh.is_some_and(|k| k > 0.0) && zero(self.session) && zero(self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargepointPrice {
    pub power: f64,
    pub plug: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub price_distribution: PriceDistribution,
    /// Minutes after which a blocking fee applies.
    pub blocking_fee_start: Option<u32>,
    pub no_price_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargepriceTag {
    pub kind: String,
    pub text: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargePrice {
    pub provider: String,
    pub tariff_name: String,
    pub url: String,
    #[serde(default)]
    pub monthly_min_sales: f64,
    #[serde(default)]
    pub total_monthly_fee: f64,
    #[serde(default)]
    pub flat_rate: bool,
    #[serde(default)]
    pub direct_payment: bool,
    #[serde(default)]
    pub provider_customer_tariff: bool,
    pub currency: String,
    #[serde(default)]
    pub start_time: u32,
    #[serde(default)]
    pub tags: Vec<ChargepriceTag>,
    #[serde(rename = "charge_point_prices")]
    pub chargepoint_prices: Vec<ChargepointPrice>,
    /// From the `tariff` relationship, not the attributes.
    #[serde(skip)]
    pub tariff_id: Option<String>,
    /// JSON:API resource id.
    #[serde(skip)]
    pub id: Option<String>,
}

/// A vehicle from the `vehicles` catalogue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargepriceCar {
    /// JSON:API resource id, used as `vehicle_id` in price requests.
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub brand: String,
    /// Chargeprice port names such as `ccs` or `tesla_suc`.
    #[serde(default)]
    pub dc_charge_ports: Vec<String>,
    pub usable_battery_size: f64,
    pub ac_max_power: f64,
    pub dc_max_power: Option<f64>,
}

const AC_PLUGS: [&str; 7] = [
    CEE_BLAU,
    CEE_ROT,
    SCHUKO,
    TYPE_1,
    TYPE_2_UNKNOWN,
    TYPE_2_SOCKET,
    TYPE_2_PLUG,
];

impl ChargepriceCar {
    /// Plug types this car can charge from: its DC ports, then every AC plug.
    ///
    /// Unknown DC port names are ignored.
    #[must_use]
    pub fn compatible_plugs(&self) -> Vec<&'static str> {
        let mut plugs: Vec<&'static str> = Vec::new();
        for port in &self.dc_charge_ports {
            let plug = match port.as_str() {
                "ccs" | "tesla_ccs" => CCS_UNKNOWN,
                "tesla_suc" => SUPERCHARGER,
                "chademo" => CHADEMO,
                _ => continue,
            };
            if !plugs.contains(&plug) {
                plugs.push(plug);
            }
        }
        plugs.extend(AC_PLUGS);
        plugs
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargepriceTariff {
    #[serde(skip)]
    pub id: String,
    pub provider: String,
    pub name: String,
    #[serde(default)]
    pub direct_payment: bool,
    #[serde(default)]
    pub provider_customer_tariff: bool,
    #[serde(default)]
    pub supported_countries: Vec<String>,
    /// GoingElectric charge card id.
    pub charge_card_id: Option<String>,
}
