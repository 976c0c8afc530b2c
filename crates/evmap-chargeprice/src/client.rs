//! HTTP client for the Chargeprice tariff comparison API.

use std::time::Duration;

use evmap_core::ChargeLocation;
use reqwest::{Client, Url};

use crate::error::ChargepriceError;
use serde::de::DeserializeOwned;

use crate::types::{
    ChargePrice, ChargepriceCar, ChargepriceRequest, ChargepriceTariff, ResponseDocument,
    ResponseResource,
};

const DEFAULT_BASE_URL: &str = "https://api.chargeprice.app/v1/";
const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// Languages Chargeprice localises tariff names and tags into.
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["de", "en", "fr", "nl"];

const GOINGELECTRIC_COUNTRIES: &[&str] = &[
    "Deutschland",
    "Österreich",
    "Schweiz",
    "Frankreich",
    "Belgien",
    "Niederlande",
    "Luxemburg",
    "Dänemark",
    "Norwegen",
    "Schweden",
    "Slowenien",
    "Kroatien",
    "Ungarn",
    "Tschechien",
    "Italien",
    "Spanien",
    "Großbritannien",
    "Irland",
];

const OPENCHARGEMAP_COUNTRIES: &[&str] = &[
    "DE", "AT", "CH", "FR", "BE", "NE", "LU", "DK", "NO", "SE", "SI", "HR", "HU", "CZ", "IT", "ES",
    "GB", "IE",
];

/// Chargeprice data adapter name for a charger database.
///
/// # Errors
///
/// Returns [`ChargepriceError::UnsupportedDataSource`] for anything other
/// than `goingelectric` and `openchargemap`.
pub fn data_adapter_for(data_source: &str) -> Result<&'static str, ChargepriceError> {
    match data_source {
        "goingelectric" => Ok("going_electric"),
        "openchargemap" => Ok("open_charge_map"),
        other => Err(ChargepriceError::UnsupportedDataSource(other.to_owned())),
    }
}

/// Whether Chargeprice covers chargers in `country` as spelled by `data_source`.
#[must_use]
pub fn is_country_supported(country: &str, data_source: &str) -> bool {
    match data_source {
        "goingelectric" => GOINGELECTRIC_COUNTRIES.contains(&country),
        "openchargemap" => OPENCHARGEMAP_COUNTRIES.contains(&country),
        _ => false,
    }
}

/// Map a locale such as `de-DE` or `fr_CH` to a supported language, `en` otherwise.
#[must_use]
pub fn chargeprice_language(locale: &str) -> &'static str {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    SUPPORTED_LANGUAGES
        .iter()
        .copied()
        .find(|l| *l == language)
        .unwrap_or("en")
}

/// Link to the charger on chargeprice.app.
///
/// # Errors
///
/// Returns [`ChargepriceError::UnsupportedDataSource`] if the charger's data
/// source has no Chargeprice adapter.
pub fn poi_url(charger: &ChargeLocation) -> Result<String, ChargepriceError> {
    let adapter = data_adapter_for(&charger.data_source)?;
    Ok(format!(
        "https://www.chargeprice.app/?poi_id={}&poi_source={adapter}",
        charger.id
    ))
}

/// Client for the Chargeprice REST API.
///
/// Use [`ChargepriceClient::new`] for production or
/// [`ChargepriceClient::with_base_url`] to point at a mock server in tests.
pub struct ChargepriceClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for ChargepriceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChargepriceClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl ChargepriceClient {
    /// Creates a new client pointed at the production Chargeprice API.
    ///
    /// # Errors
    ///
    /// Returns [`ChargepriceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ChargepriceError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ChargepriceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ChargepriceError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ChargepriceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("evmap/0.1 (chargeprice)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ChargepriceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Prices every tariff for the charging scenario in `request`.
    ///
    /// `language` is sent as `Accept-Language`; see [`chargeprice_language`].
    /// The body is a JSON:API document; the explicit content type takes
    /// precedence over the `application/json` that `.json()` would set.
    ///
    /// # Errors
    ///
    /// - [`ChargepriceError::NoCompatibleChargepoints`] if the request's
    ///   station has no chargepoints.
    /// - [`ChargepriceError::Http`] on network failure.
    /// - [`ChargepriceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ChargepriceError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn get_charge_prices(
        &self,
        request: &ChargepriceRequest,
        language: &str,
    ) -> Result<Vec<ChargePrice>, ChargepriceError> {
        if request.station.charge_points.is_empty() {
            return Err(ChargepriceError::NoCompatibleChargepoints);
        }

        let url = self.endpoint("charge_prices")?;

        tracing::debug!(%url, adapter = %request.data_adapter, "requesting charge prices");
        let response = self
            .client
            .post(url.clone())
            .header("API-Key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, JSON_API_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT, JSON_API_CONTENT_TYPE)
            .header(reqwest::header::ACCEPT_LANGUAGE, language)
            .json(&request.to_document())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "chargeprice request failed");
            return Err(ChargepriceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let document: ResponseDocument<ChargePrice> =
            serde_json::from_str(&text).map_err(|e| ChargepriceError::Deserialize {
                context: "charge_prices".to_string(),
                source: e,
            })?;

        Ok(document
            .data
            .into_iter()
            .map(|resource| {
                let tariff_id = resource.to_one_id("tariff");
                ChargePrice {
                    tariff_id,
                    id: resource.id,
                    ..resource.attributes
                }
            })
            .collect())
    }

    /// Vehicle catalogue, used to pick `vehicle_id` and compatible plugs.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_tariffs`].
    pub async fn get_vehicles(&self) -> Result<Vec<ChargepriceCar>, ChargepriceError> {
        self.get_collection::<ChargepriceCar>("vehicles")
            .await?
            .into_iter()
            .map(|resource| {
                let id = resource_id(resource.id, "vehicles")?;
                Ok(ChargepriceCar {
                    id,
                    ..resource.attributes
                })
            })
            .collect()
    }

    /// All tariffs Chargeprice knows, for restricting `tariff_ids`.
    ///
    /// # Errors
    ///
    /// - [`ChargepriceError::Http`] on network failure.
    /// - [`ChargepriceError::UnexpectedStatus`] on a non-2xx status.
    /// - [`ChargepriceError::Deserialize`] on an unexpected shape or a
    ///   resource without an id.
    pub async fn get_tariffs(&self) -> Result<Vec<ChargepriceTariff>, ChargepriceError> {
        self.get_collection::<ChargepriceTariff>("tariffs")
            .await?
            .into_iter()
            .map(|resource| {
                let id = resource_id(resource.id, "tariffs")?;
                Ok(ChargepriceTariff {
                    id,
                    ..resource.attributes
                })
            })
            .collect()
    }

    async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<ResponseResource<T>>, ChargepriceError> {
        let url = self.endpoint(path)?;

        tracing::debug!(%url, "requesting chargeprice collection");
        let response = self
            .client
            .get(url.clone())
            .header("API-Key", &self.api_key)
            .header(reqwest::header::ACCEPT, JSON_API_CONTENT_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "chargeprice request failed");
            return Err(ChargepriceError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        let document: ResponseDocument<T> =
            serde_json::from_str(&text).map_err(|e| ChargepriceError::Deserialize {
                context: path.to_string(),
                source: e,
            })?;
        Ok(document.data)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ChargepriceError> {
        self.base_url
            .join(path)
            .map_err(|e| ChargepriceError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }
}

fn resource_id(id: Option<String>, context: &str) -> Result<String, ChargepriceError> {
    id.ok_or_else(|| ChargepriceError::Deserialize {
        context: context.to_string(),
        source: <serde_json::Error as serde::de::Error>::missing_field("id"),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
