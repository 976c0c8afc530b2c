use thiserror::Error;

/// Errors returned by the Chargeprice API client.
#[derive(Debug, Error)]
pub enum ChargepriceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Chargeprice has no data adapter for this charger database.
    #[error("data source '{0}' is not supported by Chargeprice")]
    UnsupportedDataSource(String),

    /// None of the charger's chargepoints fit the vehicle's plugs.
    #[error("charger has no chargepoints compatible with the selected plugs")]
    NoCompatibleChargepoints,
}
