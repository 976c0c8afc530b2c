//! Chargeprice tariff comparison for a charger and a vehicle.

pub mod client;
pub mod error;
pub mod types;

pub use client::{
    chargeprice_language, data_adapter_for, is_country_supported, poi_url, ChargepriceClient,
    SUPPORTED_LANGUAGES,
};
pub use error::ChargepriceError;
pub use types::{
    ChargePrice, ChargepointPrice, ChargepriceCar, ChargepriceChargepoint, ChargepriceOptions,
    ChargepriceRequest, ChargepriceStation, ChargepriceTag, ChargepriceTariff, PriceDistribution,
};
