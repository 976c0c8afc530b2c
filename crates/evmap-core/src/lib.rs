pub mod app_config;
pub mod charger;
pub mod config;
pub mod detectors;
pub mod geo;
pub mod pagination;
pub mod plug;
pub mod telemetry;

pub use app_config::{AppConfig, Environment};
pub use charger::{normalize_operator_name, ChargeLocation, Chargepoint, Coordinate};
pub use config::{load_app_config, load_app_config_from_env};
pub use detectors::{
    load_detectors, parse_detectors, DetectorConfig, DetectorKind, DetectorsFile,
    MatchTolerance,
};
pub use geo::{haversine_distance_meters, BoundingBox};
pub use pagination::{paginate, paginate_slices, PaginationError};
pub use plug::equivalent_plug_types;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read detectors file {path}: {source}")]
    DetectorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse detectors file: {0}")]
    DetectorsFileParse(#[from] serde_yaml::Error),

    #[error("invalid detector entry #{index}: {reason}")]
    InvalidDetector { index: usize, reason: String },
}
