//! Live charger availability from provider APIs.
//!
//! A [`DetectorRegistry`] holds the configured providers in priority order.
//! For each charger the first provider whose operator list matches the
//! charger's network is asked for a snapshot; its connectors are mapped onto
//! the charger's own chargepoints and returned as an [`AvailabilityResult`].

pub mod cache;
pub mod cancel;
pub mod detector;
pub mod error;
pub mod fronyx;
pub mod http;
pub mod matching;
pub mod model;
pub mod registry;

pub use cache::{MappingKey, ProviderMapping, ProviderMappingCache};
pub use cancel::CancelSignal;
pub use detector::{
    ChargecloudDetector, Detector, EnBwDetector, NewMotionDetector, OperatorFilter,
};
pub use error::{AvailabilityError, RemoteCause};
pub use fronyx::{
    is_chargepoint_supported, prediction_graph, FronyxClient, FronyxEvseIdResponse,
    FronyxPrediction, FronyxStatus,
};
pub use http::{build_client, HttpSettings, ProviderHttp};
pub use matching::{align_to_chargepoints, match_chargepoints, ProviderConnector};
pub use model::{AvailabilityResult, ChargepointStatus, ConnectorAvailability};
pub use registry::{DetectorRegistry, LookupOptions};
