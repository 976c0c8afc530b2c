//! Ordered detector list and the lookup entry points.

use std::sync::Arc;
use std::time::Duration;

use evmap_core::{ChargeLocation, DetectorsFile};
use futures::future::join_all;

use crate::cache::ProviderMappingCache;
use crate::cancel::CancelSignal;
use crate::detector::Detector;
use crate::error::{AvailabilityError, RemoteCause};
use crate::http::{build_client, HttpSettings};
use crate::model::AvailabilityResult;

/// Per-call limits for a lookup.
#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    /// Upper bound for the whole lookup, including every provider request.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancelSignal>,
}

impl LookupOptions {
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancel: None,
        }
    }

    #[must_use]
    pub fn cancellable(mut self, signal: CancelSignal) -> Self {
        self.cancel = Some(signal);
        self
    }
}

/// Detectors in priority order. The first one that supports a charger
/// handles it; there is no fallback to later entries.
#[derive(Debug)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

impl DetectorRegistry {
    #[must_use]
    pub fn new(detectors: Vec<Detector>) -> Self {
        Self { detectors }
    }

    /// Build every detector in `file`, sharing one HTTP client and `cache`.
    ///
    /// # Errors
    ///
    /// Returns [`AvailabilityError::ClientBuild`] or
    /// [`AvailabilityError::InvalidBaseUrl`] on misconfiguration.
    pub fn from_config(
        file: &DetectorsFile,
        settings: &HttpSettings,
        cache: Arc<ProviderMappingCache>,
    ) -> Result<Self, AvailabilityError> {
        let client = build_client(settings)?;
        let detectors = file
            .detectors
            .iter()
            .map(|config| Detector::from_config(config, client.clone(), Arc::clone(&cache)))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(detectors = detectors.len(), "availability detectors configured");
        Ok(Self::new(detectors))
    }

    #[must_use]
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// The detector responsible for `charger`, if any. Pure.
    #[must_use]
    pub fn select(&self, charger: &ChargeLocation) -> Option<&Detector> {
        self.detectors
            .iter()
            .find(|d| d.is_charger_supported(charger))
    }

    /// Live availability for `charger` from its responsible provider.
    ///
    /// # Errors
    ///
    /// - [`AvailabilityError::NotSupported`] if no detector handles the charger.
    /// - [`AvailabilityError::RemoteUnavailable`] with [`RemoteCause::Timeout`]
    ///   when `options.timeout` elapses.
    /// - [`AvailabilityError::Cancelled`] when `options.cancel` fires.
    /// - Any error from the selected detector.
    pub async fn get_availability(
        &self,
        charger: &ChargeLocation,
        options: &LookupOptions,
    ) -> Result<AvailabilityResult, AvailabilityError> {
        let Some(detector) = self.select(charger) else {
            tracing::debug!(charger_id = charger.id, "no availability detector for charger");
            return Err(AvailabilityError::NotSupported {
                network: charger.network_or_operator().map(str::to_owned),
            });
        };
        tracing::debug!(
            charger_id = charger.id,
            provider = detector.name(),
            "availability detector selected"
        );

        let lookup = async {
            match options.timeout {
                Some(limit) => tokio::time::timeout(limit, detector.get_availability(charger))
                    .await
                    .map_err(|_| AvailabilityError::RemoteUnavailable {
                        provider: detector.name().to_owned(),
                        url: detector.base_url().to_owned(),
                        cause: RemoteCause::Timeout,
                    })?,
                None => detector.get_availability(charger).await,
            }
        };

        let result = match &options.cancel {
            Some(signal) => {
                tokio::select! {
                    biased;
                    () = signal.cancelled() => Err(AvailabilityError::Cancelled),
                    result = lookup => result,
                }
            }
            None => lookup.await,
        };

        if let Err(e) = &result {
            tracing::warn!(
                charger_id = charger.id,
                provider = detector.name(),
                error = %e,
                "availability lookup failed"
            );
        }
        result
    }

    /// Independent concurrent lookups; results are in input order.
    pub async fn get_availability_many(
        &self,
        chargers: &[ChargeLocation],
        options: &LookupOptions,
    ) -> Vec<Result<AvailabilityResult, AvailabilityError>> {
        join_all(
            chargers
                .iter()
                .map(|charger| self.get_availability(charger, options)),
        )
        .await
    }
}
