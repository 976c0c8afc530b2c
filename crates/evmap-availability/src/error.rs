use thiserror::Error;

/// Why a provider could not be reached or answered unsuccessfully.
#[derive(Debug, Error)]
pub enum RemoteCause {
    #[error("{0}")]
    Http(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// Errors returned by availability lookups.
///
/// Every variant except the configuration errors (`InvalidBaseUrl`,
/// `ClientBuild`) is a per-lookup failure that callers surface as "no
/// availability data" for that charger.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// No configured detector recognizes the charger's network.
    #[error("no availability detector supports network {network:?}")]
    NotSupported { network: Option<String> },

    /// Network failure, timeout or non-2xx response from the provider.
    #[error("{provider} unavailable at {url}: {cause}")]
    RemoteUnavailable {
        provider: String,
        url: String,
        #[source]
        cause: RemoteCause,
    },

    /// The provider answered with a payload that does not have the expected shape.
    #[error("{provider} returned an unparseable payload for {context}: {reason}")]
    Parse {
        provider: String,
        context: String,
        reason: String,
    },

    /// The charger could not be resolved to exactly one provider location.
    #[error("{provider} location match is ambiguous: {reason}")]
    AmbiguousMatch { provider: String, reason: String },

    /// The provider's connectors cannot be mapped onto the charger's chargepoints.
    #[error("{provider} connectors do not match the charger: {reason}")]
    ConnectorMismatch { provider: String, reason: String },

    #[error("availability lookup was cancelled")]
    Cancelled,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl AvailabilityError {
    /// `true` for failures scoped to a single lookup; `false` for
    /// misconfiguration that will affect every lookup.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AvailabilityError::InvalidBaseUrl { .. } | AvailabilityError::ClientBuild(_)
        )
    }

    pub(crate) fn parse(provider: &str, context: impl Into<String>, reason: impl ToString) -> Self {
        AvailabilityError::Parse {
            provider: provider.to_owned(),
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn ambiguous(provider: &str, reason: impl Into<String>) -> Self {
        AvailabilityError::AmbiguousMatch {
            provider: provider.to_owned(),
            reason: reason.into(),
        }
    }
}
