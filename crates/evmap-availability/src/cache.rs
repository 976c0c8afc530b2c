//! In-memory cache of charger → provider location resolutions.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingKey {
    pub provider: &'static str,
    pub data_source: String,
    pub charger_id: i64,
}

impl MappingKey {
    #[must_use]
    pub fn new(provider: &'static str, data_source: &str, charger_id: i64) -> Self {
        Self {
            provider,
            data_source: data_source.to_owned(),
            charger_id,
        }
    }
}

/// Provider location ids a charger resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMapping {
    pub provider_ids: Vec<String>,
    pub resolved_at: DateTime<Utc>,
}

/// Process-lifetime mapping cache, safe to share between concurrent lookups.
#[derive(Debug, Default)]
pub struct ProviderMappingCache {
    entries: DashMap<MappingKey, ProviderMapping>,
}

impl ProviderMappingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &MappingKey) -> Option<ProviderMapping> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn insert(&self, key: MappingKey, provider_ids: Vec<String>) {
        tracing::info!(
            provider = key.provider,
            charger_id = key.charger_id,
            ids = provider_ids.len(),
            "cached provider mapping"
        );
        self.entries.insert(
            key,
            ProviderMapping {
                provider_ids,
                resolved_at: Utc::now(),
            },
        );
    }

    /// Drop a mapping; returns whether one was present.
    pub fn invalidate(&self, key: &MappingKey) -> bool {
        self.entries.remove(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
