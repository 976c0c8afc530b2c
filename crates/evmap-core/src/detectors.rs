//! Ordered availability-detector configuration (`detectors.yaml`).
//!
//! The position of an entry in the file is its priority: for a given charger
//! the first entry whose operator list matches wins.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    NewMotion,
    Chargecloud,
    EnBw,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorKind::NewMotion => write!(f, "newmotion"),
            DetectorKind::Chargecloud => write!(f, "chargecloud"),
            DetectorKind::EnBw => write!(f, "enbw"),
        }
    }
}

/// How strictly provider markers must agree with a charger's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTolerance {
    /// Half-width in degrees of the marker search box.
    pub search_range_deg: f64,
    /// Markers further away than this are not candidates at all.
    pub max_distance_m: f64,
    /// Markers this close to the nearest candidate belong to the same site.
    pub cluster_distance_m: f64,
    /// Another site within this margin of the nearest distance makes the
    /// match ambiguous.
    pub ambiguity_margin_m: f64,
}

impl Default for MatchTolerance {
    fn default() -> Self {
        Self {
            search_range_deg: 0.1,
            max_distance_m: 150.0,
            cluster_distance_m: 15.0,
            ambiguity_margin_m: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub kind: DetectorKind,
    /// Network/operator names this detector is responsible for.
    pub operators: Vec<String>,
    /// Overrides the provider's public API base URL.
    pub base_url: Option<String>,
    /// Chargecloud tenant id (required for `chargecloud`).
    pub operator_id: Option<String>,
    /// Subscription key (required for `enbw`).
    pub api_key: Option<String>,
    #[serde(default, rename = "match")]
    pub tolerance: MatchTolerance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorsFile {
    pub detectors: Vec<DetectorConfig>,
}

/// Load and validate the detector list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_detectors(path: &Path) -> Result<DetectorsFile, ConfigError> {
    tracing::debug!(path = %path.display(), "loading detectors file");
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DetectorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_detectors(&content)
}

/// Parse and validate detector YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_detectors(yaml: &str) -> Result<DetectorsFile, ConfigError> {
    let file: DetectorsFile = serde_yaml::from_str(yaml)?;
    if let Err(e) = validate_detectors(&file) {
        tracing::warn!(error = %e, "rejecting detector configuration");
        return Err(e);
    }
    for (priority, detector) in file.detectors.iter().enumerate() {
        tracing::debug!(
            priority,
            kind = %detector.kind,
            operators = ?detector.operators,
            "detector configured"
        );
    }
    Ok(file)
}

fn validate_detectors(file: &DetectorsFile) -> Result<(), ConfigError> {
    for (index, detector) in file.detectors.iter().enumerate() {
        let invalid = |reason: String| ConfigError::InvalidDetector { index, reason };

        if detector.operators.is_empty()
            || detector.operators.iter().any(|op| op.trim().is_empty())
        {
            return Err(invalid(format!(
                "{} detector needs at least one non-empty operator name",
                detector.kind
            )));
        }

        if detector.kind == DetectorKind::Chargecloud
            && detector
                .operator_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err(invalid("chargecloud detector requires operator_id".to_string()));
        }

        if detector.kind == DetectorKind::EnBw
            && detector
                .api_key
                .as_deref()
                .is_none_or(|key| key.trim().is_empty())
        {
            return Err(invalid("enbw detector requires api_key".to_string()));
        }

        let t = &detector.tolerance;
        let all_positive = [
            t.search_range_deg,
            t.max_distance_m,
            t.cluster_distance_m,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0);
        if !all_positive || !t.ambiguity_margin_m.is_finite() || t.ambiguity_margin_m < 0.0 {
            return Err(invalid(
                "match tolerances must be positive (ambiguity_margin_m may be 0)".to_string(),
            ));
        }
        if t.cluster_distance_m > t.max_distance_m {
            return Err(invalid(
                "cluster_distance_m must not exceed max_distance_m".to_string(),
            ));
        }
    }
    Ok(())
}
