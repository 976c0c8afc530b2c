//! Normalized charge location records.

use serde::{Deserialize, Serialize};

use crate::plug::plugs_equivalent;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One plug/socket kind at a charge location, available `count` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chargepoint {
    /// One of the constants in [`crate::plug`].
    pub plug_type: String,
    /// Power in kW, if known.
    pub power: Option<f64>,
    pub count: u32,
}

impl Chargepoint {
    #[must_use]
    pub fn new(plug_type: &str, power: Option<f64>, count: u32) -> Self {
        Self {
            plug_type: plug_type.to_owned(),
            power,
            count,
        }
    }

    fn same_variant(&self, other: &Chargepoint) -> bool {
        self.plug_type == other.plug_type && self.power == other.power
    }
}

/// A charging site with one or more chargepoints.
///
/// `chargepoints` order is the connector order every availability result is
/// aligned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLocation {
    pub id: i64,
    /// Directory the record came from, e.g. `"goingelectric"` or `"openchargemap"`.
    pub data_source: String,
    pub name: String,
    pub coordinates: Coordinate,
    /// Charging network (mobility service provider).
    pub network: Option<String>,
    /// Charge point operator.
    pub operator: Option<String>,
    pub country: Option<String>,
    pub chargepoints: Vec<Chargepoint>,
}

impl ChargeLocation {
    /// Merges chargepoints that share plug type and power.
    ///
    /// Some directories list e.g. Type 2 sockets and cables separately even
    /// though providers cannot tell them apart. First-occurrence order is kept.
    #[must_use]
    pub fn merged_chargepoints(&self) -> Vec<Chargepoint> {
        let mut merged: Vec<Chargepoint> = Vec::new();
        for cp in &self.chargepoints {
            if let Some(existing) = merged.iter_mut().find(|m| m.same_variant(cp)) {
                existing.count += cp.count;
            } else {
                merged.push(cp.clone());
            }
        }
        merged
    }

    #[must_use]
    pub fn total_chargepoints(&self) -> u32 {
        self.chargepoints.iter().map(|cp| cp.count).sum()
    }

    /// Highest known power, optionally restricted to plugs equivalent to one
    /// of `plugs`.
    #[must_use]
    pub fn max_power(&self, plugs: Option<&[&str]>) -> Option<f64> {
        self.chargepoints
            .iter()
            .filter(|cp| {
                plugs.is_none_or(|wanted| {
                    wanted.iter().any(|p| plugs_equivalent(p, &cp.plug_type))
                })
            })
            .filter_map(|cp| cp.power)
            .reduce(f64::max)
    }

    /// Network name used for provider recognition, falling back to the operator.
    #[must_use]
    pub fn network_or_operator(&self) -> Option<&str> {
        self.network
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.operator.as_deref())
            .filter(|n| !n.trim().is_empty())
    }
}

/// Canonical form of an operator or network name: trimmed, internal
/// whitespace collapsed to single spaces, lowercased.
#[must_use]
pub fn normalize_operator_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
#[path = "charger_test.rs"]
mod tests;
