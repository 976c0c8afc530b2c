//! Mapping of provider connectors onto a charger's chargepoints.
//!
//! Providers report individual connectors with their own power figures and
//! plug names; the charger lists grouped chargepoints. Matching is strict:
//! when the two views cannot be reconciled the lookup fails instead of
//! guessing.

use std::collections::{BTreeSet, HashMap};

use evmap_core::plug::{equivalent_plug_types, plugs_equivalent, SCHUKO};
use evmap_core::{ChargeLocation, Chargepoint};
use thiserror::Error;

use crate::model::{ChargepointStatus, ConnectorAvailability};

/// One connector as reported by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConnector {
    pub id: String,
    /// kW as computed from the provider's figures.
    pub power: f64,
    pub plug_type: String,
}

impl ProviderConnector {
    #[must_use]
    pub fn new(id: impl Into<String>, power: f64, plug_type: &str) -> Self {
        Self {
            id: id.into(),
            power,
            plug_type: plug_type.to_owned(),
        }
    }
}

/// Provider connector ids assigned to one (merged) chargepoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargepointMatch {
    pub chargepoint: Chargepoint,
    pub connector_ids: Vec<String>,
}

/// Live state of a single provider connector.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorState {
    pub status: ChargepointStatus,
    pub evse_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("chargepoints do not match: {0}")]
pub struct MatchError(pub String);

/// Assign provider connector ids to `chargepoints`.
///
/// `chargepoints` should be merged (one entry per plug/power variant). The
/// returned matches are ordered by provider plug type, then ascending power.
///
/// # Errors
///
/// Returns [`MatchError`] when plug sets, power groups or counts disagree.
pub fn match_chargepoints(
    connectors: &[ProviderConnector],
    chargepoints: &[Chargepoint],
) -> Result<Vec<ChargepointMatch>, MatchError> {
    let provider_types = distinct(connectors.iter().map(|c| c.plug_type.as_str()));
    let mut charger_types: BTreeSet<&str> =
        chargepoints.iter().map(|cp| cp.plug_type.as_str()).collect();
    let mut cpts: Vec<&Chargepoint> = chargepoints.iter().collect();

    if !plug_sets_match(&provider_types, &charger_types)
        && charger_types.len() > 1
        && charger_types.contains(SCHUKO)
    {
        // Providers often omit the household sockets of mixed chargers.
        charger_types.remove(SCHUKO);
        cpts.retain(|cp| cp.plug_type != SCHUKO);
    }
    if !plug_sets_match(&provider_types, &charger_types) {
        return Err(MatchError(format!(
            "provider plugs {provider_types:?} vs charger plugs {charger_types:?}"
        )));
    }

    let mut matches = Vec::new();
    for plug in provider_types {
        let of_type: Vec<&ProviderConnector> =
            connectors.iter().filter(|c| c.plug_type == plug).collect();
        let powers = sorted_distinct(of_type.iter().map(|c| c.power));
        let candidates: Vec<&Chargepoint> = cpts
            .iter()
            .copied()
            .filter(|cp| plugs_equivalent(&cp.plug_type, plug))
            .collect();
        let charger_powers = sorted_distinct(candidates.iter().filter_map(|cp| cp.power));

        let chargepoint_at = |power: f64| {
            candidates
                .iter()
                .copied()
                .find(|cp| cp.power == Some(power))
                .ok_or_else(|| MatchError(format!("no {plug} chargepoint at {power} kW")))
        };

        if powers.len() == charger_powers.len() {
            for (charger_power, provider_power) in charger_powers.iter().zip(&powers) {
                let chargepoint = chargepoint_at(*charger_power)?;
                let ids: Vec<String> = of_type
                    .iter()
                    .filter(|c| c.power == *provider_power)
                    .map(|c| c.id.clone())
                    .collect();
                if ids.len() != chargepoint.count as usize {
                    return Err(MatchError(format!(
                        "{plug} at {charger_power} kW: charger has {} chargepoints, provider {}",
                        chargepoint.count,
                        ids.len()
                    )));
                }
                matches.push(ChargepointMatch {
                    chargepoint: chargepoint.clone(),
                    connector_ids: ids,
                });
            }
        } else if powers.len() == 1
            && charger_powers.len() == 2
            && candidates.iter().map(|cp| cp.count as usize).sum::<usize>() == of_type.len()
        {
            // Load-balanced dual chargers: one provider power, two charger powers.
            let mut ids = of_type.iter().map(|c| c.id.clone());
            for charger_power in &charger_powers {
                let chargepoint = chargepoint_at(*charger_power)?;
                let taken: Vec<String> = ids.by_ref().take(chargepoint.count as usize).collect();
                matches.push(ChargepointMatch {
                    chargepoint: chargepoint.clone(),
                    connector_ids: taken,
                });
            }
        } else {
            return Err(MatchError(format!(
                "{plug}: provider powers {powers:?} vs charger powers {charger_powers:?}"
            )));
        }
    }
    Ok(matches)
}

/// Expand merged matches into one [`ConnectorAvailability`] per original
/// chargepoint of `charger`, in the charger's own order.
///
/// Chargepoints without provider data (e.g. dropped Schuko sockets) report
/// [`ChargepointStatus::Unknown`].
#[must_use]
pub fn align_to_chargepoints(
    charger: &ChargeLocation,
    matches: &[ChargepointMatch],
    states: &HashMap<String, ConnectorState>,
) -> Vec<ConnectorAvailability> {
    let mut cursors = vec![0usize; matches.len()];

    charger
        .chargepoints
        .iter()
        .map(|cp| {
            let count = cp.count as usize;
            let found = matches.iter().position(|m| {
                m.chargepoint.plug_type == cp.plug_type && m.chargepoint.power == cp.power
            });

            let ids: Vec<Option<&String>> = match found {
                Some(index) => {
                    let start = cursors[index];
                    cursors[index] += count;
                    (start..start + count)
                        .map(|i| matches[index].connector_ids.get(i))
                        .collect()
                }
                None => vec![None; count],
            };

            let (statuses, evse_ids) = ids
                .into_iter()
                .map(|id| match id.and_then(|id| states.get(id)) {
                    Some(state) => (state.status, state.evse_id.clone()),
                    None => (ChargepointStatus::Unknown, None),
                })
                .unzip();

            ConnectorAvailability {
                chargepoint: cp.clone(),
                statuses,
                evse_ids,
            }
        })
        .collect()
}

fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn sorted_distinct(items: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = items.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Whether some choice of equivalent plug per provider type yields exactly
/// the charger's plug set.
fn plug_sets_match(provider_types: &[&str], charger_types: &BTreeSet<&str>) -> bool {
    fn pick<'a>(
        remaining: &[&'a str],
        chosen: &mut BTreeSet<&'a str>,
        target: &BTreeSet<&'a str>,
    ) -> bool {
        let Some((first, rest)) = remaining.split_first() else {
            return chosen == target;
        };
        equivalent_plug_types(*first).into_iter().any(|option| {
            if !target.contains(option) {
                return false;
            }
            let inserted = chosen.insert(option);
            let found = pick(rest, chosen, target);
            if inserted {
                chosen.remove(option);
            }
            found
        })
    }

    pick(provider_types, &mut BTreeSet::new(), charger_types)
}

#[cfg(test)]
#[path = "matching_test.rs"]
mod tests;
