use evmap_core::plug::{CCS_TYPE_2, CHADEMO, TYPE_2_SOCKET, TYPE_2_UNKNOWN};
use evmap_core::Coordinate;

use super::*;

fn conn(id: &str, power: f64, plug: &str) -> ProviderConnector {
    ProviderConnector::new(id, power, plug)
}

fn ids_for<'a>(matches: &'a [ChargepointMatch], cp: &Chargepoint) -> Vec<&'a str> {
    matches
        .iter()
        .find(|m| &m.chargepoint == cp)
        .map(|m| m.connector_ids.iter().map(String::as_str).collect())
        .unwrap_or_default()
}

fn charger(chargepoints: Vec<Chargepoint>) -> ChargeLocation {
    ChargeLocation {
        id: 1,
        data_source: "goingelectric".to_owned(),
        name: "Test".to_owned(),
        coordinates: Coordinate::new(50.0, 7.0),
        network: Some("NewMotion".to_owned()),
        operator: None,
        country: Some("Deutschland".to_owned()),
        chargepoints,
    }
}

#[test]
fn single_charger_matches_exactly() {
    let cps = vec![Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 2)];
    let matches = match_chargepoints(
        &[conn("0", 22.0, TYPE_2_UNKNOWN), conn("1", 22.0, TYPE_2_UNKNOWN)],
        &cps,
    )
    .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(ids_for(&matches, &cps[0]), vec!["0", "1"]);
}

#[test]
fn single_charger_tolerates_different_reported_power() {
    let cps = vec![Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 2)];
    let matches = match_chargepoints(
        &[conn("0", 27.0, TYPE_2_UNKNOWN), conn("1", 27.0, TYPE_2_UNKNOWN)],
        &cps,
    )
    .unwrap();
    assert_eq!(ids_for(&matches, &cps[0]), vec!["0", "1"]);
}

#[test]
fn extra_provider_plug_is_a_mismatch() {
    let cps = vec![Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 2)];
    let result = match_chargepoints(
        &[
            conn("0", 27.0, TYPE_2_UNKNOWN),
            conn("1", 27.0, TYPE_2_UNKNOWN),
            conn("2", 50.0, CCS_TYPE_2),
        ],
        &cps,
    );
    assert!(result.is_err());
}

#[test]
fn count_mismatch_is_rejected() {
    let cps = vec![Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 3)];
    let result = match_chargepoints(
        &[conn("0", 22.0, TYPE_2_UNKNOWN), conn("1", 22.0, TYPE_2_UNKNOWN)],
        &cps,
    );
    assert!(result.unwrap_err().0.contains("charger has 3"));
}

#[test]
fn complex_site_is_matched_by_power_rank() {
    let cps = vec![
        Chargepoint::new(TYPE_2_UNKNOWN, Some(43.0), 1),
        Chargepoint::new(CCS_TYPE_2, Some(50.0), 1),
        Chargepoint::new(CHADEMO, Some(50.0), 2),
        Chargepoint::new(CCS_TYPE_2, Some(160.0), 1),
        Chargepoint::new(CCS_TYPE_2, Some(320.0), 2),
    ];
    let connectors = [
        conn("0", 50.0, CHADEMO),
        conn("1", 200.0, CCS_TYPE_2),
        conn("2", 80.0, CCS_TYPE_2),
        conn("3", 200.0, CCS_TYPE_2),
        conn("4", 50.0, CCS_TYPE_2),
        conn("5", 50.0, CHADEMO),
        conn("6", 43.0, TYPE_2_UNKNOWN),
    ];
    let matches = match_chargepoints(&connectors, &cps).unwrap();

    assert_eq!(matches.len(), 5);
    assert_eq!(ids_for(&matches, &cps[0]), vec!["6"]);
    assert_eq!(ids_for(&matches, &cps[1]), vec!["4"]);
    assert_eq!(ids_for(&matches, &cps[2]), vec!["0", "5"]);
    assert_eq!(ids_for(&matches, &cps[3]), vec!["2"]);
    assert_eq!(ids_for(&matches, &cps[4]), vec!["1", "3"]);
}

#[test]
fn load_balanced_dual_charger_splits_ids_ascending() {
    let cps = vec![
        Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 1),
        Chargepoint::new(TYPE_2_UNKNOWN, Some(11.0), 1),
    ];
    let matches = match_chargepoints(
        &[conn("0", 27.0, TYPE_2_UNKNOWN), conn("1", 27.0, TYPE_2_UNKNOWN)],
        &cps,
    )
    .unwrap();
    assert_eq!(ids_for(&matches, &cps[1]), vec!["0"]);
    assert_eq!(ids_for(&matches, &cps[0]), vec!["1"]);
}

#[test]
fn two_load_balanced_dual_chargers() {
    let cps = vec![
        Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 2),
        Chargepoint::new(TYPE_2_UNKNOWN, Some(11.0), 2),
    ];
    let connectors: Vec<_> = (0..4)
        .map(|i| conn(&i.to_string(), 27.0, TYPE_2_UNKNOWN))
        .collect();
    let matches = match_chargepoints(&connectors, &cps).unwrap();
    assert_eq!(ids_for(&matches, &cps[1]), vec!["0", "1"]);
    assert_eq!(ids_for(&matches, &cps[0]), vec!["2", "3"]);
}

#[test]
fn schuko_is_dropped_when_provider_omits_it() {
    let cps = vec![
        Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 2),
        Chargepoint::new(SCHUKO, Some(3.7), 2),
    ];
    let matches = match_chargepoints(
        &[conn("a", 22.0, TYPE_2_UNKNOWN), conn("b", 22.0, TYPE_2_UNKNOWN)],
        &cps,
    )
    .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(ids_for(&matches, &cps[0]), vec!["a", "b"]);
}

#[test]
fn equivalent_plug_names_match() {
    let cps = vec![Chargepoint::new(TYPE_2_SOCKET, Some(11.0), 1)];
    let matches = match_chargepoints(&[conn("x", 11.0, TYPE_2_UNKNOWN)], &cps).unwrap();
    assert_eq!(ids_for(&matches, &cps[0]), vec!["x"]);
}

#[test]
fn align_follows_original_order_and_splits_duplicates() {
    let location = charger(vec![
        Chargepoint::new(SCHUKO, Some(3.7), 1),
        Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 1),
        Chargepoint::new(TYPE_2_UNKNOWN, Some(22.0), 1),
    ]);
    let merged = location.merged_chargepoints();
    let matches =
        match_chargepoints(&[conn("a", 22.0, TYPE_2_UNKNOWN), conn("b", 22.0, TYPE_2_UNKNOWN)], &merged)
            .unwrap();

    let states: HashMap<String, ConnectorState> = [
        (
            "a".to_owned(),
            ConnectorState {
                status: ChargepointStatus::Available,
                evse_id: Some("E-A".to_owned()),
            },
        ),
        (
            "b".to_owned(),
            ConnectorState {
                status: ChargepointStatus::Occupied,
                evse_id: Some("E-B".to_owned()),
            },
        ),
    ]
    .into_iter()
    .collect();

    let aligned = align_to_chargepoints(&location, &matches, &states);
    assert_eq!(aligned.len(), 3);
    assert_eq!(aligned[0].chargepoint.plug_type, SCHUKO);
    assert_eq!(aligned[0].statuses, vec![ChargepointStatus::Unknown]);
    assert_eq!(aligned[0].evse_ids, vec![None]);
    assert_eq!(aligned[1].statuses, vec![ChargepointStatus::Available]);
    assert_eq!(aligned[1].evse_ids, vec![Some("E-A".to_owned())]);
    assert_eq!(aligned[2].statuses, vec![ChargepointStatus::Occupied]);
}
