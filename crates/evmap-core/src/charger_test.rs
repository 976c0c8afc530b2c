use super::*;
use crate::plug;

fn location(chargepoints: Vec<Chargepoint>) -> ChargeLocation {
    ChargeLocation {
        id: 2105,
        data_source: "goingelectric".to_owned(),
        name: "Stadtwerke Schleswig".to_owned(),
        coordinates: Coordinate::new(54.5116, 9.57108),
        network: Some("NewMotion".to_owned()),
        operator: None,
        country: Some("Deutschland".to_owned()),
        chargepoints,
    }
}

#[test]
fn merged_chargepoints_sums_identical_variants() {
    let loc = location(vec![
        Chargepoint::new(plug::TYPE_2_UNKNOWN, Some(22.0), 1),
        Chargepoint::new(plug::CCS_TYPE_2, Some(50.0), 1),
        Chargepoint::new(plug::TYPE_2_UNKNOWN, Some(22.0), 2),
    ]);
    let merged = loc.merged_chargepoints();
    assert_eq!(
        merged,
        vec![
            Chargepoint::new(plug::TYPE_2_UNKNOWN, Some(22.0), 3),
            Chargepoint::new(plug::CCS_TYPE_2, Some(50.0), 1),
        ]
    );
}

#[test]
fn merged_chargepoints_keeps_different_powers_apart() {
    let loc = location(vec![
        Chargepoint::new(plug::TYPE_2_UNKNOWN, Some(22.0), 1),
        Chargepoint::new(plug::TYPE_2_UNKNOWN, Some(11.0), 1),
        Chargepoint::new(plug::TYPE_2_UNKNOWN, None, 1),
    ]);
    assert_eq!(loc.merged_chargepoints().len(), 3);
}

#[test]
fn total_chargepoints_counts_instances() {
    let loc = location(vec![
        Chargepoint::new(plug::TYPE_2_UNKNOWN, Some(22.0), 2),
        Chargepoint::new(plug::CHADEMO, Some(50.0), 1),
    ]);
    assert_eq!(loc.total_chargepoints(), 3);
}

#[test]
fn max_power_respects_plug_filter() {
    let loc = location(vec![
        Chargepoint::new(plug::TYPE_2_SOCKET, Some(22.0), 2),
        Chargepoint::new(plug::CCS_TYPE_2, Some(150.0), 1),
        Chargepoint::new(plug::SCHUKO, None, 1),
    ]);
    assert_eq!(loc.max_power(None), Some(150.0));
    assert_eq!(loc.max_power(Some(&[plug::TYPE_2_UNKNOWN])), Some(22.0));
    assert_eq!(loc.max_power(Some(&[plug::SCHUKO])), None);
}

#[test]
fn network_or_operator_falls_back() {
    let mut loc = location(vec![]);
    assert_eq!(loc.network_or_operator(), Some("NewMotion"));
    loc.network = Some("   ".to_owned());
    loc.operator = Some("RheinEnergie".to_owned());
    assert_eq!(loc.network_or_operator(), Some("RheinEnergie"));
    loc.operator = None;
    assert_eq!(loc.network_or_operator(), None);
}

#[test]
fn normalize_operator_name_trims_collapses_and_lowercases() {
    assert_eq!(normalize_operator_name("  Shell   Recharge "), "shell recharge");
    assert_eq!(normalize_operator_name("NEWMOTION"), "newmotion");
    assert_eq!(normalize_operator_name(""), "");
}

#[test]
fn charge_location_deserializes_from_json() {
    let json = serde_json::json!({
        "id": 18284,
        "data_source": "openchargemap",
        "name": "Parkhaus",
        "coordinates": { "lat": 54.476699, "lng": 9.544284 },
        "network": null,
        "operator": "Stadtwerke",
        "country": "DE",
        "chargepoints": [
            { "plug_type": "CCS Type 2", "power": 50.0, "count": 1 }
        ]
    });
    let loc: ChargeLocation = serde_json::from_value(json).unwrap();
    assert_eq!(loc.id, 18284);
    assert_eq!(loc.chargepoints[0].plug_type, plug::CCS_TYPE_2);
    assert_eq!(loc.network_or_operator(), Some("Stadtwerke"));
}
