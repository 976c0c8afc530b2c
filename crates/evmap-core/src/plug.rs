//! Plug type identifiers shared by every data source and provider adapter.
//!
//! Provider payloads use their own vocabularies (`Type2Combo`,
//! `IEC_62196_T2_COMBO`, `ccs`, ...); adapters translate them into these
//! constants before any matching takes place.

pub const TYPE_1: &str = "Type 1";
pub const TYPE_2_UNKNOWN: &str = "Type 2 (either plug or socket)";
pub const TYPE_2_SOCKET: &str = "Type 2 socket";
pub const TYPE_2_PLUG: &str = "Type 2 plug";
pub const TYPE_3: &str = "Type 3";
pub const CCS_TYPE_2: &str = "CCS Type 2";
pub const CCS_TYPE_1: &str = "CCS Type 1";
pub const CCS_UNKNOWN: &str = "CCS (either Type 1 or Type 2)";
pub const SCHUKO: &str = "Schuko";
pub const CHADEMO: &str = "CHAdeMO";
pub const SUPERCHARGER: &str = "Tesla Supercharger";
pub const CEE_BLAU: &str = "CEE Blau";
pub const CEE_ROT: &str = "CEE Rot";
pub const TESLA_ROADSTER_HPC: &str = "Tesla HPC";

/// Returns every plug type that may describe the same physical connector as
/// `plug_type`, including `plug_type` itself.
///
/// Data sources differ in how precisely they report Type 2 and CCS plugs: one
/// says "Type 2 socket" where another only knows "Type 2". The imprecise
/// variant is equivalent to each precise one, but two precise variants are not
/// equivalent to each other.
#[must_use]
pub fn equivalent_plug_types(plug_type: &str) -> Vec<&str> {
    match plug_type {
        TYPE_2_UNKNOWN => vec![TYPE_2_UNKNOWN, TYPE_2_SOCKET, TYPE_2_PLUG],
        TYPE_2_SOCKET => vec![TYPE_2_SOCKET, TYPE_2_UNKNOWN],
        TYPE_2_PLUG => vec![TYPE_2_PLUG, TYPE_2_UNKNOWN],
        CCS_UNKNOWN => vec![CCS_UNKNOWN, CCS_TYPE_1, CCS_TYPE_2],
        CCS_TYPE_1 => vec![CCS_TYPE_1, CCS_UNKNOWN],
        CCS_TYPE_2 => vec![CCS_TYPE_2, CCS_UNKNOWN],
        other => vec![other],
    }
}

/// `true` when `a` and `b` may describe the same connector.
#[must_use]
pub fn plugs_equivalent(a: &str, b: &str) -> bool {
    equivalent_plug_types(a).contains(&b)
}

/// DC plug types (used for fast-charger heuristics).
#[must_use]
pub fn is_dc(plug_type: &str) -> bool {
    matches!(
        plug_type,
        CCS_TYPE_1 | CCS_TYPE_2 | CCS_UNKNOWN | CHADEMO | SUPERCHARGER | TESLA_ROADSTER_HPC
    )
}
