use tracing::trace;

use super::types::{ArbitrageMode, CityRecord, amount_for};

/// Nomad-mode selection, owned by the caller and passed in on every derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArbitrageSettings {
    pub nomad_mode: bool,
    pub mode: ArbitrageMode,
    /// Exact, case-sensitive city name; empty means no anchor.
    pub anchor: String,
}

impl ArbitrageSettings {
    pub fn new(nomad_mode: bool, mode: ArbitrageMode, anchor: impl Into<String>) -> Self {
        Self {
            nomad_mode,
            mode,
            anchor: anchor.into(),
        }
    }
}

/// Rebuilds the roster with composite savings for `role_key`.
///
/// Returns fresh records in input order. When nomad mode is off, the anchor is
/// empty, or it names no city, every record is passed through with
/// `is_arbitrage_base = false`.
pub fn derive_adjusted_roster(
    roster: &[CityRecord],
    role_key: &str,
    settings: &ArbitrageSettings,
) -> Vec<CityRecord> {
    let anchor = if settings.nomad_mode && !settings.anchor.is_empty() {
        roster.iter().find(|c| c.name == settings.anchor)
    } else {
        None
    };

    let Some(anchor) = anchor else {
        if settings.nomad_mode && !settings.anchor.is_empty() {
            trace!(anchor = %settings.anchor, "anchor not in roster, passing through");
        }
        return roster.iter().map(pass_through).collect();
    };

    roster
        .iter()
        .map(|candidate| composite(candidate, anchor, role_key, settings.mode))
        .collect()
}

fn pass_through(city: &CityRecord) -> CityRecord {
    CityRecord {
        is_arbitrage_base: false,
        ..city.clone()
    }
}

fn composite(
    candidate: &CityRecord,
    anchor: &CityRecord,
    role_key: &str,
    mode: ArbitrageMode,
) -> CityRecord {
    let mut adjusted = candidate.clone();
    adjusted.is_arbitrage_base = candidate.name == anchor.name;

    let composite_savings = match mode {
        ArbitrageMode::Work => {
            amount_for(&anchor.salary_net, role_key) - candidate.rent - candidate.living
        }
        ArbitrageMode::Home => {
            adjusted.rent = anchor.rent;
            adjusted.living = anchor.living;
            amount_for(&candidate.salary_net, role_key) - anchor.rent - anchor.living
        }
    };
    adjusted.savings.insert(role_key.to_string(), composite_savings);
    adjusted
}
