//! Visible-subset filtering and the relative savings scale the map colours by.

use serde::{Deserialize, Serialize};

use super::types::{ArbitrageMode, CityRecord, amount_for};

/// Optional inclusive bounds; `None` leaves a dimension unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RosterFilter {
    pub min_net: Option<f64>,
    pub max_net: Option<f64>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
    pub min_living: Option<f64>,
    pub max_living: Option<f64>,
    pub min_savings: Option<f64>,
    pub max_savings: Option<f64>,
    pub min_sunshine: Option<f64>,
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

impl RosterFilter {
    pub fn matches(
        &self,
        city: &CityRecord,
        role_key: &str,
        nomad_mode: bool,
        mode: ArbitrageMode,
    ) -> bool {
        // Sunshine only matters for the city you live in.
        let sunshine_active = nomad_mode && mode == ArbitrageMode::Work;
        within(
            amount_for(&city.salary_net, role_key),
            self.min_net,
            self.max_net,
        ) && within(city.rent, self.min_rent, self.max_rent)
            && within(city.living, self.min_living, self.max_living)
            && within(
                amount_for(&city.savings, role_key),
                self.min_savings,
                self.max_savings,
            )
            && (!sunshine_active || within(city.sunshine, self.min_sunshine, None))
    }
}

pub fn visible_cities<'a>(
    roster: &'a [CityRecord],
    filter: &RosterFilter,
    role_key: &str,
    nomad_mode: bool,
    mode: ArbitrageMode,
) -> Vec<&'a CityRecord> {
    roster
        .iter()
        .filter(|c| filter.matches(c, role_key, nomad_mode, mode))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SavingsBounds {
    pub min: f64,
    pub max: f64,
}

/// Savings range over `cities`; `(0, 0)` when there are none.
pub fn savings_bounds<'a, I>(cities: I, role_key: &str) -> SavingsBounds
where
    I: IntoIterator<Item = &'a CityRecord>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for city in cities {
        let saved = amount_for(&city.savings, role_key);
        min = min.min(saved);
        max = max.max(saved);
    }
    if min.is_infinite() {
        return SavingsBounds::default();
    }
    SavingsBounds { min, max }
}

/// Position of `savings` within `bounds`, in `[0, 1]`.
pub fn relative_ratio(savings: f64, bounds: SavingsBounds, visible_count: usize) -> f64 {
    let range = bounds.max - bounds.min;
    if range > 0.0 {
        ((savings - bounds.min) / range).clamp(0.0, 1.0)
    } else if visible_count == 1 {
        1.0
    } else {
        0.5
    }
}

/// City with the highest savings for `role_key`; earlier entries win ties.
pub fn top_city<'a>(roster: &'a [CityRecord], role_key: &str) -> Option<&'a CityRecord> {
    let mut best: Option<&CityRecord> = None;
    for city in roster {
        let better = best.is_none_or(|b| {
            amount_for(&city.savings, role_key) > amount_for(&b.savings, role_key)
        });
        if better {
            best = Some(city);
        }
    }
    best
}
