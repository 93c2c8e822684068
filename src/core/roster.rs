use super::tax::net_salary;
use super::types::{AVERAGE_ROLE_KEY, CityRecord, CitySeed, RoleAmounts, amount_for};

const INVARIANT_TOLERANCE: f64 = 1e-6;

/// Runs every seed's gross salaries through the tax engine and derives the
/// savings map, adding the `average_average` entry when any role is present.
pub fn build_roster(seeds: &[CitySeed]) -> Vec<CityRecord> {
    seeds.iter().map(build_city).collect()
}

fn build_city(seed: &CitySeed) -> CityRecord {
    let mut salary_gross: RoleAmounts = seed
        .salary_gross
        .iter()
        .filter(|(key, _)| key.as_str() != AVERAGE_ROLE_KEY)
        .map(|(key, gross)| (key.clone(), *gross))
        .collect();

    if !salary_gross.is_empty() {
        let total: f64 = salary_gross.values().sum();
        let average_gross = (total / salary_gross.len() as f64).round();
        salary_gross.insert(AVERAGE_ROLE_KEY.to_string(), average_gross);
    }

    let mut salary_net = RoleAmounts::new();
    let mut savings = RoleAmounts::new();
    for (key, gross) in &salary_gross {
        let net = net_salary(*gross, &seed.name) as f64;
        salary_net.insert(key.clone(), net);
        savings.insert(key.clone(), net - seed.rent - seed.living);
    }

    CityRecord {
        name: seed.name.clone(),
        lat: seed.lat,
        lng: seed.lng,
        salary_gross,
        salary_net,
        savings,
        rent: seed.rent,
        living: seed.living,
        sunshine: seed.sunshine,
        is_arbitrage_base: false,
    }
}

/// First role key whose stored savings disagree with `net - rent - living`.
pub fn check_savings_invariant(city: &CityRecord) -> Option<&str> {
    city.savings
        .iter()
        .find(|(key, saved)| {
            let expected = amount_for(&city.salary_net, key) - city.rent - city.living;
            (*saved - expected).abs() > INVARIANT_TOLERANCE
        })
        .map(|(key, _)| key.as_str())
}
