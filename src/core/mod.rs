mod arbitrage;
mod roster;
mod scale;
mod tax;
mod types;

pub use arbitrage::{ArbitrageSettings, derive_adjusted_roster};
pub use roster::{build_roster, check_savings_invariant};
pub use scale::{
    RosterFilter, SavingsBounds, relative_ratio, savings_bounds, top_city, visible_cities,
};
pub use tax::{Jurisdiction, net_salary, tax_breakdown};
pub use types::{
    AVERAGE_ROLE_KEY, ArbitrageMode, CityRecord, CitySeed, Experience, Role, RoleAmounts,
    RoleKey, RoleKeyParseError, TaxBreakdownItem, amount_for,
};
