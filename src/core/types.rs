use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel role key for the per-city average across every role/level combination.
pub const AVERAGE_ROLE_KEY: &str = "average_average";

/// Monthly EUR amounts keyed by role key (`"<role>_<experience>"`).
pub type RoleAmounts = BTreeMap<String, f64>;

/// Reads a role-keyed amount; absent keys count as zero.
pub fn amount_for(amounts: &RoleAmounts, role_key: &str) -> f64 {
    amounts.get(role_key).copied().unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    pub name: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub salary_gross: RoleAmounts,
    #[serde(default)]
    pub salary_net: RoleAmounts,
    #[serde(default)]
    pub savings: RoleAmounts,
    pub rent: f64,
    pub living: f64,
    #[serde(default)]
    pub sunshine: f64,
    #[serde(default)]
    pub is_arbitrage_base: bool,
}

/// Raw city input before the tax engine has filled in net salaries and savings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySeed {
    pub name: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    pub rent: f64,
    pub living: f64,
    #[serde(default)]
    pub sunshine: f64,
    #[serde(default)]
    pub salary_gross: RoleAmounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxBreakdownItem {
    pub label: &'static str,
    pub amount: u64,
}

/// Which side of the composite the anchor city supplies.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArbitrageMode {
    /// Earn the anchor's salary, pay each candidate's costs.
    #[default]
    Work,
    /// Earn each candidate's salary, pay the anchor's costs.
    Home,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Role {
    SoftwareEngineer,
    DataProfessional,
    ProductManager,
    Designer,
    Devops,
    Average,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SoftwareEngineer,
        Role::DataProfessional,
        Role::ProductManager,
        Role::Designer,
        Role::Devops,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "software_engineer",
            Role::DataProfessional => "data_professional",
            Role::ProductManager => "product_manager",
            Role::Designer => "designer",
            Role::Devops => "devops",
            Role::Average => "average",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Experience {
    Junior,
    Mid,
    Senior,
    Lead,
    Average,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::Junior,
        Experience::Mid,
        Experience::Senior,
        Experience::Lead,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Experience::Junior => "junior",
            Experience::Mid => "mid",
            Experience::Senior => "senior",
            Experience::Lead => "lead",
            Experience::Average => "average",
        }
    }
}

/// Typed form of the `"<role>_<experience>"` lookup key.
///
/// Roster maps stay keyed by plain strings; this type only validates and
/// renders keys at the edges. `Display` produces the same wire format the
/// roster maps use, so `key.to_string()` can index them directly.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RoleKey {
    pub role: Role,
    pub experience: Experience,
}

impl RoleKey {
    pub const AVERAGE: RoleKey = RoleKey {
        role: Role::Average,
        experience: Experience::Average,
    };

    pub fn new(role: Role, experience: Experience) -> Self {
        Self { role, experience }
    }
}

impl fmt::Display for RoleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.role.as_str(), self.experience.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role key '{0}'")]
pub struct RoleKeyParseError(pub String);

impl FromStr for RoleKey {
    type Err = RoleKeyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == AVERAGE_ROLE_KEY {
            return Ok(RoleKey::AVERAGE);
        }
        // Role names contain underscores themselves, so split on the last one.
        let (role_part, level_part) = raw
            .rsplit_once('_')
            .ok_or_else(|| RoleKeyParseError(raw.to_string()))?;
        let role = Role::ALL
            .into_iter()
            .find(|r| r.as_str() == role_part)
            .ok_or_else(|| RoleKeyParseError(raw.to_string()))?;
        let experience = Experience::ALL
            .into_iter()
            .find(|e| e.as_str() == level_part)
            .ok_or_else(|| RoleKeyParseError(raw.to_string()))?;
        Ok(RoleKey { role, experience })
    }
}
