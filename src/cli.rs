use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use crate::api::{AppState, load_json_file, run_http_server};
use crate::core::{
    AVERAGE_ROLE_KEY, ArbitrageMode, ArbitrageSettings, CityRecord, CitySeed, RoleKey,
    build_roster, check_savings_invariant, derive_adjusted_roster, net_salary, tax_breakdown,
};
use crate::error::{ApiError, ApiResult, validate_amount};
use crate::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "netpay",
    about = "Net salary and composite savings across European tech hubs"
)]
pub struct Cli {
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(long, help = "City roster JSON shared by GET /api/cities")]
        roster: Option<PathBuf>,
    },
    /// Print monthly net salary and the deduction breakdown.
    Net {
        #[arg(long, help = "Monthly gross salary in EUR")]
        gross: f64,
        #[arg(long)]
        city: String,
    },
    /// Build a roster from gross-salary seeds and print it as JSON.
    Build {
        #[arg(long)]
        seeds: PathBuf,
    },
    /// Print the composite-savings roster as JSON.
    Adjust {
        #[arg(long)]
        roster: PathBuf,
        #[arg(long, default_value = AVERAGE_ROLE_KEY)]
        role_key: String,
        #[arg(long, help = "Anchor city; nomad mode is on only when set")]
        anchor: Option<String>,
        #[arg(long, value_enum, default_value_t = CliArbitrageMode::Work)]
        mode: CliArbitrageMode,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliArbitrageMode {
    Work,
    Home,
}

impl From<CliArbitrageMode> for ArbitrageMode {
    fn from(value: CliArbitrageMode) -> Self {
        match value {
            CliArbitrageMode::Work => ArbitrageMode::Work,
            CliArbitrageMode::Home => ArbitrageMode::Home,
        }
    }
}

pub async fn run(command: Command) -> ApiResult<()> {
    match command {
        Command::Serve { port, roster } => {
            let roster = match roster {
                Some(path) => {
                    let cities: Vec<CityRecord> = load_json_file(&path)?;
                    info!(path = %path.display(), cities = cities.len(), "loaded roster");
                    for city in &cities {
                        if let Some(key) = check_savings_invariant(city) {
                            warn!(
                                city = %city.name,
                                role_key = key,
                                "savings differ from net - rent - living"
                            );
                        }
                    }
                    cities
                }
                None => Vec::new(),
            };
            run_http_server(port, AppState::new(roster))
                .await
                .map_err(ApiError::Server)
        }
        Command::Net { gross, city } => {
            print!("{}", render_net(gross, &city)?);
            Ok(())
        }
        Command::Build { seeds } => {
            let seeds: Vec<CitySeed> = load_json_file(&seeds)?;
            println!("{}", serde_json::to_string_pretty(&build_roster(&seeds))?);
            Ok(())
        }
        Command::Adjust {
            roster,
            role_key,
            anchor,
            mode,
        } => {
            let role_key = role_key.parse::<RoleKey>()?.to_string();
            let roster: Vec<CityRecord> = load_json_file(&roster)?;
            let settings = ArbitrageSettings::new(
                anchor.is_some(),
                mode.into(),
                anchor.unwrap_or_default(),
            );
            let adjusted = derive_adjusted_roster(&roster, &role_key, &settings);
            println!("{}", serde_json::to_string_pretty(&adjusted)?);
            Ok(())
        }
    }
}

fn render_net(gross: f64, city: &str) -> ApiResult<String> {
    let gross = validate_amount("--gross", gross)?;
    let mut out = format!(
        "{city}: gross EUR {gross:.0}/mo -> net EUR {}/mo\n",
        net_salary(gross, city)
    );
    for item in tax_breakdown(gross, city) {
        out.push_str(&format!("  {:<28} EUR {}\n", item.label, item.amount));
    }
    Ok(out)
}
