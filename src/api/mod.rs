use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    AVERAGE_ROLE_KEY, ArbitrageMode, ArbitrageSettings, CityRecord, CitySeed, RoleKey,
    RosterFilter, SavingsBounds, TaxBreakdownItem, amount_for, build_roster,
    derive_adjusted_roster, net_salary, relative_ratio, savings_bounds, tax_breakdown, top_city,
    visible_cities,
};
use crate::error::{ApiError, ApiResult, validate_amount};

/// Base roster shared read-only by every request.
#[derive(Clone, Default)]
pub struct AppState {
    roster: Arc<[CityRecord]>,
}

impl AppState {
    pub fn new(roster: Vec<CityRecord>) -> Self {
        Self {
            roster: roster.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NetSalaryPayload {
    gross: Option<f64>,
    city: Option<String>,
}

#[derive(Debug, PartialEq)]
struct NetSalaryRequest {
    gross: f64,
    city: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NetSalaryResponse {
    city: String,
    jurisdiction: &'static str,
    gross_monthly: f64,
    net_monthly: u64,
    breakdown: Vec<TaxBreakdownItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CitiesQuery {
    role_key: Option<String>,
    nomad_mode: Option<bool>,
    mode: Option<ArbitrageMode>,
    anchor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AdjustPayload {
    roster: Vec<CityRecord>,
    role_key: Option<String>,
    nomad_mode: Option<bool>,
    mode: Option<ArbitrageMode>,
    anchor: Option<String>,
    filter: RosterFilter,
}

#[derive(Debug, PartialEq)]
struct AdjustRequest {
    role_key: String,
    settings: ArbitrageSettings,
    filter: RosterFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RosterResponse {
    role_key: String,
    nomad_mode: bool,
    mode: ArbitrageMode,
    anchor: Option<String>,
    visible_count: usize,
    bounds: SavingsBounds,
    top_city: Option<String>,
    cities: Vec<CityRecord>,
    /// Each city's position on the visible savings scale, aligned with `cities`.
    ratios: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let city_count = state.roster.len();
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, cities = city_count, "netpay HTTP API listening");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/net-salary",
            get(net_salary_get_handler).post(net_salary_post_handler),
        )
        .route("/api/cities", get(cities_handler))
        .route("/api/roster/adjust", post(adjust_handler))
        .route("/api/roster/build", post(build_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

async fn not_found_handler() -> Response {
    json_response(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: "Not found".to_string(),
        },
    )
}

async fn net_salary_get_handler(
    query: Result<Query<NetSalaryPayload>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(payload)) => net_salary_handler_impl(payload),
        Err(rejection) => error_response(ApiError::MalformedPayload(rejection.body_text())),
    }
}

async fn net_salary_post_handler(
    body: Result<Json<NetSalaryPayload>, JsonRejection>,
) -> Response {
    match body {
        Ok(Json(payload)) => net_salary_handler_impl(payload),
        Err(rejection) => error_response(ApiError::MalformedPayload(rejection.body_text())),
    }
}

fn net_salary_handler_impl(payload: NetSalaryPayload) -> Response {
    let request = match net_salary_request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return error_response(err),
    };
    debug!(city = %request.city, gross = request.gross, "net salary request");
    json_response(StatusCode::OK, build_net_salary_response(request))
}

async fn cities_handler(
    State(state): State<AppState>,
    query: Result<Query<CitiesQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return error_response(ApiError::MalformedPayload(rejection.body_text()));
        }
    };
    let payload = AdjustPayload {
        roster: Vec::new(),
        role_key: query.role_key,
        nomad_mode: query.nomad_mode,
        mode: query.mode,
        anchor: query.anchor,
        filter: RosterFilter::default(),
    };
    let request = match adjust_request_from_payload(&payload) {
        Ok(request) => request,
        Err(err) => return error_response(err),
    };
    log_roster_request("base", &request);
    json_response(StatusCode::OK, build_roster_response(&state.roster, request))
}

async fn adjust_handler(body: Result<Json<AdjustPayload>, JsonRejection>) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return error_response(ApiError::MalformedPayload(rejection.body_text()));
        }
    };
    let request = match adjust_request_from_payload(&payload) {
        Ok(request) => request,
        Err(err) => return error_response(err),
    };
    log_roster_request("posted", &request);
    json_response(StatusCode::OK, build_roster_response(&payload.roster, request))
}

fn log_roster_request(source: &'static str, request: &AdjustRequest) {
    debug!(
        source,
        role_key = %request.role_key,
        nomad_mode = request.settings.nomad_mode,
        mode = ?request.settings.mode,
        anchor = %request.settings.anchor,
        "roster request"
    );
}

async fn build_handler(body: Result<Json<Vec<CitySeed>>, JsonRejection>) -> Response {
    let seeds = match body {
        Ok(Json(seeds)) => seeds,
        Err(rejection) => {
            return error_response(ApiError::MalformedPayload(rejection.body_text()));
        }
    };
    debug!(seeds = seeds.len(), "building roster");
    json_response(StatusCode::OK, build_roster(&seeds))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(err: ApiError) -> Response {
    warn!(error = %err, "rejected request");
    json_response(
        err.status(),
        ErrorResponse {
            error: err.to_string(),
        },
    )
}

fn net_salary_request_from_payload(payload: NetSalaryPayload) -> ApiResult<NetSalaryRequest> {
    let gross = payload.gross.ok_or(ApiError::MissingParameter("gross"))?;
    let gross = validate_amount("gross", gross)?;
    let city = payload
        .city
        .filter(|c| !c.trim().is_empty())
        .ok_or(ApiError::MissingParameter("city"))?;
    Ok(NetSalaryRequest { gross, city })
}

fn build_net_salary_response(request: NetSalaryRequest) -> NetSalaryResponse {
    NetSalaryResponse {
        jurisdiction: crate::core::Jurisdiction::for_city(&request.city).as_str(),
        gross_monthly: request.gross,
        net_monthly: net_salary(request.gross, &request.city),
        breakdown: tax_breakdown(request.gross, &request.city),
        city: request.city,
    }
}

fn adjust_request_from_payload(payload: &AdjustPayload) -> ApiResult<AdjustRequest> {
    let role_key = match payload.role_key.as_deref() {
        None | Some("") => AVERAGE_ROLE_KEY.to_string(),
        Some(raw) => raw.parse::<RoleKey>()?.to_string(),
    };
    for (field, bound) in [
        ("filter.minSunshine", payload.filter.min_sunshine),
        ("filter.minRent", payload.filter.min_rent),
        ("filter.maxRent", payload.filter.max_rent),
        ("filter.minLiving", payload.filter.min_living),
        ("filter.maxLiving", payload.filter.max_living),
    ] {
        if let Some(value) = bound {
            validate_amount(field, value)?;
        }
    }
    Ok(AdjustRequest {
        role_key,
        settings: ArbitrageSettings::new(
            payload.nomad_mode.unwrap_or(false),
            payload.mode.unwrap_or_default(),
            payload.anchor.clone().unwrap_or_default(),
        ),
        filter: payload.filter.clone(),
    })
}

fn build_roster_response(roster: &[CityRecord], request: AdjustRequest) -> RosterResponse {
    let AdjustRequest {
        role_key,
        settings,
        filter,
    } = request;

    let cities = derive_adjusted_roster(roster, &role_key, &settings);
    let visible = visible_cities(
        &cities,
        &filter,
        &role_key,
        settings.nomad_mode,
        settings.mode,
    );
    let bounds = savings_bounds(visible.iter().copied(), &role_key);
    let ratios = cities
        .iter()
        .map(|c| relative_ratio(amount_for(&c.savings, &role_key), bounds, visible.len()))
        .collect();
    let anchor = cities
        .iter()
        .find(|c| c.is_arbitrage_base)
        .map(|c| c.name.clone());

    RosterResponse {
        visible_count: visible.len(),
        top_city: top_city(&cities, &role_key).map(|c| c.name.clone()),
        nomad_mode: settings.nomad_mode,
        mode: settings.mode,
        anchor,
        bounds,
        cities,
        ratios,
        role_key,
    }
}

/// Reads a JSON file (roster or seeds) for the CLI and server start-up.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> ApiResult<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ApiError::Json {
        path: path.to_path_buf(),
        source,
    })
}
