//! Errors raised at the crate's edges (HTTP payloads, CLI arguments, roster files).
//!
//! The tax engine and composite model never fail; only input handling does.

use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

use crate::core::RoleKeyParseError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("{field} must be a finite, non-negative amount (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("malformed request: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    InvalidRoleKey(#[from] RoleKeyParseError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Server(std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParameter(_)
            | ApiError::MalformedPayload(_)
            | ApiError::InvalidAmount { .. }
            | ApiError::InvalidRoleKey(_) => StatusCode::BAD_REQUEST,
            ApiError::Io { .. }
            | ApiError::Json { .. }
            | ApiError::Encode(_)
            | ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Rejects NaN, infinities and negative amounts before they reach the engine.
pub fn validate_amount(field: &'static str, value: f64) -> ApiResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ApiError::InvalidAmount { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_amount_rejects_negative_and_non_finite() {
        assert_eq!(validate_amount("gross", 4_000.0).expect("valid"), 4_000.0);
        assert_eq!(validate_amount("gross", 0.0).expect("zero is allowed"), 0.0);
        for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = validate_amount("gross", bad).expect_err("must reject");
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert!(err.to_string().starts_with("gross must be"));
        }
    }

    #[test]
    fn role_key_errors_display_the_offending_key() {
        let err: ApiError = "pilot_senior"
            .parse::<crate::core::RoleKey>()
            .map_err(ApiError::from)
            .expect_err("unknown role");
        assert_eq!(err.to_string(), "unknown role key 'pilot_senior'");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_payloads_are_client_errors() {
        let err = ApiError::MalformedPayload("expected a number".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "malformed request: expected a number");
    }

    #[test]
    fn file_errors_are_server_side() {
        let err = ApiError::Io {
            path: PathBuf::from("cities.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "failed to read cities.json: missing");
    }
}
