//! HTTP request handlers
//!
//! One module per API resource. Handlers return `Result<_, ApiError>` so
//! every failure path produces the `{error: {code, message}}` envelope.

use axum::extract::Request;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::{ApiError, MAX_BODY_SIZE};

pub mod auth;
pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod goals;

// Re-export all handlers for use in router
pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use expenses::*;
pub use goals::*;

/// Read and deserialize a JSON request body
///
/// Any parse failure surfaces as `VALIDATION_ERROR`, never as a bare
/// framework rejection.
pub(crate) async fn read_json<T: DeserializeOwned>(request: Request) -> Result<T, ApiError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_SIZE)
        .await
        .map_err(|_| ApiError::validation("Invalid request body"))?;

    if bytes.is_empty() {
        return Err(ApiError::validation("Missing JSON body"));
    }

    serde_json::from_slice(&bytes).map_err(|_| ApiError::validation("Invalid request data"))
}

/// Parse a `YYYY-MM-DD` date parameter, naming the offending field on error
pub(crate) fn parse_date_param(value: &str, name: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(&format!("Invalid {} format (use YYYY-MM-DD)", name)))
}

/// Deserialize helper distinguishing an absent field from an explicit null
///
/// With `#[serde(default, deserialize_with = "double_option")]` a missing
/// key stays `None` while `"field": null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}
