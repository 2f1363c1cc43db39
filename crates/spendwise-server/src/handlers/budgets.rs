//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{parse_date_param, read_json};
use crate::{ApiError, AppState, AuthUser, MessageResponse};
use spendwise_core::models::{Budget, BudgetPeriod, BudgetUpdate, Money, NewBudget};

/// Alert threshold applied when the caller does not set one
const DEFAULT_ALERT_THRESHOLD: f64 = 0.8;

/// Request body for creating a budget
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<i64>,
    pub alert_threshold: Option<f64>,
}

/// Request body for updating a budget; absent keys leave fields unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBudgetRequest {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub end_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub category_id: Option<Option<i64>>,
    pub is_active: Option<bool>,
    pub alert_threshold: Option<f64>,
}

#[derive(Serialize)]
pub struct BudgetListResponse {
    pub budgets: Vec<Budget>,
}

#[derive(Serialize)]
pub struct BudgetResponse {
    pub message: String,
    pub budget: Budget,
}

fn parse_period(value: &str) -> Result<BudgetPeriod, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation(&format!("Invalid period: {}", value)))
}

/// GET /api/v1/budgets - List the caller's budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BudgetListResponse>, ApiError> {
    let budgets = state.db.list_budgets(user_id)?;

    Ok(Json(BudgetListResponse { budgets }))
}

/// POST /api/v1/budgets - Create a budget
pub async fn create_budget(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<BudgetResponse>), ApiError> {
    let req: CreateBudgetRequest = read_json(request).await?;

    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let amount = req.amount.filter(|a| !a.is_zero());
    let period = req
        .period
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let (name, amount, period) = match (name, amount, period) {
        (Some(name), Some(amount), Some(period)) => (name, amount, period),
        _ => {
            return Err(ApiError::validation(
                "Name, amount and period are required",
            ))
        }
    };

    let period = parse_period(period)?;

    let start_date = match req.start_date.as_deref() {
        Some(v) => parse_date_param(v, "start_date")?,
        None => Utc::now().date_naive(),
    };
    let end_date = req
        .end_date
        .as_deref()
        .map(|v| parse_date_param(v, "end_date"))
        .transpose()?;

    // Verify the category exists before linking to it
    if let Some(category_id) = req.category_id {
        state
            .db
            .get_category(category_id)?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
    }

    let new_budget = NewBudget {
        name: name.to_string(),
        amount,
        period,
        start_date,
        end_date,
        category_id: req.category_id,
        alert_threshold: req.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
    };

    let id = state.db.insert_budget(user_id, &new_budget)?;
    let budget = state
        .db
        .get_budget(id, user_id)?
        .ok_or_else(|| ApiError::internal("Budget not found after creation"))?;

    Ok((
        StatusCode::CREATED,
        Json(BudgetResponse {
            message: "Budget created successfully".to_string(),
            budget,
        }),
    ))
}

/// PUT /api/v1/budgets/:id - Partially update a budget
pub async fn update_budget(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<BudgetResponse>, ApiError> {
    // Verify the budget exists and belongs to the caller
    state
        .db
        .get_budget(id, user_id)?
        .ok_or_else(|| ApiError::not_found("Budget not found"))?;

    let req: UpdateBudgetRequest = read_json(request).await?;

    let period = req.period.as_deref().map(parse_period).transpose()?;
    let start_date = req
        .start_date
        .as_deref()
        .map(|v| parse_date_param(v, "start_date"))
        .transpose()?;
    let end_date = match &req.end_date {
        Some(Some(v)) => Some(Some(parse_date_param(v, "end_date")?)),
        Some(None) => Some(None),
        None => None,
    };

    if let Some(Some(category_id)) = req.category_id {
        state
            .db
            .get_category(category_id)?
            .ok_or_else(|| ApiError::not_found("Category not found"))?;
    }

    let update = BudgetUpdate {
        name: req.name,
        amount: req.amount,
        period,
        start_date,
        end_date,
        category_id: req.category_id,
        is_active: req.is_active,
        alert_threshold: req.alert_threshold,
    };

    state.db.update_budget(id, user_id, &update)?;

    let budget = state
        .db
        .get_budget(id, user_id)?
        .ok_or_else(|| ApiError::internal("Budget not found after update"))?;

    Ok(Json(BudgetResponse {
        message: "Budget updated successfully".to_string(),
        budget,
    }))
}

/// DELETE /api/v1/budgets/:id - Delete a budget
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_budget(id, user_id)? {
        return Err(ApiError::not_found("Budget not found"));
    }

    Ok(Json(MessageResponse {
        message: "Budget deleted successfully".to_string(),
    }))
}
