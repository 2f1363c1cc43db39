//! Savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_date_param, read_json};
use crate::{ApiError, AppState, AuthUser, MessageResponse};
use spendwise_core::models::{Goal, GoalPriority, GoalUpdate, Money, NewGoal};

/// Request body for creating a goal
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    pub target_date: Option<String>,
    /// Free-text label, not a category id
    pub category: Option<String>,
    pub priority: Option<String>,
}

/// Request body for updating a goal; absent keys leave fields unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub target_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub category: Option<Option<String>>,
    pub priority: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Serialize)]
pub struct GoalListResponse {
    pub goals: Vec<Goal>,
}

#[derive(Serialize)]
pub struct GoalResponse {
    pub message: String,
    pub goal: Goal,
}

fn parse_priority(value: &str) -> Result<GoalPriority, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation(&format!("Invalid priority: {}", value)))
}

/// GET /api/v1/goals - List the caller's goals
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<GoalListResponse>, ApiError> {
    let goals = state.db.list_goals(user_id)?;

    Ok(Json(GoalListResponse { goals }))
}

/// POST /api/v1/goals - Create a goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<GoalResponse>), ApiError> {
    let req: CreateGoalRequest = read_json(request).await?;

    let title = req
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let target_amount = req.target_amount.filter(|a| !a.is_zero());

    let (title, target_amount) = match (title, target_amount) {
        (Some(title), Some(target_amount)) => (title, target_amount),
        _ => {
            return Err(ApiError::validation(
                "Title and target amount are required",
            ))
        }
    };

    let priority = match req.priority.as_deref() {
        Some(v) => parse_priority(v)?,
        None => GoalPriority::default(),
    };
    let target_date = req
        .target_date
        .as_deref()
        .map(|v| parse_date_param(v, "target_date"))
        .transpose()?;

    let new_goal = NewGoal {
        title: title.to_string(),
        description: req.description,
        target_amount,
        current_amount: req.current_amount.unwrap_or(Money::ZERO),
        target_date,
        category: req.category,
        priority,
    };

    let id = state.db.insert_goal(user_id, &new_goal)?;
    let goal = state
        .db
        .get_goal(id, user_id)?
        .ok_or_else(|| ApiError::internal("Goal not found after creation"))?;

    Ok((
        StatusCode::CREATED,
        Json(GoalResponse {
            message: "Goal created successfully".to_string(),
            goal,
        }),
    ))
}

/// PUT /api/v1/goals/:id - Partially update a goal
pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<GoalResponse>, ApiError> {
    // Verify the goal exists and belongs to the caller
    state
        .db
        .get_goal(id, user_id)?
        .ok_or_else(|| ApiError::not_found("Goal not found"))?;

    let req: UpdateGoalRequest = read_json(request).await?;

    let priority = req.priority.as_deref().map(parse_priority).transpose()?;
    let target_date = match &req.target_date {
        Some(Some(v)) => Some(Some(parse_date_param(v, "target_date")?)),
        Some(None) => Some(None),
        None => None,
    };

    let update = GoalUpdate {
        title: req.title,
        description: req.description,
        target_amount: req.target_amount,
        current_amount: req.current_amount,
        target_date,
        category: req.category,
        priority,
        is_completed: req.is_completed,
    };

    state.db.update_goal(id, user_id, &update)?;

    let goal = state
        .db
        .get_goal(id, user_id)?
        .ok_or_else(|| ApiError::internal("Goal not found after update"))?;

    Ok(Json(GoalResponse {
        message: "Goal updated successfully".to_string(),
        goal,
    }))
}

/// DELETE /api/v1/goals/:id - Delete a goal
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_goal(id, user_id)? {
        return Err(ApiError::not_found("Goal not found"));
    }

    Ok(Json(MessageResponse {
        message: "Goal deleted successfully".to_string(),
    }))
}
