//! Expense handlers: filtered listing with summary, CRUD, auto-categorization

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{parse_date_param, read_json};
use crate::{ApiError, AppState, AuthUser, MessageResponse, MAX_PAGE_LIMIT};
use spendwise_core::db::ExpenseFilter;
use spendwise_core::models::{CategorySuggestion, Expense, ExpenseUpdate, Money, NewExpense};
use spendwise_core::suggest_category;

/// Default page size for expense listing
const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Query parameters for listing expenses
///
/// Numeric parameters arrive as strings and are parsed leniently: a
/// malformed page, limit, or category id falls back to its default
/// instead of rejecting the request. Malformed dates are a caller error.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// Totals reported alongside a listing
#[derive(Serialize)]
pub struct ExpenseSummary {
    pub total_amount: Money,
    pub count: i64,
}

#[derive(Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub pagination: Pagination,
    pub summary: ExpenseSummary,
}

/// Request body for creating an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: Option<Money>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub transaction_date: Option<String>,
    pub payment_method: Option<String>,
    pub vendor_name: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Request body for updating an expense; absent keys leave fields unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<Money>,
    pub currency: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub subcategory_id: Option<Option<i64>>,
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub payment_method: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub vendor_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct CreateExpenseResponse {
    pub message: String,
    pub expense: Expense,
    /// Categorizer output; null when the caller picked a category
    pub ai_suggestion: Option<CategorySuggestion>,
}

#[derive(Serialize)]
pub struct UpdateExpenseResponse {
    pub message: String,
    pub expense: Expense,
}

/// GET /api/v1/expenses - List expenses with filters, pagination, and summary
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<ExpenseListResponse>, ApiError> {
    // Input validation: clamp pagination parameters
    let page = query
        .page
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let limit = query
        .limit
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .max(1)
        .min(MAX_PAGE_LIMIT);

    let start_date = query
        .start_date
        .as_deref()
        .map(|v| parse_date_param(v, "start_date"))
        .transpose()?;
    let end_date = query
        .end_date
        .as_deref()
        .map(|v| parse_date_param(v, "end_date"))
        .transpose()?;
    let category_id = query
        .category_id
        .as_deref()
        .and_then(|v| v.parse::<i64>().ok());

    let filter = ExpenseFilter::new(user_id)
        .date_range(start_date, end_date)
        .category_id(category_id)
        .search(query.search.as_deref());

    let total = state.db.count_expenses(filter.clone())?;
    let offset = (page - 1) * limit;
    let expenses = state.db.list_expenses(filter, limit, offset)?;

    // The summary total ignores the category and search filters; only the
    // date window narrows it. `count` reflects the full filter set.
    let total_amount = state.db.sum_expenses(user_id, start_date, end_date)?;

    let pages = if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    };

    Ok(Json(ExpenseListResponse {
        expenses,
        pagination: Pagination {
            page,
            limit,
            total,
            pages,
        },
        summary: ExpenseSummary {
            total_amount,
            count: total,
        },
    }))
}

/// POST /api/v1/expenses - Create an expense
///
/// When no category is supplied the keyword categorizer picks one and the
/// row is flagged as auto-categorized.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<CreateExpenseResponse>), ApiError> {
    let req: CreateExpenseRequest = read_json(request).await?;

    let amount = req.amount.filter(|a| !a.is_zero());
    let description = req.description.filter(|d| !d.is_empty());
    let (amount, description) = match (amount, description) {
        (Some(amount), Some(description)) => (amount, description),
        _ => {
            return Err(ApiError::validation(
                "Amount and description are required",
            ))
        }
    };

    let transaction_date = match req.transaction_date.as_deref() {
        Some(v) => parse_date_param(v, "transaction_date")?,
        None => Utc::now().date_naive(),
    };

    // Only consult the categorizer when the caller did not pick a category
    let suggestion = if req.category_id.is_none() {
        Some(suggest_category(&description, req.vendor_name.as_deref()))
    } else {
        None
    };

    let new_expense = NewExpense {
        amount,
        currency: req.currency,
        description,
        category_id: req.category_id.or(suggestion.map(|s| s.category_id)),
        subcategory_id: req.subcategory_id,
        transaction_date,
        payment_method: req.payment_method,
        vendor_name: req.vendor_name,
        location: req.location,
        tags: req.tags.unwrap_or_default(),
        notes: req.notes,
        is_ai_categorized: suggestion.is_some(),
        confidence_score: suggestion.map(|s| s.confidence),
    };

    let id = state.db.insert_expense(user_id, &new_expense)?;
    let expense = state
        .db
        .get_expense(id, user_id)?
        .ok_or_else(|| ApiError::internal("Expense not found after creation"))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateExpenseResponse {
            message: "Expense created successfully".to_string(),
            expense,
            ai_suggestion: suggestion,
        }),
    ))
}

/// GET /api/v1/expenses/:id - Fetch a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .db
        .get_expense(id, user_id)?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    Ok(Json(expense))
}

/// PUT /api/v1/expenses/:id - Partially update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<UpdateExpenseResponse>, ApiError> {
    // Verify the expense exists and belongs to the caller
    state
        .db
        .get_expense(id, user_id)?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    let req: UpdateExpenseRequest = read_json(request).await?;

    let transaction_date = req
        .transaction_date
        .as_deref()
        .map(|v| parse_date_param(v, "transaction_date"))
        .transpose()?;

    let update = ExpenseUpdate {
        amount: req.amount,
        currency: req.currency,
        description: req.description,
        category_id: req.category_id,
        subcategory_id: req.subcategory_id,
        transaction_date,
        payment_method: req.payment_method,
        vendor_name: req.vendor_name,
        location: req.location,
        tags: req.tags,
        notes: req.notes,
    };

    state.db.update_expense(id, user_id, &update)?;

    let expense = state
        .db
        .get_expense(id, user_id)?
        .ok_or_else(|| ApiError::internal("Expense not found after update"))?;

    Ok(Json(UpdateExpenseResponse {
        message: "Expense updated successfully".to_string(),
        expense,
    }))
}

/// DELETE /api/v1/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.db.delete_expense(id, user_id)? {
        return Err(ApiError::not_found("Expense not found"));
    }

    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".to_string(),
    }))
}
