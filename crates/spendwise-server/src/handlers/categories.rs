//! Category handlers
//!
//! Categories are shared across users: the seeded set plus any custom
//! ones. Routes still require authentication.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::read_json;
use crate::{ApiError, AppState, AuthUser};
use spendwise_core::models::Category;

/// Request body for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub parent_category_id: Option<i64>,
}

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Serialize)]
pub struct CreateCategoryResponse {
    pub message: String,
    pub category: Category,
}

/// GET /api/v1/categories - List all categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state.db.list_categories()?;

    Ok(Json(CategoryListResponse { categories }))
}

/// POST /api/v1/categories - Create a custom category
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<CreateCategoryResponse>), ApiError> {
    let req: CreateCategoryRequest = read_json(request).await?;

    let name = req.name.as_deref().map(str::trim).unwrap_or("");
    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }

    // Verify the parent exists before linking to it
    if let Some(parent_id) = req.parent_category_id {
        state
            .db
            .get_category(parent_id)?
            .ok_or_else(|| ApiError::not_found("Parent category not found"))?;
    }

    let id = state.db.create_category(
        name,
        req.description.as_deref(),
        req.icon.as_deref(),
        req.color.as_deref(),
        req.parent_category_id,
    )?;

    let category = state
        .db
        .get_category(id)?
        .ok_or_else(|| ApiError::internal("Category not found after creation"))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCategoryResponse {
            message: "Category created successfully".to_string(),
            category,
        }),
    ))
}
