//! SpendWise Web Server
//!
//! Axum-based REST API for the SpendWise personal finance backend.
//!
//! Security posture:
//! - Bearer-token authentication on every route except register and login
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Typed request schemas validated at the boundary, pagination caps
//! - Sanitized error responses: clients get a fixed `{code, message}` pair,
//!   the full error goes to the log

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use spendwise_core::auth::{TokenSigner, TOKEN_TTL_HOURS};
use spendwise_core::db::Database;

mod handlers;

/// Maximum accepted JSON request body size (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Secret used to sign and verify access tokens
    pub jwt_secret: String,
    /// Access token lifetime in hours
    pub token_ttl_hours: i64,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "spendwise-dev-secret".to_string(),
            token_ttl_hours: TOKEN_TTL_HOURS,
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub tokens: TokenSigner,
}

/// Authenticated user id, extracted from the `Authorization: Bearer` header
///
/// Handlers that take this parameter only run for requests carrying a valid
/// token; everything else gets a 401 in the standard error envelope.
pub struct AuthUser(pub i64);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .ok_or_else(ApiError::unauthorized)?;

        let user_id = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized())?;

        Ok(AuthUser(user_id))
    }
}

/// Simple confirmation response for mutations
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Fallback for unmatched API routes
async fn api_not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

/// Build the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let tokens = TokenSigner::new(&config.jwt_secret, config.token_ttl_hours);
    let state = Arc::new(AppState { db, tokens });

    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/profile", get(handlers::get_profile))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/:id",
            put(handlers::update_budget).delete(handlers::delete_budget),
        )
        // Goals
        .route(
            "/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/goals/:id",
            put(handlers::update_goal).delete(handlers::delete_goal),
        )
        // Unmatched API paths still answer with the error envelope
        .fallback(api_not_found);

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let app = Router::new()
        .nest("/api/v1", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Serve static files if directory provided
    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error carrying the wire error code and HTTP status
///
/// Every failure surfaces as `{"error": {"code": ..., "message": ...}}`.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    internal: Option<anyhow::Error>,
}

impl ApiError {
    pub fn validation(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn user_exists(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "USER_EXISTS",
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: "Authentication required".to_string(),
            internal: None,
        }
    }

    pub fn invalid_credentials() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "INVALID_CREDENTIALS",
            message: "Invalid email or password".to_string(),
            internal: None,
        }
    }

    pub fn account_disabled() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "ACCOUNT_DISABLED",
            message: "Account is disabled".to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn user_not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "USER_NOT_FOUND",
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "SERVER_ERROR",
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "SERVER_ERROR",
            // Return a generic message to the client
            message: "An internal error occurred".to_string(),
            // Keep the full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
