//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::json;
use spendwise_core::db::Database;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    db.seed_categories().unwrap();
    create_router(db, None, ServerConfig::default())
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send a request, optionally authenticated and with a JSON body
async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Register a user and return their access token
async fn register_user(app: &Router, email: &str) -> String {
    let response = send_json(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "password123",
            "first_name": "Test",
            "last_name": "User",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

// ========== Auth API Tests ==========

#[tokio::test]
async fn test_register_creates_user() {
    let app = setup_test_app();

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "password123",
            "first_name": "Alice",
            "last_name": "Smith",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "User created successfully");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["first_name"], "Alice");
    assert!(json["user"].get("password_hash").is_none());
    assert!(!json["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = setup_test_app();
    register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "alice@example.com",
            "password": "password123",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "USER_EXISTS");
    assert_eq!(json["error"]["message"], "Email already registered");
}

#[tokio::test]
async fn test_register_requires_email_and_password() {
    let app = setup_test_app();

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Email and password are required");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = setup_test_app();

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({ "email": "alice@example.com", "password": "abc12" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["message"],
        "Password must be at least 6 characters"
    );
}

#[tokio::test]
async fn test_login_success() {
    let app = setup_test_app();
    register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert!(!json["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = setup_test_app();
    register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
    assert_eq!(json["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = setup_test_app();

    let response = send_json(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = setup_test_app();

    let response = send_json(&app, "GET", "/api/v1/auth/profile", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    assert_eq!(json["error"]["message"], "Authentication required");
}

#[tokio::test]
async fn test_profile_rejects_garbage_token() {
    let app = setup_test_app();

    let response = send_json(
        &app,
        "GET",
        "/api/v1/auth/profile",
        Some("not-a-real-token"),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_profile_returns_user() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(&app, "GET", "/api/v1/auth/profile", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["email"], "alice@example.com");
    assert_eq!(json["currency"], "USD");
    assert!(json.get("password_hash").is_none());
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_create_expense_auto_categorizes() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 12.5, "description": "Lunch at Starbucks" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense created successfully");
    assert_eq!(json["ai_suggestion"]["category_id"], 1);
    assert_eq!(json["ai_suggestion"]["confidence"], 0.85);
    assert_eq!(json["expense"]["is_ai_categorized"], true);
    assert_eq!(json["expense"]["category"]["id"], 1);
    assert_eq!(json["expense"]["category"]["name"], "Food & Dining");
}

#[tokio::test]
async fn test_create_expense_explicit_category_skips_categorizer() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({
            "amount": 40.0,
            "description": "Dinner with friends",
            "category_id": 5,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert!(json["ai_suggestion"].is_null());
    assert_eq!(json["expense"]["is_ai_categorized"], false);
    assert_eq!(json["expense"]["category"]["id"], 5);
}

#[tokio::test]
async fn test_create_expense_requires_amount_and_description() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "description": "No amount" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["message"],
        "Amount and description are required"
    );

    // Zero is treated the same as missing
    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 0, "description": "Free lunch" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_expense_defaults_date_to_today() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 5.0, "description": "Quick snack" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(json["expense"]["transaction_date"], today);
}

#[tokio::test]
async fn test_create_expense_rejects_malformed_date() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({
            "amount": 5.0,
            "description": "Snack",
            "transaction_date": "2024-13-45",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["message"],
        "Invalid transaction_date format (use YYYY-MM-DD)"
    );
}

#[tokio::test]
async fn test_expense_amount_round_trips_as_decimal() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 19.99, "description": "Book" })),
    )
    .await;

    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();

    let response = send_json(
        &app,
        "GET",
        &format!("/api/v1/expenses/{}", id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["amount"], 19.99);
    assert_eq!(json["currency"], "USD");
}

#[tokio::test]
async fn test_create_expense_with_explicit_currency() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 42.0, "description": "Museum tickets", "currency": "EUR" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();
    assert_eq!(json["expense"]["currency"], "EUR");

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/v1/expenses/{}", id),
        Some(&token),
        Some(json!({ "currency": "GBP" })),
    )
    .await;

    let json = get_body_json(response).await;
    assert_eq!(json["expense"]["currency"], "GBP");
}

#[tokio::test]
async fn test_expense_tags_round_trip() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({
            "amount": 300.0,
            "description": "Flight to Lisbon",
            "tags": ["travel", "receipt"],
        })),
    )
    .await;

    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();
    assert_eq!(json["expense"]["tags"], json!(["travel", "receipt"]));

    let response = send_json(
        &app,
        "GET",
        &format!("/api/v1/expenses/{}", id),
        Some(&token),
        None,
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["tags"], json!(["travel", "receipt"]));
}

#[tokio::test]
async fn test_list_expenses_pagination() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    for i in 0..3 {
        send_json(
            &app,
            "POST",
            "/api/v1/expenses",
            Some(&token),
            Some(json!({
                "amount": 10.0,
                "description": format!("Expense {}", i),
                "transaction_date": format!("2024-03-{:02}", i + 1),
            })),
        )
        .await;
    }

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?page=1&limit=2",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["expenses"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["pages"], 2);

    // Newest transaction date comes first
    assert_eq!(json["expenses"][0]["transaction_date"], "2024-03-03");

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?page=2&limit=2",
        Some(&token),
        None,
    )
    .await;
    let json = get_body_json(response).await;
    assert_eq!(json["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(json["expenses"][0]["transaction_date"], "2024-03-01");
}

#[tokio::test]
async fn test_list_expenses_empty() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(&app, "GET", "/api/v1/expenses", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["expenses"].as_array().unwrap().len(), 0);
    assert_eq!(json["pagination"]["pages"], 0);
    assert_eq!(json["summary"]["total_amount"], 0.0);
    assert_eq!(json["summary"]["count"], 0);
}

#[tokio::test]
async fn test_list_expenses_date_filter_inclusive() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    for date in ["2024-02-29", "2024-03-01", "2024-03-15", "2024-03-16"] {
        send_json(
            &app,
            "POST",
            "/api/v1/expenses",
            Some(&token),
            Some(json!({
                "amount": 10.0,
                "description": format!("On {}", date),
                "transaction_date": date,
            })),
        )
        .await;
    }

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?start_date=2024-03-01&end_date=2024-03-15",
        Some(&token),
        None,
    )
    .await;

    let json = get_body_json(response).await;
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["expenses"][0]["transaction_date"], "2024-03-15");
    assert_eq!(json["expenses"][1]["transaction_date"], "2024-03-01");
}

#[tokio::test]
async fn test_list_expenses_search_matches_vendor() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({
            "amount": 4.5,
            "description": "Morning coffee",
            "vendor_name": "Blue Bottle",
        })),
    )
    .await;
    send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 12.0, "description": "Car wash" })),
    )
    .await;

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?search=bottle",
        Some(&token),
        None,
    )
    .await;

    let json = get_body_json(response).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["expenses"][0]["vendor_name"], "Blue Bottle");
}

#[tokio::test]
async fn test_list_expenses_summary_ignores_category_filter() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    // One categorized expense and one uncategorized, same date window
    send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({
            "amount": 30.0,
            "description": "Concert tickets",
            "category_id": 4,
            "transaction_date": "2024-03-10",
        })),
    )
    .await;
    send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({
            "amount": 50.0,
            "description": "Mystery purchase xyzzy",
            "transaction_date": "2024-03-11",
        })),
    )
    .await;

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?category_id=4",
        Some(&token),
        None,
    )
    .await;

    let json = get_body_json(response).await;
    // count follows the category filter, total_amount does not
    assert_eq!(json["summary"]["count"], 1);
    assert_eq!(json["summary"]["total_amount"], 80.0);
    assert_eq!(json["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_list_expenses_rejects_malformed_start_date() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?start_date=March-1st",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["error"]["message"],
        "Invalid start_date format (use YYYY-MM-DD)"
    );
}

#[tokio::test]
async fn test_list_expenses_malformed_limit_falls_back() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "GET",
        "/api/v1/expenses?limit=lots&page=nope",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 50);
}

#[tokio::test]
async fn test_expenses_scoped_to_owner() {
    let app = setup_test_app();
    let alice = register_user(&app, "alice@example.com").await;
    let bob = register_user(&app, "bob@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&alice),
        Some(json!({ "amount": 25.0, "description": "Private dinner" })),
    )
    .await;
    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();

    // Bob sees an empty list
    let response = send_json(&app, "GET", "/api/v1/expenses", Some(&bob), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["pagination"]["total"], 0);

    // Bob cannot fetch, update, or delete Alice's expense
    let uri = format!("/api/v1/expenses/{}", id);
    for (method, body) in [
        ("GET", None),
        ("PUT", Some(json!({ "amount": 1.0 }))),
        ("DELETE", None),
    ] {
        let response = send_json(&app, method, &uri, Some(&bob), body).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = get_body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Expense not found");
    }
}

#[tokio::test]
async fn test_update_expense_fields() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 10.0, "description": "Lunch" })),
    )
    .await;
    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/v1/expenses/{}", id),
        Some(&token),
        Some(json!({ "amount": 12.75, "notes": "Split with Sam" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense updated successfully");
    assert_eq!(json["expense"]["amount"], 12.75);
    assert_eq!(json["expense"]["notes"], "Split with Sam");
    // Untouched fields stay
    assert_eq!(json["expense"]["description"], "Lunch");
}

#[tokio::test]
async fn test_update_category_clears_ai_flag() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 8.0, "description": "Grocery run" })),
    )
    .await;
    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();
    assert_eq!(json["expense"]["is_ai_categorized"], true);

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/v1/expenses/{}", id),
        Some(&token),
        Some(json!({ "category_id": 4 })),
    )
    .await;

    let json = get_body_json(response).await;
    assert_eq!(json["expense"]["category"]["id"], 4);
    assert_eq!(json["expense"]["is_ai_categorized"], false);
    // The stored confidence survives a manual override
    assert_eq!(json["expense"]["confidence_score"], 0.85);
}

#[tokio::test]
async fn test_update_expense_null_clears_category() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 8.0, "description": "Train ticket" })),
    )
    .await;
    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();
    assert!(!json["expense"]["category"].is_null());

    let response = send_json(
        &app,
        "PUT",
        &format!("/api/v1/expenses/{}", id),
        Some(&token),
        Some(json!({ "category_id": null })),
    )
    .await;

    let json = get_body_json(response).await;
    assert!(json["expense"]["category"].is_null());
}

#[tokio::test]
async fn test_delete_expense() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/expenses",
        Some(&token),
        Some(json!({ "amount": 10.0, "description": "Mistake" })),
    )
    .await;
    let json = get_body_json(response).await;
    let id = json["expense"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/expenses/{}", id);
    let response = send_json(&app, "DELETE", &uri, Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Expense deleted successfully");

    // Deleting again reports not found, not a server error
    let response = send_json(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_api_route_gets_error_envelope() {
    let app = setup_test_app();

    let response = send_json(&app, "GET", "/api/v1/analytics/trends", None, None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "NOT_FOUND");
    assert_eq!(json["error"]["message"], "Resource not found");
}

// ========== Category API Tests ==========

#[tokio::test]
async fn test_list_categories_returns_seeded_set() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(&app, "GET", "/api/v1/categories", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let categories = json["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 9);
    assert_eq!(categories[0]["name"], "Food & Dining");
    assert_eq!(categories[8]["name"], "Uncategorized");
    assert_eq!(categories[0]["is_system_category"], true);
}

#[tokio::test]
async fn test_create_category() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&token),
        Some(json!({
            "name": "Pets",
            "icon": "🐕",
            "color": "#a3e635",
            "parent_category_id": 9,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Category created successfully");
    assert_eq!(json["category"]["name"], "Pets");
    assert_eq!(json["category"]["parent_category_id"], 9);
    assert_eq!(json["category"]["is_system_category"], false);
}

#[tokio::test]
async fn test_create_category_requires_name() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&token),
        Some(json!({ "icon": "🐕" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Name is required");
}

#[tokio::test]
async fn test_create_category_unknown_parent() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/categories",
        Some(&token),
        Some(json!({ "name": "Orphan", "parent_category_id": 999 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["message"], "Parent category not found");
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_budget_crud() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/budgets",
        Some(&token),
        Some(json!({
            "name": "Groceries",
            "amount": 400.0,
            "period": "monthly",
            "category_id": 1,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Budget created successfully");
    assert_eq!(json["budget"]["name"], "Groceries");
    assert_eq!(json["budget"]["period"], "monthly");
    assert_eq!(json["budget"]["alert_threshold"], 0.8);
    assert_eq!(json["budget"]["is_active"], true);
    assert_eq!(json["budget"]["category"]["id"], 1);
    let id = json["budget"]["id"].as_i64().unwrap();

    let response = send_json(&app, "GET", "/api/v1/budgets", Some(&token), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["budgets"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/budgets/{}", id);
    let response = send_json(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "amount": 450.0, "period": "weekly" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Budget updated successfully");
    assert_eq!(json["budget"]["amount"], 450.0);
    assert_eq!(json["budget"]["period"], "weekly");

    let response = send_json(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Budget deleted successfully");

    let response = send_json(&app, "GET", "/api/v1/budgets", Some(&token), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["budgets"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_budget_requires_fields() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/budgets",
        Some(&token),
        Some(json!({ "name": "Groceries" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Name, amount and period are required");
}

#[tokio::test]
async fn test_create_budget_rejects_unknown_period() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/budgets",
        Some(&token),
        Some(json!({ "name": "Groceries", "amount": 400.0, "period": "daily" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["message"], "Invalid period: daily");
}

// ========== Goal API Tests ==========

#[tokio::test]
async fn test_goal_crud_and_progress() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/goals",
        Some(&token),
        Some(json!({
            "title": "Emergency fund",
            "target_amount": 1000.0,
            "current_amount": 250.0,
            "priority": "high",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Goal created successfully");
    assert_eq!(json["goal"]["title"], "Emergency fund");
    assert_eq!(json["goal"]["priority"], "high");
    assert_eq!(json["goal"]["progress_percentage"], 25.0);
    assert_eq!(json["goal"]["is_completed"], false);
    let id = json["goal"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/goals/{}", id);
    let response = send_json(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "current_amount": 333.33 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Goal updated successfully");
    assert_eq!(json["goal"]["progress_percentage"], 33.3);

    let response = send_json(&app, "GET", "/api/v1/goals", Some(&token), None).await;
    let json = get_body_json(response).await;
    assert_eq!(json["goals"].as_array().unwrap().len(), 1);

    let response = send_json(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["message"], "Goal deleted successfully");
}

#[tokio::test]
async fn test_create_goal_requires_title_and_target() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/goals",
        Some(&token),
        Some(json!({ "title": "No target" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Title and target amount are required");
}

#[tokio::test]
async fn test_create_goal_defaults() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/goals",
        Some(&token),
        Some(json!({ "title": "New laptop", "target_amount": 2000.0 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = get_body_json(response).await;
    assert_eq!(json["goal"]["priority"], "medium");
    assert_eq!(json["goal"]["current_amount"], 0.0);
    assert_eq!(json["goal"]["progress_percentage"], 0.0);
}

#[tokio::test]
async fn test_create_goal_rejects_unknown_priority() {
    let app = setup_test_app();
    let token = register_user(&app, "alice@example.com").await;

    let response = send_json(
        &app,
        "POST",
        "/api/v1/goals",
        Some(&token),
        Some(json!({
            "title": "Vacation",
            "target_amount": 3000.0,
            "priority": "urgent",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert_eq!(json["error"]["message"], "Invalid priority: urgent");
}
