//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use spendwise_server::ServerConfig;

use super::open_db;

/// Environment variable holding the token signing secret
pub const JWT_SECRET_ENV: &str = "SPENDWISE_JWT_SECRET";

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
    allowed_origins: Option<&str>,
) -> Result<()> {
    println!("🚀 Starting SpendWise API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse CORS allowlist (comma-separated); empty means same-origin only
    let origins: Vec<String> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if !origins.is_empty() {
        println!("   CORS origins: {}", origins.join(", "));
    }

    let jwt_secret = std::env::var(JWT_SECRET_ENV)
        .ok()
        .filter(|s| !s.is_empty());
    if jwt_secret.is_none() {
        println!();
        println!("   ⚠️  {} not set - using a development secret", JWT_SECRET_ENV);
        println!("      Set it before exposing this server to a network!");
    }

    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    // Ensure system categories exist (idempotent)
    db.seed_categories().context("Failed to seed categories")?;

    let config = ServerConfig {
        jwt_secret: jwt_secret.unwrap_or_else(|| ServerConfig::default().jwt_secret),
        allowed_origins: origins,
        ..ServerConfig::default()
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path is not valid UTF-8"))
        .transpose()?;
    spendwise_server::serve(db, host, port, static_dir_str, config).await?;

    Ok(())
}
