//! Dispatch Backend - mission dispatch and scheduling service
//!
//! Authenticates users with bcrypt + JWT sessions, enforces admin/standard
//! roles, and tracks agenda entries and dispatch missions in SQLite.

use anyhow::{Context, Result};
use dispatch_backend::{app, db};
use dotenv::dotenv;
use std::env;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    let _ = dotenv();
    init_tracing();

    info!("Dispatch backend starting");

    let db_path = env::var("DB_PATH").unwrap_or_else(|_| "data.db".to_string());
    let port = env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .context("Invalid PORT")?;

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using development default");
        DEFAULT_JWT_SECRET.to_string()
    });

    let database = db::open(&db_path)?;
    let ctx = app::AppContext::new(database, jwt_secret)?;
    info!("Database initialized at: {}", db_path);

    let router = app::build_app(&ctx);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(listener, router).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dispatch_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
