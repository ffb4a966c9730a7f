//! Application assembly
//!
//! Builds the shared state and the axum router. Kept out of `main` so
//! integration tests can drive the full router in-process.

use crate::{
    agenda::{api as agenda_api, AgendaState, AgendaStore},
    auth::{api as auth_api, auth_middleware, AuthState, JwtHandler, UserStore},
    db::Db,
    middleware::request_logging,
    missions::{api as missions_api, MissionStore, MissionsState},
};
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application context: every store plus the token issuer.
#[derive(Clone)]
pub struct AppContext {
    pub user_store: Arc<UserStore>,
    pub mission_store: Arc<MissionStore>,
    pub agenda_store: Arc<AgendaStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AppContext {
    /// Initialize all stores against one database handle. Schema creation
    /// and admin seeding happen here, once, at startup.
    pub fn new(db: Db, jwt_secret: String) -> Result<Self> {
        Ok(Self {
            user_store: Arc::new(UserStore::new(db.clone())?),
            mission_store: Arc::new(MissionStore::new(db.clone())?),
            agenda_store: Arc::new(AgendaStore::new(db)?),
            jwt_handler: Arc::new(JwtHandler::new(jwt_secret)),
        })
    }
}

/// Create the API router
pub fn build_app(ctx: &AppContext) -> Router {
    let auth_state = AuthState::new(ctx.user_store.clone(), ctx.jwt_handler.clone());
    let missions_state = MissionsState {
        missions: ctx.mission_store.clone(),
    };
    let agenda_state = AgendaState {
        agenda: ctx.agenda_store.clone(),
    };

    // Login is the only route reachable without a token.
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(auth_api::login).with_state(auth_state.clone()));

    // Everything else sits behind the bearer-token guard. Role checks happen
    // inside the handlers, on the claims the guard attached.
    let user_routes = Router::new()
        .route(
            "/api/users",
            get(auth_api::list_users).post(auth_api::create_user),
        )
        .with_state(auth_state);

    let agenda_routes = Router::new()
        .route(
            "/api/agenda",
            get(agenda_api::list_agenda).post(agenda_api::create_agenda),
        )
        .with_state(agenda_state);

    let mission_routes = Router::new()
        .route(
            "/api/missions",
            get(missions_api::list_missions).post(missions_api::create_mission),
        )
        .route("/api/missions/:id/assign", post(missions_api::assign_mission))
        .with_state(missions_state);

    let protected_routes = user_routes
        .merge(agenda_routes)
        .merge(mission_routes)
        .route_layer(middleware::from_fn_with_state(
            ctx.jwt_handler.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

// ===== Health check =====

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
