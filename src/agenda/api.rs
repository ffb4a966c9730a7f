//! Agenda API Endpoints
//! Owner-scoped schedule listing and creation. The owner always comes from
//! the verified token claims, never from the request body.

use crate::agenda::store::{AgendaEntry, AgendaStore, AgendaStoreError};
use crate::auth::models::Claims;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Shared agenda state
#[derive(Clone)]
pub struct AgendaState {
    pub agenda: Arc<AgendaStore>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAgendaRequest {
    pub title: Option<String>,
    pub date: Option<String>,
}

/// List own agenda entries - GET /api/agenda
pub async fn list_agenda(
    State(state): State<AgendaState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<AgendaEntry>>, AgendaApiError> {
    let user_id = claims.user_id().ok_or(AgendaApiError::Internal)?;
    let entries = state.agenda.list_for_user(user_id)?;
    Ok(Json(entries))
}

/// Create an agenda entry - POST /api/agenda
pub async fn create_agenda(
    State(state): State<AgendaState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAgendaRequest>,
) -> Result<Json<AgendaEntry>, AgendaApiError> {
    let user_id = claims.user_id().ok_or(AgendaApiError::Internal)?;

    let (title, date) = match (payload.title, payload.date) {
        (Some(t), Some(d)) if !t.trim().is_empty() && !d.trim().is_empty() => (t, d),
        _ => return Err(AgendaApiError::MissingFields),
    };

    let entry = state.agenda.create(user_id, &title, &date)?;
    Ok(Json(entry))
}

/// Agenda API errors
#[derive(Debug)]
pub enum AgendaApiError {
    MissingFields,
    Internal,
}

impl From<AgendaStoreError> for AgendaApiError {
    fn from(e: AgendaStoreError) -> Self {
        let AgendaStoreError::Storage(err) = e;
        error!("Agenda storage error: {}", err);
        AgendaApiError::Internal
    }
}

impl IntoResponse for AgendaApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AgendaApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing fields"),
            AgendaApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
