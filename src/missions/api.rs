//! Mission API Endpoints
//! Mission: Expose dispatch mission creation, listing, and assignment

use crate::auth::middleware::require_role;
use crate::auth::models::{Claims, UserRole};
use crate::missions::{
    models::{AssignMissionRequest, CreateMissionRequest, Mission, MissionListItem},
    store::{MissionStore, MissionStoreError},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// Shared mission state
#[derive(Clone)]
pub struct MissionsState {
    pub missions: Arc<MissionStore>,
}

/// List missions - GET /api/missions (any authenticated user)
pub async fn list_missions(
    State(state): State<MissionsState>,
) -> Result<Json<Vec<MissionListItem>>, MissionApiError> {
    let missions = state.missions.list()?;
    Ok(Json(missions))
}

/// Create mission - POST /api/missions (Admin only)
pub async fn create_mission(
    State(state): State<MissionsState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateMissionRequest>,
) -> Result<Json<Mission>, MissionApiError> {
    require_role(&claims, UserRole::Admin).map_err(|_| MissionApiError::Forbidden)?;

    let (client, dt, pickup, dropoff) =
        match (payload.client, payload.dt, payload.pickup, payload.dropoff) {
            (Some(c), Some(d), Some(p), Some(o))
                if ![&c, &d, &p, &o].iter().any(|s| s.trim().is_empty()) =>
            {
                (c, d, p, o)
            }
            _ => return Err(MissionApiError::MissingFields),
        };

    let mission = state.missions.create(&client, &dt, &pickup, &dropoff)?;
    Ok(Json(mission))
}

/// Assign mission - POST /api/missions/:id/assign (Admin only)
pub async fn assign_mission(
    State(state): State<MissionsState>,
    Extension(claims): Extension<Claims>,
    Path(mission_id): Path<i64>,
    Json(payload): Json<AssignMissionRequest>,
) -> Result<Json<serde_json::Value>, MissionApiError> {
    require_role(&claims, UserRole::Admin).map_err(|_| MissionApiError::Forbidden)?;

    let user_id = payload.user_id.ok_or(MissionApiError::MissingUserId)?;

    state.missions.assign(mission_id, user_id)?;
    Ok(Json(json!({ "success": true })))
}

/// Mission API errors
#[derive(Debug)]
pub enum MissionApiError {
    MissingFields,
    MissingUserId,
    Forbidden,
    NotFound,
    Internal,
}

impl From<MissionStoreError> for MissionApiError {
    fn from(e: MissionStoreError) -> Self {
        match e {
            MissionStoreError::NotFound => MissionApiError::NotFound,
            MissionStoreError::Storage(err) => {
                error!("Mission storage error: {}", err);
                MissionApiError::Internal
            }
        }
    }
}

impl IntoResponse for MissionApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MissionApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing fields"),
            MissionApiError::MissingUserId => (StatusCode::BAD_REQUEST, "Missing user_id"),
            MissionApiError::Forbidden => (StatusCode::FORBIDDEN, "Admin only"),
            MissionApiError::NotFound => (StatusCode::NOT_FOUND, "Mission not found"),
            MissionApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_api_error_responses() {
        let missing = MissionApiError::MissingFields.into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let missing_uid = MissionApiError::MissingUserId.into_response();
        assert_eq!(missing_uid.status(), StatusCode::BAD_REQUEST);

        let forbidden = MissionApiError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let not_found = MissionApiError::NotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_error_mapping_hides_storage_detail() {
        let storage = MissionStoreError::Storage(anyhow::anyhow!("locked"));
        let api: MissionApiError = storage.into();
        assert!(matches!(api, MissionApiError::Internal));

        let nf: MissionApiError = MissionStoreError::NotFound.into();
        assert!(matches!(nf, MissionApiError::NotFound));
    }
}
