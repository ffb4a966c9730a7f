//! Authentication API Endpoints
//! Mission: Provide login and user management endpoints

use crate::auth::{
    jwt::JwtHandler,
    middleware::require_role,
    models::{Claims, CreateUserRequest, LoginRequest, LoginResponse, UserResponse, UserRole},
    user_store::{UserStore, UserStoreError},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

/// Login endpoint - POST /api/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    let (name, password) = match (payload.name, payload.password) {
        (Some(n), Some(p)) if !n.trim().is_empty() && !p.is_empty() => (n, p),
        _ => return Err(AuthApiError::MissingFields),
    };

    info!("Login attempt: {}", name);

    // bcrypt verification is deliberately slow; keep it off the async
    // request-accept path.
    let store = state.user_store.clone();
    let user = tokio::task::spawn_blocking(move || store.verify_credentials(&name, &password))
        .await
        .map_err(|_| AuthApiError::Internal)?
        .map_err(|e| {
            if matches!(e, UserStoreError::InvalidCredentials) {
                warn!("Failed login attempt");
            }
            AuthApiError::from(e)
        })?;

    let (token, expires_in) = state
        .jwt_handler
        .issue(&user)
        .map_err(|_| AuthApiError::Internal)?;

    info!("Login successful: {} ({})", user.name, user.role.as_str());

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Create user - POST /api/users (Admin only)
pub async fn create_user(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, AuthApiError> {
    require_role(&claims, UserRole::Admin).map_err(|_| AuthApiError::Forbidden)?;

    let (name, password, role) = match (payload.name, payload.password, payload.role) {
        (Some(n), Some(p), Some(r)) if !n.trim().is_empty() && !p.is_empty() => (n, p, r),
        _ => return Err(AuthApiError::MissingFields),
    };

    let store = state.user_store.clone();
    let user = tokio::task::spawn_blocking(move || store.create_user(&name, &password, role))
        .await
        .map_err(|_| AuthApiError::Internal)??;

    Ok(Json(UserResponse::from_user(&user)))
}

/// List all users - GET /api/users (Admin only)
pub async fn list_users(
    State(state): State<AuthState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, AuthApiError> {
    require_role(&claims, UserRole::Admin).map_err(|_| AuthApiError::Forbidden)?;

    let users = state.user_store.list_users()?;
    let response: Vec<UserResponse> = users.iter().map(UserResponse::from_user).collect();

    Ok(Json(response))
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    MissingFields,
    InvalidCredentials,
    Forbidden,
    DuplicateName,
    Internal,
}

impl From<UserStoreError> for AuthApiError {
    fn from(e: UserStoreError) -> Self {
        match e {
            UserStoreError::InvalidCredentials => AuthApiError::InvalidCredentials,
            UserStoreError::DuplicateName => AuthApiError::DuplicateName,
            UserStoreError::Storage(err) => {
                // Never forward raw storage text to the client.
                error!("User storage error: {}", err);
                AuthApiError::Internal
            }
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing fields"),
            AuthApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthApiError::Forbidden => (StatusCode::FORBIDDEN, "Admin only"),
            AuthApiError::DuplicateName => (StatusCode::CONFLICT, "User name already exists"),
            AuthApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::User;

    #[test]
    fn test_user_response_from_user() {
        let user = User {
            id: 3,
            name: "testuser".to_string(),
            password_hash: "hash123".to_string(),
            role: UserRole::Standard,
        };

        let response = UserResponse::from_user(&user);
        assert_eq!(response.id, 3);
        assert_eq!(response.name, "testuser");
        assert_eq!(response.role, UserRole::Standard);
    }

    #[test]
    fn test_auth_api_error_responses() {
        let missing = AuthApiError::MissingFields.into_response();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let invalid_creds = AuthApiError::InvalidCredentials.into_response();
        assert_eq!(invalid_creds.status(), StatusCode::UNAUTHORIZED);

        let forbidden = AuthApiError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let conflict = AuthApiError::DuplicateName.into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_error_mapping_hides_storage_detail() {
        let storage = UserStoreError::Storage(anyhow::anyhow!("disk on fire"));
        let api: AuthApiError = storage.into();
        assert!(matches!(api, AuthApiError::Internal));

        let creds: AuthApiError = UserStoreError::InvalidCredentials.into();
        assert!(matches!(creds, AuthApiError::InvalidCredentials));
    }
}
