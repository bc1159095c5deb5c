//! API service routes
//!
//! Every request passes through [`authenticate_jwt`]. Route groups are then
//! gated by the guard their resource needs: public, logged in, admin, or the
//! user named in the path (or an admin).

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::{
        AuthUser, authenticate_jwt, require_admin, require_logged_in, require_self_or_admin,
    },
    models::{TokenRequest, TokenResponse, UpdateCompanyRequest, UpdateUserRequest},
    state::AppState,
    validation::{validate_company_update, validate_user_update},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let logged_in_routes = Router::new()
        .route("/auth/whoami", get(whoami))
        .route_layer(middleware::from_fn(require_logged_in));

    let admin_routes = Router::new()
        .route("/users", get(get_users))
        .route("/companies/:handle", patch(update_company))
        .route_layer(middleware::from_fn(require_admin));

    let self_or_admin_routes = Router::new()
        .route(
            "/users/:username",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn(require_self_or_admin));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/token", post(get_token))
        .route("/companies/:handle", get(get_company))
        .merge(logged_in_routes)
        .merge(admin_routes)
        .merge(self_or_admin_routes)
        .layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            authenticate_jwt,
        ))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Exchange a username and password for a token
pub async fn get_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .authenticate(&payload.username, &payload.password)
        .await?;

    let token = state
        .jwt_service
        .create_token(&user.username, user.is_admin)
        .map_err(|e| {
            error!("Failed to generate token: {}", e);
            ApiError::InternalServerError
        })?;

    info!("Issued token for user {}", user.username);

    Ok(Json(TokenResponse { token }))
}

/// Return the caller's token claims
pub async fn whoami(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({ "user": user }))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.get_all().await?;
    Ok(Json(json!({ "users": users })))
}

/// Get a user by username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let user = state.user_repository.get(&username).await?;
    Ok(Json(json!({ "user": user })))
}

/// Partially update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(changes): Json<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_user_update(&changes)?;
    let user = state.user_repository.update(&username, &changes).await?;
    Ok(Json(json!({ "user": user })))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.user_repository.remove(&username).await?;
    Ok(Json(json!({ "deleted": username })))
}

/// Get a company by handle
pub async fn get_company(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let company = state.company_repository.get(&handle).await?;
    Ok(Json(json!({ "company": company })))
}

/// Partially update a company
pub async fn update_company(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    Json(changes): Json<UpdateCompanyRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_company_update(&changes)?;
    let company = state.company_repository.update(&handle, &changes).await?;
    Ok(Json(json!({ "company": company })))
}
