use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, TokenResponse, ValidateRequest, ValidateResponse},
        jwt::JwtKeys,
        services::{bootstrap_default_user, check_credentials},
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/validate", post(validate_token))
        .route("/create/test_user", post(create_test_user))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let ok = check_credentials(state.users.as_ref(), &payload.username, &payload.password).await?;
    if !ok {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.issue(&payload.username)?;

    info!(username = %payload.username, "user logged in");
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state, payload))]
pub async fn validate_token(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let username = keys.validate(&payload.token)?;
    Ok(Json(ValidateResponse {
        username,
        message: "Token is valid",
    }))
}

#[instrument(skip(state))]
pub async fn create_test_user(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = bootstrap_default_user(state.users.as_ref()).await?;
    Ok(Json(MessageResponse {
        message: outcome.message(),
    }))
}
