use crate::{
    api::handlers::json_body,
    auth::middleware::AuthUser,
    types::{
        AuthTokens, LoginRequest, LogoutAllResponse, MessageResponse, RefreshRequest,
        RegisterRequest, RegisterResponse, Result,
    },
    AppState,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let payload = json_body(payload)?;
    payload.validate()?;

    let credential = state
        .credentials
        .register(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: credential.user_info(),
        }),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthTokens),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthTokens>> {
    let payload = json_body(payload)?;
    payload.validate()?;

    let tokens = state
        .credentials
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = AuthTokens),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Refresh token invalid, revoked or expired")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AuthTokens>> {
    let payload = json_body(payload)?;
    payload.validate()?;

    let tokens = state.sessions.rotate(&payload.refresh_token).await?;

    Ok(Json(tokens))
}

/// Revoke a refresh token
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Invalid input")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let payload = json_body(payload)?;
    payload.validate()?;

    state.sessions.logout(&payload.refresh_token).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// Revoke every refresh token of the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout-all",
    responses(
        (status = 200, description = "All sessions revoked", body = LogoutAllResponse),
        (status = 401, description = "Missing or invalid access token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout_all(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<LogoutAllResponse>> {
    let revoked = state.sessions.logout_all(user.user_id()).await?;

    Ok(Json(LogoutAllResponse {
        message: "Logged out from all sessions".to_string(),
        revoked,
    }))
}
