use crate::{
    auth::middleware::AuthUser,
    types::{Result, UserInfo},
    AppState,
};
use axum::{extract::State, Json};

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<UserInfo>> {
    let profile = state.credentials.profile(user.user_id()).await?;
    Ok(Json(profile))
}
