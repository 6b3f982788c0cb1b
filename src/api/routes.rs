use crate::api::handlers::{auth, health, users};
use crate::auth::jwt::TokenCodec;
use crate::types::{
    AuthTokens, LoginRequest, LogoutAllResponse, MessageResponse, RefreshRequest,
    RegisterRequest, RegisterResponse, UserInfo,
};
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::refresh,
        auth::logout,
        auth::logout_all,
        users::me,
    ),
    components(schemas(
        health::HealthResponse,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        RefreshRequest,
        AuthTokens,
        MessageResponse,
        LogoutAllResponse,
        UserInfo,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and token lifecycle"),
        (name = "users", description = "Authenticated user"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// Versioned API routes, to be nested under `/api/v1`.
pub fn create_router(codec: Arc<TokenCodec>) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout));

    let protected_routes = Router::new()
        .route("/auth/logout-all", post(auth::logout_all))
        .route("/me", get(users::me))
        .layer(middleware::from_fn_with_state(
            codec,
            crate::auth::middleware::auth_middleware,
        ));

    public_routes.merge(protected_routes)
}

/// The complete application: health, OpenAPI document, versioned API,
/// CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api/v1", create_router(state.codec.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
