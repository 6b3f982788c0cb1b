//! HTTP API Handlers and Routes
//!
//! The REST layer over the credential services, built on Axum.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/v1/auth`)
//! - `POST /api/v1/auth/register` - Register new user
//! - `POST /api/v1/auth/login` - Login and receive access + refresh tokens
//! - `POST /api/v1/auth/refresh` - Rotate a refresh token
//! - `POST /api/v1/auth/logout` - Revoke a refresh token
//! - `POST /api/v1/auth/logout-all` - Revoke every refresh token of the caller
//!
//! ## Users
//! - `GET /api/v1/me` - Profile of the authenticated user
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Authentication
//!
//! Protected endpoints require a valid access token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api/openapi.json`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
