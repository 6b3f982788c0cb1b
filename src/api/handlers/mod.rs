//! API request handlers.

/// Registration, login, rotation and logout handlers.
pub mod auth;
/// Liveness handler.
pub mod health;
/// Authenticated user handlers.
pub mod users;

use crate::types::{AppError, Result};
use axum::extract::rejection::JsonRejection;
use axum::Json;

/// Unwraps a JSON body, reporting an unreadable body as a validation error
/// in the same `{error, code}` shape as every other failure.
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}
