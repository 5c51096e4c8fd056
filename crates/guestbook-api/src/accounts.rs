use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use guestbook_types::api::{ActivateQuery, RegisterQuery, RegisterResponse, StatusResponse};

use crate::auth::{AppState, hash_password};
use crate::validation::{is_valid_email, is_valid_password, normalize_email};
use crate::{ApiError, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    Query(query): Query<RegisterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_email(&query.email) {
        return Err(ApiError::BadRequest("invalid email address"));
    }
    let password = query
        .password
        .filter(|p| is_valid_password(p))
        .ok_or(ApiError::BadRequest("password must be at least 8 characters"))?;

    let email = normalize_email(&query.email);
    let user_id = run_blocking(move || {
        let password_hash = hash_password(&password)?;
        let token = Uuid::new_v4().to_string();

        state
            .db
            .register_user(&email, &password_hash, &token)
            .map_err(|e| {
                if e.is_unique_violation() {
                    ApiError::BadRequest("Registration failed")
                } else {
                    e.into()
                }
            })
    })
    .await?;

    info!("Registered user {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user created".to_string(),
            user_id,
        }),
    ))
}

/// Exchange an activation token for an active account. Tokens are not
/// consumed; a second exchange hits the already-active check.
pub async fn activate(
    State(state): State<AppState>,
    Query(query): Query<ActivateQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    run_blocking(move || {
        let token = state
            .db
            .get_token(&query.token)?
            .ok_or(ApiError::Forbidden("invalid token"))?;

        let user = state
            .db
            .get_user_by_id(token.user_id)?
            .ok_or(ApiError::Forbidden("invalid token"))?;

        if user.active || !state.db.activate_user(user.id)? {
            return Err(ApiError::BadRequest("account already activated"));
        }

        info!("Activated user {}", user.id);
        Ok(())
    })
    .await?;

    Ok(Json(StatusResponse::new("account activated")))
}
