use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};

use crate::auth::{AppState, authenticate};
use crate::{ApiError, run_blocking};

/// Identity of the caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
}

/// Verify HTTP Basic credentials on every request. There are no sessions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = req
        .headers()
        .typed_get::<Authorization<Basic>>()
        .ok_or(ApiError::Unauthorized)?;

    let email = credentials.username().to_owned();
    let password = credentials.password().to_owned();

    let user_id = run_blocking(move || authenticate(&state.db, &email, &password)).await?;

    req.extensions_mut().insert(AuthUser { id: user_id });
    Ok(next.run(req).await)
}
