pub mod accounts;
pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod validation;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;
pub use routes::router;

use tracing::error;

/// Runs blocking work (SQLite, password hashing) off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::from(e)
    })?
}
