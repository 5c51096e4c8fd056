use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::warn;

use guestbook_db::Database;

use crate::ApiError;
use crate::validation::normalize_email;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
}

impl AppStateInner {
    pub fn new(db: Database) -> AppState {
        Arc::new(Self { db })
    }
}

/// Hash a password with Argon2id into a PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Unparseable password hash in database: {}", e);
            false
        }
    }
}

/// Resolve Basic credentials to the id of an active user.
pub fn authenticate(db: &Database, email: &str, password: &str) -> Result<i64, ApiError> {
    let user = db.get_user_by_email(&normalize_email(email))?;

    match user {
        Some(user) if user.active && verify_password(password, &user.password) => Ok(user.id),
        Some(user) if !user.active => {
            warn!("Login attempt for inactive user {}", user.id);
            Err(ApiError::Unauthorized)
        }
        _ => {
            warn!("Rejected credentials for {}", email);
            Err(ApiError::Unauthorized)
        }
    }
}
