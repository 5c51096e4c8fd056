use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use guestbook_db::Database;
use guestbook_db::models::MessageRow;
use guestbook_types::api::{
    CreateMessageResponse, DeleteQuery, ListQuery, MessageDetail, MessageForm,
    MessageListResponse, MessageSummary, PopularMessage, PopularResponse, SearchHit, SearchQuery,
    StatusResponse,
};

use crate::auth::AppState;
use crate::middleware::AuthUser;
use crate::policy;
use crate::{ApiError, run_blocking};

const NOT_FOUND: ApiError = ApiError::NotFound("message not found");
const DENIED: ApiError = ApiError::Forbidden("Request not completed");

pub async fn create_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Form(form): Form<MessageForm>,
) -> Result<Json<CreateMessageResponse>, ApiError> {
    let message_id = run_blocking(move || {
        Ok(state.db.insert_message(user.id, &form.message, form.private)?)
    })
    .await?;

    info!("User {} created message {}", user.id, message_id);
    Ok(Json(CreateMessageResponse { message_id }))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let rows = run_blocking(move || Ok(state.db.list_visible_messages(user.id, query.num)?)).await?;

    let messages = rows
        .into_iter()
        .map(|row| MessageSummary {
            created_at: parse_timestamp(&row.created_at, row.id),
            id: row.id,
            message: row.message,
            private: row.private,
        })
        .collect();

    Ok(Json(MessageListResponse { messages }))
}

pub async fn search_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let rows = run_blocking(move || {
        Ok(state.db.search_messages(user.id, &query.search_term, query.num)?)
    })
    .await?;

    Ok(Json(
        rows.into_iter()
            .map(|row| SearchHit {
                id: row.id,
                message: row.message,
                private: row.private,
            })
            .collect(),
    ))
}

/// Upvote leaderboard. Served without authentication.
pub async fn popular_messages(
    State(state): State<AppState>,
) -> Result<Json<PopularResponse>, ApiError> {
    let rows = run_blocking(move || Ok(state.db.popular_messages()?)).await?;

    let messages = rows
        .into_iter()
        .map(|row| PopularMessage {
            id: row.id,
            message: row.message,
            upvotes: row.upvotes,
        })
        .collect();

    Ok(Json(PopularResponse { messages }))
}

pub async fn get_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(message_id): Path<i64>,
) -> Result<Json<MessageDetail>, ApiError> {
    let row = run_blocking(move || load_message(&state.db, message_id)).await?;

    if !policy::can_read(&row, user.id) {
        return Err(DENIED);
    }

    Ok(Json(MessageDetail {
        created_at: parse_timestamp(&row.created_at, row.id),
        id: row.id,
        message: row.message,
    }))
}

pub async fn update_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(message_id): Path<i64>,
    Form(form): Form<MessageForm>,
) -> Result<Json<StatusResponse>, ApiError> {
    run_blocking(move || {
        let row = load_message(&state.db, message_id)?;
        if !policy::can_modify(&row, user.id) {
            return Err(DENIED);
        }
        state.db.update_message(message_id, &form.message, form.private)?;
        Ok(())
    })
    .await?;

    Ok(Json(StatusResponse::new("Message updated")))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    let message_id = query.message_id;
    let deleted = run_blocking(move || {
        let row = load_message(&state.db, message_id)?;
        if !policy::can_modify(&row, user.id) {
            return Err(DENIED);
        }
        Ok(state.db.delete_message(user.id, message_id)?)
    })
    .await?;

    info!("User {} deleted message {} ({} rows)", user.id, message_id, deleted);

    let status = if deleted == 1 {
        "1 row deleted".to_string()
    } else {
        format!("{} rows deleted", deleted)
    };
    Ok(Json(StatusResponse::new(status)))
}

/// Repeat upvotes by the same user are recorded individually.
pub async fn upvote_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(message_id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    run_blocking(move || {
        let row = load_message(&state.db, message_id)?;
        if !policy::can_upvote(&row, user.id) {
            return Err(DENIED);
        }
        state.db.insert_upvote(user.id, message_id)?;
        Ok(())
    })
    .await?;

    Ok(Json(StatusResponse::new("upvote recorded")))
}

fn load_message(db: &Database, message_id: i64) -> Result<MessageRow, ApiError> {
    db.get_message(message_id)?.ok_or(NOT_FOUND)
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone; parse
/// those as naive UTC.
fn parse_timestamp(raw: &str, message_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on message '{}': {}", raw, message_id, e);
            DateTime::default()
        })
}
