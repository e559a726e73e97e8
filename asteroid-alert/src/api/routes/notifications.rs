//! Notification history routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::warn;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::NotificationResponse;
use crate::api::server::{AppState, AuthUser};

/// History page size. Alerts are global, not per user; the history view shows
/// the most recent ones.
const HISTORY_LIMIT: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(history))
        .route("/{id}", get(detail))
}

#[utoipa::path(
    get,
    path = "/api/notifications/history",
    tag = "notifications",
    responses(
        (status = 200, description = "Recent notifications", body = [NotificationResponse]),
        (status = 204, description = "No notifications")
    ),
    security(("bearer" = []))
)]
pub(crate) async fn history(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Response> {
    if state
        .user_repository
        .find_by_google_id(&claims.sub)
        .await?
        .is_none()
    {
        warn!("History requested by unknown subject: {}", claims.sub);
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let notifications = state
        .notification_repository
        .list_recent(HISTORY_LIMIT)
        .await?;

    if notifications.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<NotificationResponse> = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();
    Ok(Json(body).into_response())
}

#[utoipa::path(
    get,
    path = "/api/notifications/{id}",
    tag = "notifications",
    params(
        ("id" = i64, Path, description = "Notification id")
    ),
    responses(
        (status = 200, description = "Notification detail", body = NotificationResponse),
        (status = 404, description = "Unknown notification")
    ),
    security(("bearer" = []))
)]
pub(crate) async fn detail(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<NotificationResponse>> {
    let notification = state
        .notification_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Notification '{}' not found", id)))?;

    Ok(Json(notification.into()))
}
