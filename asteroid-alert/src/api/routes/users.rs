//! User settings routes.

use axum::{Json, Router, extract::State, routing::get};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{UpdateNotificationSettingsRequest, UserResponse};
use crate::api::server::{AppState, AuthUser};

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

#[utoipa::path(
    get,
    path = "/api/users/settings",
    tag = "users",
    responses(
        (status = 200, description = "User settings", body = UserResponse),
        (status = 404, description = "Unknown user")
    ),
    security(("bearer" = []))
)]
pub(crate) async fn get_settings(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_repository
        .find_by_google_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", claims.sub)))?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/users/settings",
    tag = "users",
    request_body = UpdateNotificationSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = UserResponse),
        (status = 404, description = "Unknown user"),
        (status = 422, description = "Unknown settings key")
    ),
    security(("bearer" = []))
)]
pub(crate) async fn update_settings(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(request): Json<UpdateNotificationSettingsRequest>,
) -> ApiResult<Json<UserResponse>> {
    info!(
        "Updating notification preference for subject {}: {}",
        claims.sub, request.notification_enabled
    );

    state
        .user_repository
        .set_notification_enabled(&claims.sub, request.notification_enabled)
        .await?;

    let user = state
        .user_repository
        .find_by_google_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", claims.sub)))?;

    Ok(Json(user.into()))
}
