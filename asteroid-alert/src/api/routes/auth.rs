//! Authentication sync route.

use axum::{Json, Router, extract::State, routing::post};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::UserResponse;
use crate::api::server::{AppState, AuthUser};
use crate::database::models::UserDbModel;

pub fn router() -> Router<AppState> {
    Router::new().route("/login-sync", post(login_sync))
}

#[utoipa::path(
    post,
    path = "/api/auth/login-sync",
    tag = "auth",
    responses(
        (status = 200, description = "User synced", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub(crate) async fn login_sync(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<UserResponse>> {
    info!("Login sync initiated for subject: {}", claims.sub);

    let email = claims
        .email
        .clone()
        .ok_or_else(|| ApiError::validation("Token carries no email claim"))?;

    match state.user_repository.find_by_google_id(&claims.sub).await? {
        Some(_) => {
            state
                .user_repository
                .sync_login(&claims.sub, &email, claims.name.as_deref())
                .await?;
        }
        None => {
            let user = UserDbModel::new(claims.sub.as_str(), email.as_str(), claims.name.clone());
            state.user_repository.create(&user).await?;
        }
    }

    let user = state
        .user_repository
        .find_by_google_id(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::internal("User sync failed"))?;

    Ok(Json(user.into()))
}
