//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::error::ApiErrorResponse;
use crate::api::models::{NotificationResponse, UpdateNotificationSettingsRequest, UserResponse};
use crate::api::routes::health::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "asteroid-alert API",
        description = "User-facing surface of the asteroid alerting service"
    ),
    paths(
        crate::api::routes::health::health,
        crate::api::routes::auth::login_sync,
        crate::api::routes::users::get_settings,
        crate::api::routes::users::update_settings,
        crate::api::routes::notifications::history,
        crate::api::routes::notifications::detail,
    ),
    components(schemas(
        HealthResponse,
        UserResponse,
        NotificationResponse,
        UpdateNotificationSettingsRequest,
        ApiErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness"),
        (name = "auth", description = "Identity sync"),
        (name = "users", description = "Notification preferences"),
        (name = "notifications", description = "Alert history"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
