//! API surface tests against the real router with in-memory repositories.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use sqlx::SqlitePool;
use tower::ServiceExt;

use asteroid_alert::api::jwt::JwtVerifier;
use asteroid_alert::api::routes::create_router;
use asteroid_alert::api::server::AppState;
use asteroid_alert::database;
use asteroid_alert::database::models::NotificationDbModel;
use asteroid_alert::database::repositories::{
    NotificationRepository, SqlxNotificationRepository, SqlxUserRepository,
};

const TEST_SECRET: &str = "test-secret-key-32-chars-long!!!";

struct TestApp {
    router: Router,
    pool: SqlitePool,
    verifier: JwtVerifier,
}

async fn spawn_app() -> TestApp {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&pool).await.unwrap();

    let verifier = JwtVerifier::new(TEST_SECRET);
    let state = AppState::new(
        Some(Arc::new(verifier.clone())),
        Arc::new(SqlxNotificationRepository::new(pool.clone())),
        Arc::new(SqlxUserRepository::new(pool.clone())),
    );

    TestApp {
        router: create_router(state),
        pool,
        verifier: JwtVerifier::new(TEST_SECRET),
    }
}

impl TestApp {
    fn token(&self, sub: &str) -> String {
        self.verifier
            .issue_token(sub, Some("user@example.com"), Some("Test User"), 3600)
            .unwrap()
    }

    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Option<serde_json::Value>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            None
        } else {
            serde_json::from_slice(&bytes).ok()
        };
        (status, json)
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["status"], "ok");
}

#[tokio::test]
async fn authenticated_routes_reject_missing_token() {
    let app = spawn_app().await;
    let (status, _) = app.request("GET", "/api/users/settings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/users/settings", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sync_creates_then_updates_user() {
    let app = spawn_app().await;
    let token = app.token("sub-1");

    let (status, body) = app
        .request("POST", "/api/auth/login-sync", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body["googleId"], "sub-1");
    assert_eq!(body["email"], "user@example.com");
    assert_eq!(body["notificationEnabled"], true);

    // Second sync is an update, not a duplicate.
    let (status, body) = app
        .request("POST", "/api/auth/login-sync", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["googleId"], "sub-1");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn settings_unknown_user_is_404() {
    let app = spawn_app().await;
    let token = app.token("ghost");

    let (status, _) = app
        .request("GET", "/api/users/settings", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            "PUT",
            "/api/users/settings",
            Some(&token),
            Some(serde_json::json!({"notificationEnabled": false})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_update_rejects_unknown_keys() {
    let app = spawn_app().await;
    let token = app.token("sub-1");
    app.request("POST", "/api/auth/login-sync", Some(&token), None)
        .await;

    let (status, _) = app
        .request(
            "PUT",
            "/api/users/settings",
            Some(&token),
            Some(serde_json::json!({"notificationEnabled": true, "alertFrequency": "daily"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn settings_update_toggles_preference() {
    let app = spawn_app().await;
    let token = app.token("sub-1");
    app.request("POST", "/api/auth/login-sync", Some(&token), None)
        .await;

    let (status, body) = app
        .request(
            "PUT",
            "/api/users/settings",
            Some(&token),
            Some(serde_json::json!({"notificationEnabled": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["notificationEnabled"], false);

    let (status, body) = app
        .request("GET", "/api/users/settings", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["notificationEnabled"], false);
}

#[tokio::test]
async fn history_is_204_when_empty_and_200_with_entries() {
    let app = spawn_app().await;
    let token = app.token("sub-1");
    app.request("POST", "/api/auth/login-sync", Some(&token), None)
        .await;

    let (status, _) = app
        .request("GET", "/api/notifications/history", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let repo = SqlxNotificationRepository::new(app.pool.clone());
    repo.save(&NotificationDbModel::new("Apophis", None, "31000", 335.0, "N/A"))
        .await
        .unwrap();

    let (status, body) = app
        .request("GET", "/api/notifications/history", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let body = body.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["asteroidName"], "Apophis");
    assert_eq!(body[0]["emailSent"], false);
}

#[tokio::test]
async fn history_for_unknown_user_is_204() {
    let app = spawn_app().await;
    let token = app.token("ghost");

    let (status, _) = app
        .request("GET", "/api/notifications/history", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn notification_detail_200_and_404() {
    let app = spawn_app().await;
    let token = app.token("sub-1");

    let repo = SqlxNotificationRepository::new(app.pool.clone());
    let id = repo
        .save(&NotificationDbModel::new("Apophis", None, "31000", 335.0, "N/A"))
        .await
        .unwrap();

    let (status, body) = app
        .request(
            "GET",
            &format!("/api/notifications/{}", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["asteroidName"], "Apophis");

    let (status, _) = app
        .request("GET", "/api/notifications/9999", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
