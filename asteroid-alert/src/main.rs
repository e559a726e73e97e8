use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asteroid_alert::alert::scheduler::AlertScheduler;
use asteroid_alert::alert::AlertProducer;
use asteroid_alert::api::jwt::JwtVerifier;
use asteroid_alert::api::{ApiServer, ApiServerConfig, AppState};
use asteroid_alert::config::AppConfig;
use asteroid_alert::consumer::AlertConsumer;
use asteroid_alert::database;
use asteroid_alert::database::repositories::{SqlxNotificationRepository, SqlxUserRepository};
use asteroid_alert::dispatch::scheduler::DigestScheduler;
use asteroid_alert::dispatch::Dispatcher;
use asteroid_alert::feed::NasaNeoClient;
use asteroid_alert::mail::{HttpMailer, MailRelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asteroid_alert=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env_or_default()?;

    // Initialize database
    let pool = database::init_pool(&config.database_url).await?;
    database::run_migrations(&pool).await?;

    let cancel_token = CancellationToken::new();

    let notification_repo = Arc::new(SqlxNotificationRepository::new(pool.clone()));
    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));

    // Producer flow: feed -> hazard filter -> event mapper -> topic.
    let http_client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let feed_client = Arc::new(NasaNeoClient::new(
        config.feed_base_url.clone(),
        config.feed_api_key.clone(),
        http_client,
    ));
    let producer = Arc::new(AlertProducer::new(feed_client, pool.clone()));
    AlertScheduler::new(
        producer,
        config.alert_interval,
        config.alert_window_days,
        cancel_token.clone(),
    )
    .spawn();

    // Ingestion flow: topic -> notification store.
    AlertConsumer::new(pool.clone(), config.topic_poll_interval, cancel_token.clone()).spawn();

    // Dispatch flow: notification store -> digest -> mail transport.
    let mailer = Arc::new(HttpMailer::new(MailRelayConfig {
        url: config.mail_relay_url.clone(),
        token: config.mail_relay_token.clone(),
        from_address: config.mail_from_address.clone(),
        timeout: config.request_timeout,
    }));
    let dispatcher = Arc::new(Dispatcher::new(
        notification_repo.clone(),
        user_repo.clone(),
        mailer,
    ));
    DigestScheduler::new(dispatcher, config.digest_interval, cancel_token.clone()).spawn();

    // User-facing surface.
    let jwt_verifier = config.jwt_secret.as_deref().map(|s| Arc::new(JwtVerifier::new(s)));
    if jwt_verifier.is_none() {
        tracing::warn!("JWT_SECRET not set; authenticated endpoints will reject all requests");
    }
    let state = AppState::new(jwt_verifier, notification_repo, user_repo);
    let server = ApiServer::new(
        ApiServerConfig {
            bind_address: config.bind_address.clone(),
            port: config.port,
            enable_cors: true,
        },
        state,
        cancel_token.clone(),
    );

    // Shutdown on ctrl-c.
    tokio::spawn({
        let cancel_token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                cancel_token.cancel();
            }
        }
    });

    tracing::info!("asteroid-alert initialized successfully");
    server.run().await?;

    Ok(())
}
