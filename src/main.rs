mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;
#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::{DBClient, Store};
use dotenv::dotenv;
use routes::create_router;
use service::{
    activity_service::ActivityService, background::BackgroundTasks, call_service::CallService,
    fcm::FcmClient, notification_service::NotificationService, referral::ReferralService,
    signaling::SignalingTokenIssuer,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn Store>,
    pub tasks: BackgroundTasks,
    pub notifications: Arc<NotificationService>,
    pub activity: ActivityService,
    pub calls: CallService,
    pub referrals: ReferralService,
    pub signaling: SignalingTokenIssuer,
}

impl AppState {
    pub fn new(env: Config, db_client: Arc<dyn Store>) -> Self {
        let tasks = BackgroundTasks::new();
        let push = Arc::new(FcmClient::new(&env));
        let notifications = Arc::new(NotificationService::new(db_client.clone(), push, tasks.clone()));
        let activity = ActivityService::new(db_client.clone(), tasks.clone());
        let calls = CallService::new(db_client.clone(), activity.clone(), notifications.clone());
        let referrals = ReferralService::new(db_client.clone());
        let signaling = SignalingTokenIssuer::from_config(&env);

        AppState {
            env,
            db_client,
            tasks,
            notifications,
            activity,
            calls,
            referrals,
            signaling,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init()?;

    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations").run(&pool).await?;

    let allowed_origins = [
        "http://localhost:3000".parse::<HeaderValue>()?,
        "http://localhost:5173".parse::<HeaderValue>()?,
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH]);

    let db_client: Arc<dyn Store> = Arc::new(DBClient::new(pool));
    let app_state = Arc::new(AppState::new(config.clone(), db_client));
    let tasks = app_state.tasks.clone();

    let app = create_router(app_state).layer(cors);

    tracing::info!("Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-flight pushes and activity writes finish
    tasks.drain().await;

    Ok(())
}
