// config.rs
use anyhow::Context;

const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub max_connections: u32,
    // Push delivery
    pub fcm_endpoint: String,
    pub fcm_server_key: Option<String>,
    // Real-time call provider
    pub zego_app_id: Option<u32>,
    pub zego_server_secret: Option<String>,
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn init() -> anyhow::Result<Config> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY must be set")?;

        let port = match optional("PORT") {
            Some(port) => port.parse::<u16>().context("PORT must be a valid port number")?,
            None => 5000,
        };
        let max_connections = match optional("DATABASE_MAX_CONNECTIONS") {
            Some(max) => max
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => 10,
        };

        let fcm_endpoint = optional("FCM_ENDPOINT").unwrap_or_else(|| DEFAULT_FCM_ENDPOINT.to_string());
        let fcm_server_key = optional("FCM_SERVER_KEY");

        // A malformed app id is reported at token issuance, like a missing one
        let zego_app_id = optional("ZEGO_APP_ID").and_then(|id| id.parse::<u32>().ok());
        let zego_server_secret = optional("ZEGO_SERVER_SECRET");

        if fcm_server_key.is_none() {
            tracing::warn!("FCM_SERVER_KEY is not set, push notifications will not be delivered");
        }

        Ok(Config {
            database_url,
            jwt_secret,
            port,
            max_connections,
            fcm_endpoint,
            fcm_server_key,
            zego_app_id,
            zego_server_secret,
        })
    }
}
