use std::env;
use std::time::Duration;

use crate::types::DeliveryMode;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // XMTP gateway
    pub xmtp_gateway_url: String,
    pub xmtp_api_token: String,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Delivery routing per event kind
    pub route_action_submitted: DeliveryMode,
    pub route_execution_status: DeliveryMode,

    // Delivery bounds
    pub establish_timeout: Duration,
    pub send_timeout: Duration,

    // Engine event intake
    pub engine_queue_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or malformed.
    pub fn from_env() -> Self {
        Self {
            xmtp_gateway_url: required_env("XMTP_GATEWAY_URL"),
            xmtp_api_token: required_env("XMTP_API_TOKEN"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            route_action_submitted: delivery_mode_env("ROUTE_ACTION_SUBMITTED"),
            route_execution_status: delivery_mode_env("ROUTE_EXECUTION_STATUS"),
            establish_timeout: Duration::from_secs(secs_env("ESTABLISH_TIMEOUT_SECS", 15)),
            send_timeout: Duration::from_secs(secs_env("SEND_TIMEOUT_SECS", 10)),
            engine_queue_capacity: env::var("ENGINE_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "256".to_string())
                .parse()
                .expect("ENGINE_QUEUE_CAPACITY must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn delivery_mode_env(key: &str) -> DeliveryMode {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|e| panic!("{key}: {e}")),
        Err(_) => DeliveryMode::Broadcast,
    }
}

fn secs_env(key: &str, default: u64) -> u64 {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{key} must be a number of seconds"))
}
