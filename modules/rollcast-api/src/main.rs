use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rollcast_common::{Config, LifecycleEvent};
use rollcast_notify::{
    ChannelCache, EventBridge, Notifier, RouteTable, SubscriptionRegistry, XmtpTransport,
};
use xmtp::XmtpClient;

mod rest;

pub struct AppState {
    pub registry: Arc<SubscriptionRegistry>,
    pub engine_events: mpsc::Sender<LifecycleEvent>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rollcast=info".parse()?))
        .init();

    info!("Rollcast starting...");

    let config = Config::from_env();

    // Messaging transport
    let client = XmtpClient::new(config.xmtp_gateway_url.clone(), config.xmtp_api_token.clone());
    let transport = Arc::new(XmtpTransport::new(client));
    info!("XMTP gateway client initialized");

    // Core services, constructed once and passed by reference
    let registry = Arc::new(SubscriptionRegistry::new());
    let channels = Arc::new(ChannelCache::new(
        transport,
        config.establish_timeout,
        config.send_timeout,
    ));
    let notifier = Arc::new(Notifier::new(registry.clone(), channels));

    // Engine event intake
    let (engine_events, engine_rx) = mpsc::channel(config.engine_queue_capacity);
    let bridge = Arc::new(EventBridge::new(notifier, RouteTable::from_config(&config)));
    bridge.spawn(engine_rx);

    let state = Arc::new(AppState {
        registry,
        engine_events,
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Subscription management
        .route("/subscribe", post(rest::subscribe))
        .route("/unsubscribe", post(rest::unsubscribe))
        // Engine boundary
        .route("/engine/events", post(rest::ingest_event))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Rollcast API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
