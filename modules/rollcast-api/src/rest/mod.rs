use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};

use rollcast_common::{Address, LifecycleEvent};

use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub event_type: String,
    pub address: String,
}

impl SubscriptionRequest {
    /// Reject blank fields; registry semantics are otherwise unconditional.
    fn validate(&self) -> Result<(String, Address), &'static str> {
        let event_type = self.event_type.trim();
        if event_type.is_empty() {
            return Err("eventType must be non-empty");
        }
        let address = Address::new(&self.address);
        if address.is_empty() {
            return Err("address must be non-empty");
        }
        Ok((event_type.to_string(), address))
    }
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubscriptionRequest>,
) -> impl IntoResponse {
    let (event_type, address) = match body.validate() {
        Ok(fields) => fields,
        Err(reason) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": reason})),
            )
                .into_response();
        }
    };

    info!(event_type, address = %address, "Subscription added");
    state.registry.subscribe(&event_type, address).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({"message": "Subscribed successfully"})),
    )
        .into_response()
}

pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubscriptionRequest>,
) -> impl IntoResponse {
    let (event_type, address) = match body.validate() {
        Ok(fields) => fields,
        Err(reason) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": reason})),
            )
                .into_response();
        }
    };

    // 200 regardless of whether the subscription existed.
    state.registry.unsubscribe(&event_type, &address).await;

    (
        StatusCode::OK,
        Json(serde_json::json!({"message": "Unsubscribed successfully"})),
    )
        .into_response()
}

/// Engine boundary: lifecycle events are queued for the bridge. Delivery
/// outcomes are invisible to the caller.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<LifecycleEvent>,
) -> impl IntoResponse {
    match state.engine_events.try_send(event) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"status": "accepted"})),
        )
            .into_response(),
        Err(TrySendError::Full(_)) => {
            warn!("Engine event queue full, rejecting event");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "event queue full"})),
            )
                .into_response()
        }
        Err(TrySendError::Closed(_)) => {
            warn!("Engine event intake is down, rejecting event");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "event intake unavailable"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::sync::mpsc;

    use rollcast_common::{ActionRecord, EventKind};
    use rollcast_notify::SubscriptionRegistry;

    fn test_state(queue_capacity: usize) -> (Arc<AppState>, mpsc::Receiver<LifecycleEvent>) {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let state = Arc::new(AppState {
            registry: Arc::new(SubscriptionRegistry::new()),
            engine_events: tx,
        });
        (state, rx)
    }

    fn request(event_type: &str, address: &str) -> SubscriptionRequest {
        SubscriptionRequest {
            event_type: event_type.to_string(),
            address: address.to_string(),
        }
    }

    #[tokio::test]
    async fn subscribe_registers_the_address() {
        let (state, _rx) = test_state(4);

        let resp = subscribe(State(state.clone()), Json(request("action-submitted", "0xAAA")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let recipients = state.registry.recipients_of("action-submitted").await;
        assert_eq!(recipients, vec![Address::new("0xaaa")]);
    }

    #[tokio::test]
    async fn subscribe_rejects_blank_fields() {
        let (state, _rx) = test_state(4);

        let resp = subscribe(State(state.clone()), Json(request("  ", "0xaaa")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = subscribe(State(state), Json(request("action-submitted", "")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unsubscribe_is_200_even_when_nothing_was_subscribed() {
        let (state, _rx) = test_state(4);

        let resp = unsubscribe(State(state), Json(request("action-submitted", "0xaaa")))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ingest_queues_the_event() {
        let (state, mut rx) = test_state(4);
        let event = LifecycleEvent {
            kind: EventKind::ActionSubmitted,
            action: ActionRecord {
                name: "transfer".to_string(),
                hash: None,
                sender: None,
                inputs: serde_json::Value::Null,
                status: None,
            },
        };

        let resp = ingest_event(State(state), Json(event)).await.into_response();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let queued = rx.recv().await.unwrap();
        assert_eq!(queued.kind, EventKind::ActionSubmitted);
    }

    #[tokio::test]
    async fn ingest_returns_503_when_the_queue_is_full() {
        let (state, _rx) = test_state(1);
        let event = || LifecycleEvent {
            kind: EventKind::ActionSubmitted,
            action: ActionRecord {
                name: "transfer".to_string(),
                hash: None,
                sender: None,
                inputs: serde_json::Value::Null,
                status: None,
            },
        };

        let first = ingest_event(State(state.clone()), Json(event())).await.into_response();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = ingest_event(State(state), Json(event())).await.into_response();
        assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
