use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use rollcast_common::{Config, DeliveryMode, EventKind, LifecycleEvent};

use crate::notifier::Notifier;

/// Delivery mode per event kind. Configuration, not hardwired branching: each
/// kind can independently broadcast to subscribers or go straight to the
/// action's originating address.
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    pub action_submitted: DeliveryMode,
    pub execution_status: DeliveryMode,
}

impl RouteTable {
    pub fn from_config(config: &Config) -> Self {
        Self {
            action_submitted: config.route_action_submitted,
            execution_status: config.route_execution_status,
        }
    }

    pub fn mode_for(&self, kind: EventKind) -> DeliveryMode {
        match kind {
            EventKind::ActionSubmitted => self.action_submitted,
            EventKind::ExecutionStatusChanged => self.execution_status,
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            action_submitted: DeliveryMode::Broadcast,
            execution_status: DeliveryMode::Broadcast,
        }
    }
}

/// Render the deterministic message body for a lifecycle event.
pub fn render_message(event: &LifecycleEvent) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string(&event.action)?;
    Ok(match event.kind {
        EventKind::ActionSubmitted => format!("Action submitted: {payload}"),
        EventKind::ExecutionStatusChanged => format!("Execution status updated: {payload}"),
    })
}

/// Consumes the engine's lifecycle event stream and turns each event into
/// notifications.
pub struct EventBridge {
    notifier: Arc<Notifier>,
    routes: RouteTable,
}

impl EventBridge {
    pub fn new(notifier: Arc<Notifier>, routes: RouteTable) -> Self {
        Self { notifier, routes }
    }

    /// Start the intake loop. Each event is handed to its own task, so one
    /// slow or failing delivery never stalls intake of subsequent events. The
    /// loop ends when the sender side is dropped.
    pub fn spawn(self: Arc<Self>, mut events: mpsc::Receiver<LifecycleEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let bridge = Arc::clone(&self);
                tokio::spawn(async move {
                    bridge.handle_event(event).await;
                });
            }
            info!("Engine event stream closed");
        })
    }

    /// Process one event: render, route, deliver. Failures are logged and the
    /// event dropped; nothing escapes to the intake loop.
    pub async fn handle_event(&self, event: LifecycleEvent) {
        let category = event.kind.category();

        let message = match render_message(&event) {
            Ok(message) => message,
            Err(e) => {
                warn!(category, error = %e, "Unrenderable event payload, dropping");
                return;
            }
        };

        match self.routes.mode_for(event.kind) {
            DeliveryMode::Broadcast => {
                let outcomes = self.notifier.notify_all(category, &message).await;
                let failed = outcomes.iter().filter(|o| !o.delivered()).count();
                info!(
                    category,
                    recipients = outcomes.len(),
                    failed,
                    "Broadcast complete"
                );
            }
            DeliveryMode::Direct => {
                let Some(sender) = event.action.sender else {
                    warn!(category, "Event carries no originating address, dropping");
                    return;
                };
                if let Err(e) = self.notifier.notify_one(&sender, &message).await {
                    warn!(recipient = %sender, category, error = %e, "Direct notification failed");
                }
            }
        }
    }
}
