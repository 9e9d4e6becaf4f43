use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use rollcast_common::Address;

use crate::channels::ChannelCache;
use crate::error::NotifyError;
use crate::registry::SubscriptionRegistry;

/// Per-recipient result of a fan-out. Collected and logged, never escalated.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub address: Address,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Delivers event-derived messages to recipients over cached channels.
pub struct Notifier {
    registry: Arc<SubscriptionRegistry>,
    channels: Arc<ChannelCache>,
}

impl Notifier {
    pub fn new(registry: Arc<SubscriptionRegistry>, channels: Arc<ChannelCache>) -> Self {
        Self { registry, channels }
    }

    /// Deliver one message to one address, establishing its channel if needed.
    /// Errors propagate to the immediate caller.
    pub async fn notify_one(&self, address: &Address, message: &str) -> Result<(), NotifyError> {
        let channel = self.channels.get_or_create(address).await?;
        channel.send(message).await
    }

    /// Fan a message out to every current subscriber of a category.
    ///
    /// Recipients are snapshotted up front and dispatched concurrently. Each
    /// failure is logged with the recipient's identity and recorded in its
    /// outcome; it never prevents attempts to the remaining recipients, and
    /// there is no aggregate error.
    pub async fn notify_all(&self, category: &str, message: &str) -> Vec<DeliveryOutcome> {
        let recipients = self.registry.recipients_of(category).await;

        let deliveries = recipients.into_iter().map(|address| async move {
            match self.notify_one(&address, message).await {
                Ok(()) => DeliveryOutcome {
                    address,
                    error: None,
                },
                Err(e) => {
                    warn!(recipient = %address, category, error = %e, "Delivery failed");
                    DeliveryOutcome {
                        address,
                        error: Some(e.to_string()),
                    }
                }
            }
        });

        join_all(deliveries).await
    }
}
