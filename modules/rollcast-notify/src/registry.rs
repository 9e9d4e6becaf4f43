use std::collections::HashMap;

use tokio::sync::Mutex;

use rollcast_common::Address;

/// Tracks which addresses want which event categories.
///
/// Categories are open strings; the registry tracks whichever ones have seen a
/// subscribe call. Duplicate subscriptions are kept as-is, and unsubscribe
/// removes one occurrence, so the recipient sequence is the net multiset of
/// calls in insertion order.
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: Mutex<HashMap<String, Vec<Address>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an address to a category's recipient sequence. Never fails.
    pub async fn subscribe(&self, category: &str, address: Address) {
        let mut subscriptions = self.subscriptions.lock().await;
        subscriptions
            .entry(category.to_string())
            .or_default()
            .push(address);
    }

    /// Remove the first occurrence of an address from a category, if present.
    /// A no-op for unknown categories or addresses.
    pub async fn unsubscribe(&self, category: &str, address: &Address) {
        let mut subscriptions = self.subscriptions.lock().await;
        if let Some(recipients) = subscriptions.get_mut(category) {
            if let Some(index) = recipients.iter().position(|r| r == address) {
                recipients.remove(index);
            }
        }
    }

    /// Snapshot of the current recipient sequence for a category, in insertion
    /// order. Unknown categories yield an empty sequence. An in-flight fan-out
    /// iterates this snapshot while concurrent calls mutate the live sequence.
    pub async fn recipients_of(&self, category: &str) -> Vec<Address> {
        let subscriptions = self.subscriptions.lock().await;
        subscriptions.get(category).cloned().unwrap_or_default()
    }
}
