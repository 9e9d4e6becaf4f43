//! Lifecycle events emitted by the external rollup engine.
//!
//! The engine reports two facts about an action: it was submitted, and its
//! execution status changed. Each carries the action record verbatim; the
//! notify layer serializes it into the message body without interpreting it.

use serde::{Deserialize, Serialize};

use crate::types::Address;

/// The two lifecycle event kinds observed from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ActionSubmitted,
    ExecutionStatusChanged,
}

impl EventKind {
    /// The subscription category tag for this event kind.
    pub fn category(&self) -> &'static str {
        match self {
            Self::ActionSubmitted => "action-submitted",
            Self::ExecutionStatusChanged => "execution-status-changed",
        }
    }
}

/// An action as reported by the engine. Inputs are opaque JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// The originating address, when the engine includes one. Required for
    /// direct-mode delivery; broadcast delivery works without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,

    #[serde(default)]
    pub inputs: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One engine lifecycle event, consumed by the bridge and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: EventKind,
    pub action: ActionRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_kind_categories() {
        assert_eq!(EventKind::ActionSubmitted.category(), "action-submitted");
        assert_eq!(
            EventKind::ExecutionStatusChanged.category(),
            "execution-status-changed"
        );
    }

    #[test]
    fn lifecycle_event_deserializes_with_optional_fields_absent() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "kind": "action_submitted",
            "action": { "name": "transfer" }
        }))
        .unwrap();

        assert_eq!(event.kind, EventKind::ActionSubmitted);
        assert_eq!(event.action.name, "transfer");
        assert!(event.action.sender.is_none());
        assert!(event.action.hash.is_none());
    }

    #[test]
    fn sender_address_is_normalized_on_deserialize() {
        let event: LifecycleEvent = serde_json::from_value(json!({
            "kind": "execution_status_changed",
            "action": { "name": "mint", "sender": "0xFFF", "status": "ACCEPTED" }
        }))
        .unwrap();

        assert_eq!(event.action.sender.unwrap().as_str(), "0xfff");
    }
}
