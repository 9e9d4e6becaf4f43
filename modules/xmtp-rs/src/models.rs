use serde::{Deserialize, Serialize};

/// An established conversation with one peer address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Gateway topic identifier, used to address subsequent sends.
    pub topic: String,

    #[serde(default)]
    pub peer_address: String,
}

/// Acknowledgement for a sent message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentMessage {
    pub id: String,
}
