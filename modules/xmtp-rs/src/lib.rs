//! Thin client for an XMTP node gateway's HTTP API.
//!
//! The gateway owns the messaging session and key material; this client only
//! creates conversations and posts messages into them.

pub mod error;
pub mod models;

pub use error::{Result, XmtpError};
pub use models::{Conversation, SentMessage};

use serde_json::json;
use tracing::warn;

/// Check that a string looks like a chain account address (0x + 40 hex chars).
fn is_chain_address(identifier: &str) -> bool {
    identifier.len() == 42
        && identifier.starts_with("0x")
        && identifier[2..].chars().all(|c| c.is_ascii_hexdigit())
}

pub struct XmtpClient {
    http: reqwest::Client,
    gateway_url: String,
    api_token: String,
}

impl XmtpClient {
    pub fn new(gateway_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let gateway_url = gateway_url.into();
        Self {
            http: reqwest::Client::new(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        }
    }

    /// Open (or resume) a conversation with a peer address.
    /// The gateway returns the same topic for repeat calls with one peer.
    pub async fn create_conversation(&self, peer_address: &str) -> Result<Conversation> {
        if !is_chain_address(peer_address) {
            return Err(XmtpError::InvalidAddress(peer_address.to_string()));
        }

        let url = format!("{}/v1/conversations", self.gateway_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&json!({ "peer_address": peer_address }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "XMTP gateway rejected conversation request");
            return Err(XmtpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json::<Conversation>().await?)
    }

    /// Post a message into an existing conversation topic.
    pub async fn send_message(&self, topic: &str, content: &str) -> Result<SentMessage> {
        let url = format!("{}/v1/messages", self.gateway_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&json!({ "topic": topic, "content": content }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "XMTP gateway rejected message");
            return Err(XmtpError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json::<SentMessage>().await?)
    }
}
