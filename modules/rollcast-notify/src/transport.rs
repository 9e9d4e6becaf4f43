use async_trait::async_trait;

use rollcast_common::Address;
use xmtp::XmtpClient;

/// Opaque handle to an established conversation on the transport side.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    pub topic: String,
}

/// Pluggable messaging transport for channel establishment and delivery.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    /// Establish a communication path to one address. Blocking network
    /// operation; the cache guarantees it runs at most once per address.
    async fn establish(&self, address: &Address) -> anyhow::Result<ChannelHandle>;

    /// Deliver one message into an established channel.
    async fn send(&self, channel: &ChannelHandle, body: &str) -> anyhow::Result<()>;
}

/// Production transport backed by an XMTP node gateway.
pub struct XmtpTransport {
    client: XmtpClient,
}

impl XmtpTransport {
    pub fn new(client: XmtpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChannelTransport for XmtpTransport {
    async fn establish(&self, address: &Address) -> anyhow::Result<ChannelHandle> {
        let conversation = self.client.create_conversation(address.as_str()).await?;
        Ok(ChannelHandle {
            topic: conversation.topic,
        })
    }

    async fn send(&self, channel: &ChannelHandle, body: &str) -> anyhow::Result<()> {
        self.client.send_message(&channel.topic, body).await?;
        Ok(())
    }
}
