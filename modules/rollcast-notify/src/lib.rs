//! Subscription registry and notification fan-out for rollup lifecycle events.
//!
//! The pieces compose in one direction: the bridge consumes engine events and
//! calls the notifier; the notifier resolves recipients from the registry and
//! channels from the cache; the cache talks to the messaging transport.

pub mod bridge;
pub mod channels;
pub mod error;
pub mod notifier;
pub mod registry;
pub mod transport;

pub use bridge::{render_message, EventBridge, RouteTable};
pub use channels::{Channel, ChannelCache};
pub use error::NotifyError;
pub use notifier::{DeliveryOutcome, Notifier};
pub use registry::SubscriptionRegistry;
pub use transport::{ChannelHandle, ChannelTransport, XmtpTransport};
