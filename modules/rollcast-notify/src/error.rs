use rollcast_common::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("channel establishment failed for {address}: {reason}")]
    Establish { address: Address, reason: String },

    #[error("send to {address} failed: {reason}")]
    Send { address: Address, reason: String },
}
