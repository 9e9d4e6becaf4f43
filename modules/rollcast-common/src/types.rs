use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RollcastError;

/// A recipient chain account identifier.
///
/// Addresses are case-normalized on construction so that two textually-equal
/// addresses always resolve to the same conversation channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How notifications for an event kind reach their recipients.
///
/// `Broadcast` fans out to every registered subscriber of the event's
/// category; `Direct` delivers straight to the action's originating address,
/// bypassing the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Broadcast,
    Direct,
}

impl FromStr for DeliveryMode {
    type Err = RollcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "broadcast" => Ok(Self::Broadcast),
            "direct" => Ok(Self::Direct),
            other => Err(RollcastError::Config(format!(
                "unknown delivery mode '{other}' (expected 'broadcast' or 'direct')"
            ))),
        }
    }
}
