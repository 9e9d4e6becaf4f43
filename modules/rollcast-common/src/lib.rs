pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::Config;
pub use error::RollcastError;
pub use events::{ActionRecord, EventKind, LifecycleEvent};
pub use types::{Address, DeliveryMode};
