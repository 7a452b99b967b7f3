//! Configuration

use std::time::Duration;

pub mod db;
pub mod observability;
pub mod session;

pub use db::DatabaseConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use session::SessionArgs;

/// Default seller recorded on new carts.
pub const DEFAULT_SELLER: &str = "mostrador";

/// Default delay before the quantity field takes focus.
pub const DEFAULT_FOCUS_DELAY: Duration = Duration::from_secs(1);

/// Runtime settings the view models need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Username recorded as the seller of new carts
    pub seller: String,

    /// Delay between a state change and the focus request it causes
    pub focus_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seller: DEFAULT_SELLER.to_string(),
            focus_delay: DEFAULT_FOCUS_DELAY,
        }
    }
}

impl SessionConfig {
    /// Same settings with focus requests delivered immediately.
    #[must_use]
    pub fn without_focus_delay(self) -> Self {
        Self {
            focus_delay: Duration::ZERO,
            ..self
        }
    }
}
