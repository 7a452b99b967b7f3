//! Session Config

use std::{path::PathBuf, time::Duration};

use clap::Args;

use crate::config::{DEFAULT_SELLER, SessionConfig};

/// Seller session settings.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Username recorded as the seller of new carts
    #[arg(long, env = "SELLER_USERNAME", default_value = DEFAULT_SELLER)]
    pub seller: String,

    /// Milliseconds to wait before focusing the quantity field
    #[arg(long, env = "FOCUS_DELAY_MS", default_value_t = 1_000_u64)]
    pub focus_delay_ms: u64,

    /// Catalog fixture used by `seed`
    #[arg(long, env = "FIXTURES_PATH", default_value = "fixtures/catalog.yml")]
    pub fixtures_path: PathBuf,
}

impl From<&SessionArgs> for SessionConfig {
    fn from(args: &SessionArgs) -> Self {
        Self {
            seller: args.seller.clone(),
            focus_delay: Duration::from_millis(args.focus_delay_ms),
        }
    }
}
