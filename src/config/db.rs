//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `SQLite` connection string
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://pasionaria.db?mode=rwc"
    )]
    pub database_url: String,
}
