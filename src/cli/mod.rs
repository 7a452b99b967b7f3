use std::{io, sync::Arc};

use clap::{Parser, Subcommand};
use pasionaria::{
    config::{DatabaseConfig, LoggingConfig, SessionArgs, SessionConfig},
    observability::{self, ObservabilityError},
    repositories::SqliteStore,
};

mod carts;
mod catalog;
mod output;

#[derive(Debug, Parser)]
#[command(name = "pasionaria", about = "Pasionaria cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    database: DatabaseConfig,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the catalog fixture into the database
    Seed,

    /// List or search products
    Products(catalog::ProductsArgs),

    /// List units
    Units,

    /// Price a line without storing it
    Quote(catalog::QuoteArgs),

    /// List carts by status
    Carts(carts::CartsArgs),

    /// Create a pending cart for the configured seller
    NewCart,

    /// Add a product to a cart, or change its quantity if already there
    Add(carts::AddArgs),

    /// Remove a line from a cart
    Remove(carts::RemoveArgs),
}

/// Everything a command needs.
#[derive(Debug)]
pub(crate) struct Context {
    store: Arc<SqliteStore>,
    session: SessionArgs,
}

impl Context {
    fn session_config(&self) -> SessionConfig {
        SessionConfig::from(&self.session).without_focus_delay()
    }
}

impl Cli {
    pub(crate) fn init_logging(&self) -> Result<(), ObservabilityError> {
        observability::init_subscriber(&self.logging)
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let store = SqliteStore::connect(&self.database.database_url)
            .await
            .map_err(|error| format!("failed to open database: {error}"))?;

        let context = Context {
            store: Arc::new(store),
            session: self.session,
        };

        let stdout = io::stdout();
        let mut out = stdout.lock();

        let result = match self.command {
            Commands::Seed => catalog::seed(&context, &mut out).await,
            Commands::Products(args) => catalog::products(args, &context, &mut out).await,
            Commands::Units => catalog::units(&context, &mut out).await,
            Commands::Quote(args) => catalog::quote(args, &context, &mut out).await,
            Commands::Carts(args) => carts::list(args, &context, &mut out).await,
            Commands::NewCart => carts::create(&context, &mut out).await,
            Commands::Add(args) => carts::add(args, &context, &mut out).await,
            Commands::Remove(args) => carts::remove(args, &context, &mut out).await,
        };

        context.store.close().await;

        result
    }
}
