//! Repositories
//!
//! Storage collaborators used by the view models.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    carts::{Cart, CartId, CartStatus, ProductCart, ProductCartId},
    products::{Product, ProductId, ProductWithUnit},
    units::Unit,
};

mod sqlite;

pub use sqlite::SqliteStore;

/// Storage errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The record does not exist.
    #[error("record not found")]
    NotFound,

    /// The write referenced a missing row or broke a constraint.
    #[error("invalid data")]
    InvalidData(#[source] Error),

    /// Any other storage failure.
    #[error("storage error")]
    Storage(#[source] Error),
}

impl From<Error> for RepositoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation,
            ) => Self::InvalidData(error),
            Some(ErrorKind::Other | _) | None => Self::Storage(error),
        }
    }
}

/// Catalog access.
#[automock]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product with its unit.
    async fn list_all(&self) -> Result<Vec<ProductWithUnit>, RepositoryError>;

    /// Products whose name contains `text`, ignoring case.
    async fn search(&self, text: &str) -> Result<Vec<ProductWithUnit>, RepositoryError>;

    /// A single product, if it exists.
    async fn get_by_id(&self, id: ProductId) -> Result<Option<ProductWithUnit>, RepositoryError>;

    /// Every unit.
    async fn list_units(&self) -> Result<Vec<Unit>, RepositoryError>;

    /// Insert or replace units by id.
    async fn save_units(&self, units: &[Unit]) -> Result<(), RepositoryError>;

    /// Insert or replace products by id.
    async fn save_products(&self, products: &[Product]) -> Result<(), RepositoryError>;
}

/// Cart and line item access.
#[automock]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Insert a line without an id or replace the stored one, refreshing the
    /// owning cart's total. Returns the line's id.
    async fn upsert_line_item(&self, line: &ProductCart) -> Result<ProductCartId, RepositoryError>;

    /// Delete a stored line, refreshing the owning cart's total.
    async fn delete_line_item(&self, line: &ProductCart) -> Result<(), RepositoryError>;

    /// Carts in any of `statuses`, newest first, without their lines.
    async fn list_carts_by_status(
        &self,
        statuses: &[CartStatus],
    ) -> Result<Vec<Cart>, RepositoryError>;

    /// A cart with its lines, if it exists.
    async fn get_cart_with_lines(&self, id: CartId) -> Result<Option<Cart>, RepositoryError>;

    /// Insert a cart without an id or replace the stored one. Returns the cart's id.
    async fn upsert_cart(&self, cart: &Cart) -> Result<CartId, RepositoryError>;

    /// Delete a stored cart and its lines.
    async fn delete_cart(&self, cart: &Cart) -> Result<(), RepositoryError>;
}
