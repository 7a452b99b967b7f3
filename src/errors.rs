//! View-model errors

use thiserror::Error;

use crate::{carts::CartId, repositories::RepositoryError, selection::SelectionError};

/// Errors surfaced by the cart view models.
///
/// All of them are recoverable: the snapshot is left as it was before the
/// failing action.
#[derive(Debug, Error)]
pub enum CartError {
    /// The action needs a different selection state.
    #[error("invalid state: {0}")]
    InvalidState(#[from] SelectionError),

    /// The action needs a loaded cart.
    #[error("no cart is loaded")]
    NoCartLoaded,

    /// The cart is not pending, so its lines and the cart itself are read-only.
    #[error("cart is not pending")]
    CartNotPending,

    /// The line belongs to another cart than the loaded one.
    #[error("line does not belong to cart {0}")]
    LineNotInCart(CartId),

    /// Searching is disabled while an existing line is edited.
    #[error("search is disabled")]
    SearchDisabled,

    /// The search field is blank.
    #[error("search text must not be empty")]
    EmptySearch,

    /// No cart with this id.
    #[error("cart {0} not found")]
    CartNotFound(CartId),

    /// Storage failed.
    #[error("data unavailable")]
    DataUnavailable(#[from] RepositoryError),
}
