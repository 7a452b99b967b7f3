//! Line selection
//!
//! The line currently being added to or edited in a cart moves through
//! `Empty -> Selected -> Priced`. Every transition is a pure function of the
//! current selection; a failed transition leaves the caller's value untouched.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    carts::{CartId, ProductCart, ProductCartWithData},
    pricing::{format_currency, line_total, parse_quantity},
    products::ProductWithUnit,
};

/// Errors from selection transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The transition needs a selected product.
    #[error("no product is selected")]
    NothingSelected,

    /// Only positive quantities can be committed.
    #[error("quantity must be greater than zero")]
    QuantityNotPositive,
}

/// The in-progress line item.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    /// No product chosen.
    #[default]
    Empty,

    /// A product is chosen; its total may be stale.
    Selected(ProductCartWithData),

    /// The total matches the current quantity.
    Priced(ProductCartWithData),
}

impl Selection {
    /// Start a fresh line for `product`, discarding whatever was selected.
    pub fn select(product: ProductWithUnit, cart: Option<CartId>) -> Self {
        Self::Selected(ProductCartWithData {
            line: ProductCart::new(cart, product.id()),
            product,
        })
    }

    /// Select an existing line for editing.
    pub fn edit(line: ProductCartWithData) -> Self {
        Self::Selected(line)
    }

    /// The selected line, if any.
    pub fn current(&self) -> Option<&ProductCartWithData> {
        match self {
            Self::Empty => None,
            Self::Selected(line) | Self::Priced(line) => Some(line),
        }
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Replace the typed quantity verbatim. The total is left as is.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NothingSelected`] when no product is selected.
    pub fn with_quantity(&self, text: impl Into<String>) -> Result<Self, SelectionError> {
        let mut line = self.require()?.clone();
        line.line.quantity = text.into();

        Ok(Self::Selected(line))
    }

    /// Recompute the line total for the current quantity.
    ///
    /// Returns the priced selection and the formatted total.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NothingSelected`] when no product is selected.
    pub fn priced(&self) -> Result<(Self, String), SelectionError> {
        let mut line = self.require()?.clone();
        line.line.total_price = line_total(&line);

        let formatted = format_currency(line.line.total_price);

        Ok((Self::Priced(line), formatted))
    }

    /// Whether the selection can be added to the cart.
    pub fn can_commit(&self) -> bool {
        self.current()
            .is_some_and(|line| parse_quantity(&line.line.quantity) > Decimal::ZERO)
    }

    /// The line to persist, priced at its current quantity.
    ///
    /// # Errors
    ///
    /// - [`SelectionError::NothingSelected`] when no product is selected.
    /// - [`SelectionError::QuantityNotPositive`] when the quantity is not above zero.
    pub fn pending_commit(&self) -> Result<ProductCartWithData, SelectionError> {
        let current = self.require()?;

        if !self.can_commit() {
            return Err(SelectionError::QuantityNotPositive);
        }

        let mut line = current.clone();
        line.line.total_price = line_total(&line);

        Ok(line)
    }

    /// Selection after the pending line was stored.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NothingSelected`] when there was nothing to store.
    pub fn commit(&self) -> Result<Self, SelectionError> {
        self.require()?;

        Ok(Self::Empty)
    }

    /// Drop the in-progress line without storing it.
    #[must_use]
    pub fn cancel(&self) -> Self {
        if let Some(current) = self.current() {
            debug!(product = %current.product.id(), "discarding selected line");
        }

        Self::Empty
    }

    fn require(&self) -> Result<&ProductCartWithData, SelectionError> {
        self.current().ok_or(SelectionError::NothingSelected)
    }
}
