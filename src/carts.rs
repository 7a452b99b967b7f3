//! Carts

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    ids::TypedId,
    products::{ProductId, ProductWithUnit},
};

/// Cart Id
pub type CartId = TypedId<Cart>;

/// Line Item Id
pub type ProductCartId = TypedId<ProductCart>;

/// Cart lifecycle status.
///
/// Carts move `Inactive -> Pending -> Finalized`; the transitions themselves are
/// storage writes owned by whoever edits the cart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartStatus {
    /// Parked cart
    Inactive,

    /// Cart being built; the only status whose lines may be edited
    Pending,

    /// Closed cart
    Finalized,
}

impl CartStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Inactive, Self::Pending, Self::Finalized];

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Pending => "PENDING",
            Self::Finalized => "FINALIZED",
        }
    }

    /// Label shown on cart cards and filter chips.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inactive => "Inactivo",
            Self::Pending => "Pendiente",
            Self::Finalized => "Finalizado",
        }
    }

    /// Whether lines of a cart in this status can be edited or removed.
    pub const fn allows_line_edits(self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown cart status string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown cart status: {0}")]
pub struct UnknownCartStatus(pub String);

impl FromStr for CartStatus {
    type Err = UnknownCartStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCartStatus(s.to_string()))
    }
}

/// Line item: one product entry within a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCart {
    /// Assigned on first successful persistence.
    pub id: Option<ProductCartId>,

    /// Owning cart
    pub cart_id: Option<CartId>,

    /// Product on this line
    pub product_id: ProductId,

    /// Quantity exactly as typed.
    pub quantity: String,

    /// Line total computed from the quantity
    pub total_price: Decimal,
}

impl ProductCart {
    /// A fresh, unpersisted line with no quantity.
    pub fn new(cart_id: Option<CartId>, product_id: ProductId) -> Self {
        Self {
            id: None,
            cart_id,
            product_id,
            quantity: String::new(),
            total_price: Decimal::ZERO,
        }
    }

    /// Whether the line has been stored.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// A line item with its product and unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCartWithData {
    /// Line item
    pub line: ProductCart,

    /// Product on the line, with its unit
    pub product: ProductWithUnit,
}

/// Affordances a cart card exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartActions {
    /// Lines can be edited
    pub edit_lines: bool,

    /// The cart can be deleted
    pub delete: bool,
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    /// Assigned on first successful persistence.
    pub id: Option<CartId>,

    /// Lifecycle status; `None` when unset
    pub status: Option<CartStatus>,

    /// Creation time
    pub created_at: Timestamp,

    /// Seller who opened the cart
    pub seller: String,

    /// Sum of line totals
    pub total_price: Decimal,

    /// Lines, when loaded
    pub lines: Vec<ProductCartWithData>,
}

impl Cart {
    /// A new, unpersisted pending cart.
    pub fn pending(seller: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: None,
            status: Some(CartStatus::Pending),
            created_at,
            seller: seller.into(),
            total_price: Decimal::ZERO,
            lines: Vec::new(),
        }
    }

    /// Whether this cart's lines may be edited or removed.
    pub fn allows_line_edits(&self) -> bool {
        self.status.is_some_and(CartStatus::allows_line_edits)
    }

    /// Edit/delete affordances; only pending carts expose them.
    pub fn actions(&self) -> CartActions {
        let pending = self.allows_line_edits();

        CartActions {
            edit_lines: pending,
            delete: pending,
        }
    }
}
