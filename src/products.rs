//! Products

use rust_decimal::Decimal;

use crate::{
    ids::TypedId,
    units::{Unit, UnitId},
};

/// Product Id
pub type ProductId = TypedId<Product>;

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// List price
    pub price_list: Decimal,

    /// Unit the list price refers to
    pub unit_id: UnitId,
}

/// A product joined with its unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductWithUnit {
    /// Product
    pub product: Product,

    /// The product's unit
    pub unit: Unit,
}

impl ProductWithUnit {
    /// Product id
    pub fn id(&self) -> ProductId {
        self.product.id
    }

    /// Product name
    pub fn name(&self) -> &str {
        &self.product.name
    }
}
