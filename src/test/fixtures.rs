//! Catalog and cart values used across unit tests.

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    carts::{Cart, CartId, CartStatus, ProductCart, ProductCartId, ProductCartWithData},
    products::{Product, ProductId, ProductWithUnit},
    units::{Unit, UnitId, UnitKind},
};

fn product(id: i64, name: &str, price: i64, unit: Unit) -> ProductWithUnit {
    ProductWithUnit {
        product: Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: "Libanti x 500g".to_string(),
            price_list: Decimal::from(price),
            unit_id: unit.id,
        },
        unit,
    }
}

/// Manzana, 344 per x250gr.
pub(crate) fn manzana() -> ProductWithUnit {
    product(
        3,
        "Manzana",
        344,
        Unit {
            id: UnitId::new(3),
            name: "x250gr".to_string(),
            fraction: Decimal::new(25, 2),
            kind: UnitKind::Weight,
        },
    )
}

/// Pera, 23 per x100gr.
pub(crate) fn pera() -> ProductWithUnit {
    product(
        2,
        "Pera",
        23,
        Unit {
            id: UnitId::new(2),
            name: "x100gr".to_string(),
            fraction: Decimal::new(1, 1),
            kind: UnitKind::Weight,
        },
    )
}

/// A stored line of `product` in `cart`.
pub(crate) fn stored_line(
    id: i64,
    cart: CartId,
    product: ProductWithUnit,
    quantity: &str,
    total: i64,
) -> ProductCartWithData {
    ProductCartWithData {
        line: ProductCart {
            id: Some(ProductCartId::new(id)),
            cart_id: Some(cart),
            product_id: product.id(),
            quantity: quantity.to_string(),
            total_price: Decimal::from(total),
        },
        product,
    }
}

/// A stored cart with `lines`, its total being their sum.
pub(crate) fn stored_cart(
    id: i64,
    status: CartStatus,
    lines: Vec<ProductCartWithData>,
) -> Cart {
    Cart {
        id: Some(CartId::new(id)),
        status: Some(status),
        created_at: Timestamp::UNIX_EPOCH,
        seller: "mostrador".to_string(),
        total_price: lines.iter().map(|line| line.line.total_price).sum(),
        lines,
    }
}
