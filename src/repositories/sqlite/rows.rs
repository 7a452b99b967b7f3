//! Row decoding

use std::error::Error as StdError;

use jiff::Timestamp;
use rust_decimal::Decimal;
use sqlx::{Error, FromRow, Row, sqlite::SqliteRow};

use crate::{
    carts::{Cart, CartId, CartStatus, ProductCart, ProductCartId, ProductCartWithData},
    products::{Product, ProductId, ProductWithUnit},
    units::{Unit, UnitId, UnitKind},
};

impl<'r> FromRow<'r, SqliteRow> for Unit {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;

        Ok(Self {
            id: UnitId::new(row.try_get("unit_id")?),
            name: row.try_get("unit_name")?,
            fraction: try_get_decimal(row, "fraction")?,
            kind: kind
                .parse::<UnitKind>()
                .map_err(|source| decode_error("kind", source))?,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProductWithUnit {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let unit = Unit::from_row(row)?;

        Ok(Self {
            product: Product {
                id: ProductId::new(row.try_get("product_id")?),
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                price_list: try_get_decimal(row, "price_list")?,
                unit_id: unit.id,
            },
            unit,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for ProductCartWithData {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let product = ProductWithUnit::from_row(row)?;

        Ok(Self {
            line: ProductCart {
                id: Some(ProductCartId::new(row.try_get("product_cart_id")?)),
                cart_id: Some(CartId::new(row.try_get("cart_id")?)),
                product_id: product.id(),
                quantity: row.try_get("quantity")?,
                total_price: try_get_decimal(row, "total_price")?,
            },
            product,
        })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Cart {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let status = row
            .try_get::<Option<String>, _>("status")?
            .as_deref()
            .map(str::trim)
            .filter(|status| !status.is_empty())
            .map(str::parse::<CartStatus>)
            .transpose()
            .map_err(|source| decode_error("status", source))?;

        let created_at = Timestamp::from_millisecond(row.try_get("date_created")?)
            .map_err(|source| decode_error("date_created", source))?;

        Ok(Self {
            id: Some(CartId::new(row.try_get("cart_id")?)),
            status,
            created_at,
            seller: row.try_get("username_seller")?,
            total_price: try_get_decimal(row, "total_price")?,
            lines: Vec::new(),
        })
    }
}

pub(super) fn try_get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, Error> {
    let text: String = row.try_get(column)?;

    parse_decimal(&text, column)
}

pub(super) fn parse_decimal(text: &str, column: &str) -> Result<Decimal, Error> {
    text.parse::<Decimal>()
        .map_err(|source| decode_error(column, source))
}

fn decode_error(column: &str, source: impl StdError + Send + Sync + 'static) -> Error {
    Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(source),
    }
}
