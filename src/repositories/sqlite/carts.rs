//! Cart queries

use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite, Transaction, query, query_as, query_scalar};
use tracing::{debug, instrument};

use crate::{
    carts::{Cart, CartId, CartStatus, ProductCart, ProductCartId, ProductCartWithData},
    pricing::sum_line_totals,
    repositories::{CartRepository, RepositoryError},
};

use super::{SqliteStore, rows::parse_decimal};

const GET_CART_SQL: &str = include_str!("../sql/get_cart.sql");
const GET_CART_LINES_SQL: &str = include_str!("../sql/get_cart_lines.sql");
const UPSERT_CART_SQL: &str = include_str!("../sql/upsert_cart.sql");
const DELETE_CART_SQL: &str = include_str!("../sql/delete_cart.sql");
const DELETE_CART_LINES_SQL: &str = include_str!("../sql/delete_cart_lines.sql");
const GET_LINE_CART_SQL: &str = include_str!("../sql/get_line_cart.sql");
const UPSERT_LINE_SQL: &str = include_str!("../sql/upsert_line.sql");
const DELETE_LINE_SQL: &str = include_str!("../sql/delete_line.sql");
const LINE_TOTALS_SQL: &str = include_str!("../sql/line_totals.sql");
const UPDATE_CART_TOTAL_SQL: &str = include_str!("../sql/update_cart_total.sql");

const LIST_CARTS_SQL: &str =
    "SELECT cart_id, status, date_created, username_seller, total_price FROM carts WHERE status IN (";

#[async_trait]
impl CartRepository for SqliteStore {
    #[instrument(skip(self))]
    async fn upsert_line_item(&self, line: &ProductCart) -> Result<ProductCartId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous = match line.id {
            Some(id) => query_scalar::<Sqlite, i64>(GET_LINE_CART_SQL)
                .bind(id.get())
                .fetch_optional(&mut *tx)
                .await?
                .map(CartId::new),
            None => None,
        };

        let row = query(UPSERT_LINE_SQL)
            .bind(line.id.map(ProductCartId::get))
            .bind(line.cart_id.map(CartId::get))
            .bind(line.product_id.get())
            .bind(line.quantity.as_str())
            .bind(line.total_price.to_string())
            .fetch_one(&mut *tx)
            .await?;

        let id = ProductCartId::new(row.try_get("product_cart_id")?);
        let cart = CartId::new(row.try_get("cart_id")?);

        refresh_cart_total(&mut tx, cart).await?;

        // A line moved between carts leaves the old total stale.
        if let Some(previous) = previous.filter(|previous| *previous != cart) {
            refresh_cart_total(&mut tx, previous).await?;
        }

        tx.commit().await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete_line_item(&self, line: &ProductCart) -> Result<(), RepositoryError> {
        let id = line.id.ok_or(RepositoryError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        let cart = query_scalar::<Sqlite, i64>(DELETE_LINE_SQL)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?;

        let cart = cart.map(CartId::new).ok_or(RepositoryError::NotFound)?;

        refresh_cart_total(&mut tx, cart).await?;

        tx.commit().await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_carts_by_status(
        &self,
        statuses: &[CartStatus],
    ) -> Result<Vec<Cart>, RepositoryError> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(LIST_CARTS_SQL);
        let mut separated = builder.separated(", ");

        for status in statuses {
            separated.push_bind(status.as_str());
        }

        separated.push_unseparated(") ORDER BY date_created DESC, cart_id DESC");

        let carts = builder
            .build_query_as::<Cart>()
            .fetch_all(&self.pool)
            .await?;

        Ok(carts)
    }

    #[instrument(skip(self))]
    async fn get_cart_with_lines(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let Some(mut cart) = query_as::<Sqlite, Cart>(GET_CART_SQL)
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        cart.lines = query_as::<Sqlite, ProductCartWithData>(GET_CART_LINES_SQL)
            .bind(id.get())
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(cart))
    }

    #[instrument(skip_all, fields(cart = ?cart.id))]
    async fn upsert_cart(&self, cart: &Cart) -> Result<CartId, RepositoryError> {
        let id = query_scalar::<Sqlite, i64>(UPSERT_CART_SQL)
            .bind(cart.id.map(CartId::get))
            .bind(cart.status.map(CartStatus::as_str))
            .bind(cart.created_at.as_millisecond())
            .bind(cart.seller.as_str())
            .bind(cart.total_price.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(CartId::new(id))
    }

    #[instrument(skip_all, fields(cart = ?cart.id))]
    async fn delete_cart(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let id = cart.id.ok_or(RepositoryError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        let lines = query(DELETE_CART_LINES_SQL)
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let rows_affected = query(DELETE_CART_SQL)
            .bind(id.get())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        debug!(%id, lines, "deleted cart");

        Ok(())
    }
}

/// Store the sum of the cart's line totals as its total.
async fn refresh_cart_total(
    tx: &mut Transaction<'_, Sqlite>,
    cart: CartId,
) -> Result<(), sqlx::Error> {
    let totals = query_scalar::<Sqlite, String>(LINE_TOTALS_SQL)
        .bind(cart.get())
        .fetch_all(&mut **tx)
        .await?
        .iter()
        .map(|total| parse_decimal(total, "total_price"))
        .collect::<Result<Vec<_>, _>>()?;

    let total = sum_line_totals(totals);

    query(UPDATE_CART_TOTAL_SQL)
        .bind(cart.get())
        .bind(total.to_string())
        .execute(&mut **tx)
        .await?;

    debug!(%cart, %total, "refreshed cart total");

    Ok(())
}
