//! Catalog queries

use async_trait::async_trait;
use sqlx::{Sqlite, query, query_as};
use tracing::instrument;

use crate::{
    products::{Product, ProductId, ProductWithUnit},
    repositories::{ProductRepository, RepositoryError},
    units::Unit,
};

use super::SqliteStore;

const LIST_PRODUCTS_SQL: &str = include_str!("../sql/list_products.sql");
const SEARCH_PRODUCTS_SQL: &str = include_str!("../sql/search_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("../sql/get_product.sql");
const LIST_UNITS_SQL: &str = include_str!("../sql/list_units.sql");
const UPSERT_UNIT_SQL: &str = include_str!("../sql/upsert_unit.sql");
const UPSERT_PRODUCT_SQL: &str = include_str!("../sql/upsert_product.sql");

#[async_trait]
impl ProductRepository for SqliteStore {
    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<ProductWithUnit>, RepositoryError> {
        let products = query_as::<Sqlite, ProductWithUnit>(LIST_PRODUCTS_SQL)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn search(&self, text: &str) -> Result<Vec<ProductWithUnit>, RepositoryError> {
        let products = query_as::<Sqlite, ProductWithUnit>(SEARCH_PRODUCTS_SQL)
            .bind(escape_like(text))
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: ProductId) -> Result<Option<ProductWithUnit>, RepositoryError> {
        let product = query_as::<Sqlite, ProductWithUnit>(GET_PRODUCT_SQL)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn list_units(&self) -> Result<Vec<Unit>, RepositoryError> {
        let units = query_as::<Sqlite, Unit>(LIST_UNITS_SQL)
            .fetch_all(&self.pool)
            .await?;

        Ok(units)
    }

    #[instrument(skip_all, fields(count = units.len()))]
    async fn save_units(&self, units: &[Unit]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for unit in units {
            query(UPSERT_UNIT_SQL)
                .bind(unit.id.get())
                .bind(unit.name.as_str())
                .bind(unit.fraction.to_string())
                .bind(unit.kind.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    #[instrument(skip_all, fields(count = products.len()))]
    async fn save_products(&self, products: &[Product]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for product in products {
            query(UPSERT_PRODUCT_SQL)
                .bind(product.id.get())
                .bind(product.name.as_str())
                .bind(product.description.as_str())
                .bind(product.price_list.to_string())
                .bind(product.unit_id.get())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

/// Escape `LIKE` wildcards so `text` matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}
