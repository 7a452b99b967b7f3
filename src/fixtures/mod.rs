//! Catalog Fixtures
//!
//! First-run catalog data loaded from YAML and written through a
//! [`ProductRepository`].

use std::{fs, path::Path, str::FromStr};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::{
    products::Product,
    repositories::{ProductRepository, RepositoryError},
    units::Unit,
};

pub mod products;
pub mod units;

pub use products::parse_price;

use self::{products::ProductFixture, units::UnitFixture};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid unit fraction
    #[error("Invalid unit fraction: {0}")]
    InvalidFraction(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A product references a unit key that is not defined
    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    /// Two entries share an id
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Entry kind ("unit" or "product")
        kind: &'static str,
        /// The repeated id
        id: i64,
    },
}

/// Wrapper for the catalog YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    /// Map of unit key -> unit fixture
    #[serde(default)]
    units: FxHashMap<String, UnitFixture>,

    /// Map of product key -> product fixture
    #[serde(default)]
    products: FxHashMap<String, ProductFixture>,
}

/// Units and products ready to be stored, ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Units
    pub units: Vec<Unit>,

    /// Products, each referencing one of `units`
    pub products: Vec<Product>,
}

impl Catalog {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are not a
    /// valid catalog.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        contents.parse()
    }
}

impl FromStr for Catalog {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fixture: CatalogFixture = serde_norway::from_str(s)?;

        fixture.try_into()
    }
}

impl TryFrom<CatalogFixture> for Catalog {
    type Error = FixtureError;

    fn try_from(fixture: CatalogFixture) -> Result<Self, Self::Error> {
        let mut unit_ids = FxHashMap::default();
        let mut units = Vec::with_capacity(fixture.units.len());

        for (key, unit_fixture) in fixture.units {
            let unit = Unit::try_from(unit_fixture)?;

            unit_ids.insert(key, unit.id);
            units.push(unit);
        }

        let mut products = Vec::with_capacity(fixture.products.len());

        for product_fixture in fixture.products.into_values() {
            let unit_id = unit_ids
                .get(&product_fixture.unit)
                .copied()
                .ok_or_else(|| FixtureError::UnitNotFound(product_fixture.unit.clone()))?;

            products.push(product_fixture.into_product(unit_id)?);
        }

        units.sort_by_key(|unit| unit.id);
        products.sort_by_key(|product| product.id);

        if let Some(id) = first_repeated(units.iter().map(|unit| unit.id.get())) {
            return Err(FixtureError::DuplicateId { kind: "unit", id });
        }

        if let Some(id) = first_repeated(products.iter().map(|product| product.id.get())) {
            return Err(FixtureError::DuplicateId { kind: "product", id });
        }

        Ok(Self { units, products })
    }
}

/// First id that repeats in an ascending sequence.
fn first_repeated(ids: impl IntoIterator<Item = i64>) -> Option<i64> {
    let mut previous = None;

    ids.into_iter().find(|&id| previous.replace(id) == Some(id))
}

/// Write `catalog` through `repository`: units first, then products.
///
/// Entries are upserted by id, so seeding twice leaves one copy of each.
///
/// # Errors
///
/// Returns the first storage error.
pub async fn seed(
    repository: &dyn ProductRepository,
    catalog: &Catalog,
) -> Result<(), RepositoryError> {
    repository.save_units(&catalog.units).await?;
    repository.save_products(&catalog.products).await?;

    info!(
        units = catalog.units.len(),
        products = catalog.products.len(),
        "seeded catalog"
    );

    Ok(())
}
