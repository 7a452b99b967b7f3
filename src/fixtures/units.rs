//! Unit Fixtures

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    units::{Unit, UnitId, UnitKind},
};

/// Unit Fixture
#[derive(Debug, Deserialize)]
pub struct UnitFixture {
    /// Unit id
    pub id: i64,

    /// Display name (e.g., "x250gr")
    pub name: String,

    /// Fraction of the base unit (e.g., "0.25")
    pub fraction: String,

    /// How the unit is sold; weight when omitted
    #[serde(default)]
    pub kind: UnitKind,
}

impl TryFrom<UnitFixture> for Unit {
    type Error = FixtureError;

    fn try_from(fixture: UnitFixture) -> Result<Self, Self::Error> {
        let fraction = fixture
            .fraction
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidFraction(fixture.fraction.clone()))?;

        Ok(Unit {
            id: UnitId::new(fixture.id),
            name: fixture.name,
            fraction,
            kind: fixture.kind,
        })
    }
}
