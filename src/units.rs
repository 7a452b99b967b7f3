//! Units

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::ids::TypedId;

/// Unit Id
pub type UnitId = TypedId<Unit>;

/// How a unit is sold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Sold by weight ("x50gr", "x1kg").
    #[default]
    Weight,

    /// Sold per piece.
    Each,
}

impl UnitKind {
    /// Label shown next to the unit name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weight => "Peso",
            Self::Each => "Unidad",
        }
    }

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Each => "each",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown unit kind string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown unit kind: {0}")]
pub struct UnknownUnitKind(pub String);

impl FromStr for UnitKind {
    type Err = UnknownUnitKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weight" => Ok(Self::Weight),
            "each" => Ok(Self::Each),
            other => Err(UnknownUnitKind(other.to_string())),
        }
    }
}

/// Unit
///
/// Reference data: the grouping a product's list price refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Unit id
    pub id: UnitId,

    /// Display name, e.g. "x250gr"
    pub name: String,

    /// Multiplier from the unit grouping to the base price scale (0.25 for "x250gr")
    pub fraction: Decimal,

    /// Weight-based or per piece
    pub kind: UnitKind,
}
