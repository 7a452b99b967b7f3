//! Pasionaria
//!
//! Point-of-sale cart core: product search, line selection and pricing for a
//! small retail counter, backed by `SQLite`.

pub mod carts;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod ids;
pub mod notifications;
pub mod observability;
pub mod pricing;
pub mod products;
pub mod repositories;
pub mod search;
pub mod selection;
pub mod state;
pub mod units;
pub mod view_model;

#[cfg(test)]
mod test;
