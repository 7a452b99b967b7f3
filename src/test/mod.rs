//! Test support shared by the unit tests.

pub(crate) mod fixtures;
