//! Test utilities: database-backed fixtures and row factories

pub mod factories;
pub mod fixtures;
