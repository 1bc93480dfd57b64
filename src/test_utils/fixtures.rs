//! rstest fixtures shared by the app tests

mod context;
mod database;

pub use context::*;
pub use database::*;
