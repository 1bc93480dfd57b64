//! Row factories for tests
//!
//! Factories insert rows through the model layer and panic on failure, so
//! tests can set up state in one line.

mod issue;
mod project;
mod user;

pub use issue::*;
pub use project::*;
pub use user::*;
