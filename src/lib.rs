//! # issuetracker
//!
//! Issue-tracking REST API. Projects hold issues, issues hold comments, and
//! contributor rows decide who may see a project at all.
//!
//! ## Request flow
//!
//! 1. the [`UnifiedRouter`](reinhardt::urls::routers::UnifiedRouter) built by [`urls::url_patterns`]
//!    matches the path and [`urls::resolve`] turns it into a [`urls::Route`]
//! 2. [`auth::authenticate`] reads the bearer token, if any
//! 3. the parent chain (project, issue) is loaded, missing rows are 404
//! 4. [`views::dispatch`] loads the object and asks [`permissions::check`]
//! 5. the viewset action runs against the SQLite pool
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use issuetracker::app::{App, AppState};
//! use issuetracker::conf::Settings;
//! use reinhardt::server::HttpServer;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load()?;
//! let pool = issuetracker::db::connect(&settings.database_url).await?;
//! issuetracker::db::migrate(&pool).await?;
//!
//! let addr = settings.bind_address.parse()?;
//! let app = App::new(AppState::new(settings, pool));
//! HttpServer::new(Arc::new(app)).listen(addr).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod apps;
pub mod auth;
pub mod conf;
pub mod db;
pub mod exception;
pub mod permissions;
pub mod serializers;
pub mod urls;
pub mod views;

#[cfg(test)]
pub mod test_utils;

pub use app::{App, AppState};
pub use exception::{Error, Result};
