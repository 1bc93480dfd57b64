//! Settings
//!
//! Layered lowest to highest: built-in defaults, `settings/base.toml`,
//! `settings/{profile}.toml`, then `ISSUETRACKER_*` environment variables.
//! The profile comes from `ISSUETRACKER_ENV` and defaults to `local`.

use reinhardt::{DefaultSource, EnvSource, Profile, SettingsBuilder, TomlFileSource};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Display;
use std::path::Path;

use crate::exception::{Error, Result};

/// Prefix of every environment variable read by [`Settings::load`]
pub const ENV_PREFIX: &str = "ISSUETRACKER_";

/// Key shipped in the defaults, accepted only while `debug` is on
pub const INSECURE_SECRET_KEY: &str = "insecure-change-me-in-production";

/// Runtime settings passed down inside [`AppState`](crate::app::AppState)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
	pub secret_key: String,
	pub debug: bool,
	pub bind_address: String,
	pub database_url: String,
	pub access_token_lifetime_secs: i64,
	pub refresh_token_lifetime_secs: i64,
	pub password_min_length: usize,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			secret_key: INSECURE_SECRET_KEY.to_string(),
			debug: true,
			bind_address: "127.0.0.1:8000".to_string(),
			database_url: "sqlite://db.sqlite3".to_string(),
			access_token_lifetime_secs: 300,
			refresh_token_lifetime_secs: 86_400,
			password_min_length: 8,
		}
	}
}

impl Settings {
	/// Load from `./settings` and the process environment
	pub fn load() -> Result<Self> {
		Self::load_from(Path::new("settings"), ENV_PREFIX)
	}

	/// Load from `dir`, overriding with environment variables named
	/// `{env_prefix}{KEY}`
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker::conf::Settings;
	/// use std::path::Path;
	///
	/// unsafe {
	///     std::env::set_var("DOCTEST_SECRET_KEY", "s3cret");
	/// }
	/// let settings = Settings::load_from(Path::new("/nonexistent"), "DOCTEST_").unwrap();
	/// assert!(settings.debug);
	/// assert_eq!(settings.secret_key, "s3cret");
	/// ```
	pub fn load_from(dir: &Path, env_prefix: &str) -> Result<Self> {
		let profile_str =
			std::env::var(format!("{}ENV", env_prefix)).unwrap_or_else(|_| "local".to_string());
		let defaults = Settings::default();

		let merged = SettingsBuilder::new()
			.profile(Profile::parse(&profile_str))
			.add_source(
				DefaultSource::new()
					.with_value("secret_key", json!(defaults.secret_key))
					.with_value("debug", json!(defaults.debug))
					.with_value("bind_address", json!(defaults.bind_address))
					.with_value("database_url", json!(defaults.database_url))
					.with_value("access_token_lifetime_secs", json!(defaults.access_token_lifetime_secs))
					.with_value("refresh_token_lifetime_secs", json!(defaults.refresh_token_lifetime_secs))
					.with_value("password_min_length", json!(defaults.password_min_length)),
			)
			.add_source(TomlFileSource::new(dir.join("base.toml")))
			.add_source(TomlFileSource::new(dir.join(format!("{}.toml", profile_str))))
			.add_source(EnvSource::new().with_prefix(env_prefix))
			.build()
			.map_err(|e| Error::Configuration(format!("Cannot load settings from {}: {}", dir.display(), e)))?;
		tracing::debug!(profile = %profile_str, dir = %dir.display(), "Loaded settings");

		Ok(Self {
			secret_key: merged.get("secret_key").map_err(invalid("secret_key"))?,
			debug: merged.get("debug").map_err(invalid("debug"))?,
			bind_address: merged.get("bind_address").map_err(invalid("bind_address"))?,
			database_url: merged.get("database_url").map_err(invalid("database_url"))?,
			access_token_lifetime_secs: merged
				.get("access_token_lifetime_secs")
				.map_err(invalid("access_token_lifetime_secs"))?,
			refresh_token_lifetime_secs: merged
				.get("refresh_token_lifetime_secs")
				.map_err(invalid("refresh_token_lifetime_secs"))?,
			password_min_length: merged
				.get("password_min_length")
				.map_err(invalid("password_min_length"))?,
		})
	}

	/// Reject settings the server must not start with
	pub fn validate(&self) -> Result<()> {
		if self.secret_key.trim().is_empty() {
			return Err(Error::Configuration("secret_key must not be empty".to_string()));
		}
		if !self.debug && self.secret_key == INSECURE_SECRET_KEY {
			return Err(Error::Configuration(
				"secret_key still holds the insecure default; set ISSUETRACKER_SECRET_KEY".to_string(),
			));
		}
		if self.access_token_lifetime_secs <= 0 || self.refresh_token_lifetime_secs <= 0 {
			return Err(Error::Configuration("token lifetimes must be positive".to_string()));
		}
		Ok(())
	}
}

fn invalid<E: Display>(key: &'static str) -> impl FnOnce(E) -> Error {
	move |e| Error::Configuration(format!("Invalid setting '{}': {}", key, e))
}
