//! Error types shared by every layer of the API
//!
//! Each variant maps onto exactly one HTTP status. Views return
//! [`Result`] and the router glue turns the error into a JSON
//! [`reinhardt::Response`] through `From<Error> for Response`.

use reinhardt::{Response, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that do not belong to a single input field
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages grouped by input field
///
/// Serializes as `{"field": ["message", ...]}`, the shape REST clients of
/// this API already expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
	/// Create an empty error set
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an error set holding a single message for `field`
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker::exception::FieldErrors;
	///
	/// let errors = FieldErrors::single("title", "This field is required.");
	/// assert_eq!(errors.get("title").unwrap(), ["This field is required."]);
	/// ```
	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = Self::new();
		errors.add(field, message);
		errors
	}

	/// Create an error set holding a message not tied to any field
	pub fn non_field(message: impl Into<String>) -> Self {
		Self::single(NON_FIELD_ERRORS, message)
	}

	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.entry(field.into()).or_default().push(message.into());
	}

	pub fn merge(&mut self, other: FieldErrors) {
		for (field, messages) in other.0 {
			self.0.entry(field).or_default().extend(messages);
		}
	}

	/// Move the messages of `from` under `to`
	pub fn rename(&mut self, from: &str, to: &str) {
		if let Some(messages) = self.0.remove(from) {
			self.0.entry(to.to_string()).or_default().extend(messages);
		}
	}

	pub fn get(&self, field: &str) -> Option<&[String]> {
		self.0.get(field).map(Vec::as_slice)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `Ok(())` when no message was collected, otherwise a validation error
	pub fn into_result(self) -> Result<()> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(Error::Validation(self))
		}
	}
}

impl fmt::Display for FieldErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for (field, messages) in &self.0 {
			for message in messages {
				if !first {
					write!(f, "; ")?;
				}
				write!(f, "{}: {}", field, message)?;
				first = false;
			}
		}
		Ok(())
	}
}

impl From<validator::ValidationErrors> for FieldErrors {
	fn from(errors: validator::ValidationErrors) -> Self {
		let mut result = Self::new();
		for (field, field_errors) in errors.field_errors() {
			for error in field_errors {
				let message = error
					.message
					.as_ref()
					.map(|m| m.to_string())
					.unwrap_or_else(|| error.code.to_string());
				result.add(field.to_string(), message);
			}
		}
		result
	}
}

/// API error
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A path segment or referenced object does not exist
	#[error("Not found: {0}")]
	NotFound(String),

	/// Missing, malformed or expired credentials
	#[error("Authentication failed: {0}")]
	Unauthorized(String),

	/// Authenticated, but the permission check refused the operation
	#[error("Permission denied: {0}")]
	Forbidden(String),

	/// Malformed input or a broken data rule
	#[error("Validation error: {0}")]
	Validation(FieldErrors),

	#[error("Method not allowed: {0}")]
	MethodNotAllowed(String),

	#[error("Database error: {0}")]
	Database(String),

	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// Shortcut for a validation error on a single field
	pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
		Error::Validation(FieldErrors::single(field, message))
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			Error::Forbidden(_) => StatusCode::FORBIDDEN,
			Error::Validation(_) => StatusCode::BAD_REQUEST,
			Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
			Error::Database(_) | Error::Configuration(_) | Error::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		// Unique constraint violations surface as bad input
		if let Some(db_err) = err.as_database_error()
			&& db_err.is_unique_violation()
		{
			return Error::Validation(FieldErrors::non_field(
				"An object with these unique fields already exists.",
			));
		}
		Error::Database(err.to_string())
	}
}

impl From<sqlx::migrate::MigrateError> for Error {
	fn from(err: sqlx::migrate::MigrateError) -> Self {
		Error::Database(err.to_string())
	}
}

impl From<Error> for Response {
	fn from(error: Error) -> Self {
		let status = error.status_code();
		let body = match &error {
			Error::Validation(errors) => serde_json::to_value(errors),
			Error::NotFound(msg)
			| Error::Unauthorized(msg)
			| Error::Forbidden(msg)
			| Error::MethodNotAllowed(msg) => Ok(serde_json::json!({ "detail": msg })),
			Error::Database(_) | Error::Configuration(_) | Error::Internal(_) => {
				tracing::error!(error = %error, "Request failed with a server error");
				Ok(serde_json::json!({ "detail": "Internal server error" }))
			}
		};

		let body = body.unwrap_or_else(|_| serde_json::json!({ "detail": error.to_string() }));
		let mut response = Response::new(status)
			.with_header("content-type", "application/json")
			.with_body(body.to_string());
		if status == StatusCode::UNAUTHORIZED {
			response = response.with_header("www-authenticate", "Bearer realm=\"api\"");
		}
		response
	}
}
