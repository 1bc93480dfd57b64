//! Shared serializer helpers
//!
//! Request payloads are plain `Deserialize` structs whose fields are all
//! `Option`s, so that missing fields can be reported per field instead of
//! failing the whole JSON parse. Field rules come from `validator`.

use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::exception::{Error, FieldErrors, Result};
use crate::views::Action;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Input side of a resource serializer
pub trait WriteSerializer: Validate {
	/// Required fields that were not supplied
	fn missing_required(&self) -> Vec<&'static str>;

	/// `(field, key)` pairs for fields whose JSON key differs from the
	/// struct field that `validator` reports
	fn renamed(&self) -> &'static [(&'static str, &'static str)] {
		&[]
	}

	/// Run presence checks and field rules for `action`
	///
	/// Partial updates skip the presence checks; every supplied field is
	/// still validated.
	fn validate_for(&self, action: Action) -> Result<()> {
		let mut errors = FieldErrors::new();
		if action != Action::PartialUpdate {
			for field in self.missing_required() {
				errors.add(field, REQUIRED);
			}
		}
		if let Err(e) = self.validate() {
			let mut invalid = FieldErrors::from(e);
			for (field, key) in self.renamed() {
				invalid.rename(field, key);
			}
			errors.merge(invalid);
		}
		errors.into_result()
	}
}

/// Collect the names of the absent fields among `fields`
///
/// # Examples
///
/// ```
/// use issuetracker::serializers::missing;
///
/// let title: Option<String> = None;
/// let tag = Some("BUG");
/// assert_eq!(missing(&[("title", title.is_none()), ("tag", tag.is_none())]), vec!["title"]);
/// ```
pub fn missing(fields: &[(&'static str, bool)]) -> Vec<&'static str> {
	fields
		.iter()
		.filter(|(_, absent)| *absent)
		.map(|(name, _)| *name)
		.collect()
}

/// Field rule refusing empty or whitespace-only strings
pub fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
	if value.trim().is_empty() {
		return Err(ValidationError::new("blank").with_message(BLANK.into()));
	}
	Ok(())
}

/// Field rule accepting only the wire codes of the enum `T`
pub fn is_choice<T: DeserializeOwned>(value: &str) -> std::result::Result<(), ValidationError> {
	match parse_code::<T>(value) {
		Some(_) => Ok(()),
		None => Err(ValidationError::new("invalid_choice")
			.with_message(format!("\"{}\" is not a valid choice.", value).into())),
	}
}

/// Convert an optional wire code into the enum `T`
///
/// # Examples
///
/// ```
/// use issuetracker::apps::issues::models::Tag;
/// use issuetracker::serializers::choice;
///
/// assert_eq!(choice::<Tag>("tag", &Some("BUG".to_string())).unwrap(), Some(Tag::Bug));
/// assert_eq!(choice::<Tag>("tag", &None).unwrap(), None);
/// assert!(choice::<Tag>("tag", &Some("bug".to_string())).is_err());
/// ```
pub fn choice<T: DeserializeOwned>(field: &'static str, value: &Option<String>) -> Result<Option<T>> {
	match value {
		None => Ok(None),
		Some(code) => parse_code(code)
			.map(Some)
			.ok_or_else(|| Error::validation(field, format!("\"{}\" is not a valid choice.", code))),
	}
}

fn parse_code<T: DeserializeOwned>(code: &str) -> Option<T> {
	serde_json::from_value(serde_json::Value::String(code.to_string())).ok()
}

/// Unwrap a field that [`WriteSerializer::validate_for`] already checked
pub fn required<T: Clone>(field: &'static str, value: &Option<T>) -> Result<T> {
	value
		.clone()
		.ok_or_else(|| Error::validation(field, REQUIRED))
}
