//! Password strength validators run on registration
//!
//! Every validator in the chain runs; all failures are reported together
//! under the `password` field.

use zxcvbn::{Score, zxcvbn};

use crate::exception::{FieldErrors, Result};

/// Similarity ratio at or above which a password counts as too close to a
/// user attribute
pub const MAX_SIMILARITY: f64 = 0.7;

/// User attributes a password must not resemble
#[derive(Debug, Clone, Copy, Default)]
pub struct UserAttributes<'a> {
	pub email: &'a str,
	pub first_name: &'a str,
	pub last_name: &'a str,
}

/// A single password rule
pub trait PasswordValidator: Send + Sync {
	/// Message describing the failure, `None` if the password passes
	fn validate(&self, password: &str, user: &UserAttributes<'_>) -> Option<String>;
}

/// Minimum number of characters
#[derive(Debug, Clone, Copy)]
pub struct MinimumLengthValidator {
	pub min_length: usize,
}

impl PasswordValidator for MinimumLengthValidator {
	fn validate(&self, password: &str, _user: &UserAttributes<'_>) -> Option<String> {
		(password.chars().count() < self.min_length).then(|| {
			format!(
				"This password is too short. It must contain at least {} characters.",
				self.min_length
			)
		})
	}
}

/// Refuses passwords made only of digits
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericPasswordValidator;

impl PasswordValidator for NumericPasswordValidator {
	fn validate(&self, password: &str, _user: &UserAttributes<'_>) -> Option<String> {
		(!password.is_empty() && password.chars().all(|c| c.is_ascii_digit()))
			.then(|| "This password is entirely numeric.".to_string())
	}
}

/// Refuses passwords zxcvbn rates as trivially guessable
///
/// Passwords longer than [`MAX_COMMON_PASSWORD_LENGTH`] are not scored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonPasswordValidator;

pub const MAX_COMMON_PASSWORD_LENGTH: usize = 128;

impl PasswordValidator for CommonPasswordValidator {
	fn validate(&self, password: &str, _user: &UserAttributes<'_>) -> Option<String> {
		if password.is_empty() || password.chars().count() > MAX_COMMON_PASSWORD_LENGTH {
			return None;
		}
		matches!(zxcvbn(password, &[]).score(), Score::Zero)
			.then(|| "This password is too common.".to_string())
	}
}

/// Refuses passwords too close to the user's email or names
#[derive(Debug, Clone, Copy)]
pub struct UserAttributeSimilarityValidator {
	pub max_similarity: f64,
}

impl Default for UserAttributeSimilarityValidator {
	fn default() -> Self {
		Self {
			max_similarity: MAX_SIMILARITY,
		}
	}
}

impl PasswordValidator for UserAttributeSimilarityValidator {
	fn validate(&self, password: &str, user: &UserAttributes<'_>) -> Option<String> {
		let password = password.to_lowercase();
		let attributes = [
			("email address", user.email),
			("first name", user.first_name),
			("last name", user.last_name),
		];

		for (label, value) in attributes {
			let value = value.trim().to_lowercase();
			if value.is_empty() {
				continue;
			}
			let parts = std::iter::once(value.as_str())
				.chain(value.split(|c: char| !c.is_alphanumeric()))
				.filter(|part| !part.is_empty());
			for part in parts {
				if exceeds_maximum_length_ratio(&password, self.max_similarity, part) {
					continue;
				}
				if similarity(&password, part) >= self.max_similarity {
					return Some(format!("The password is too similar to the {}.", label));
				}
			}
		}
		None
	}
}

/// Whether `password` is so much longer than `value` that they cannot
/// reach `max_similarity`
///
/// Lets the validator skip the quadratic comparison for long passwords.
pub fn exceeds_maximum_length_ratio(password: &str, max_similarity: f64, value: &str) -> bool {
	let password_len = password.chars().count();
	let value_len = value.chars().count();
	let length_bound_similarity = max_similarity / 2.0 * password_len as f64;
	password_len >= 10 * value_len && (value_len as f64) < length_bound_similarity
}

/// Weighted Jaro-Winkler and normalized Levenshtein score in `0.0..=1.0`
fn similarity(a: &str, b: &str) -> f64 {
	const JARO_WINKLER_WEIGHT: f64 = 0.7;
	const LEVENSHTEIN_WEIGHT: f64 = 0.3;

	JARO_WINKLER_WEIGHT * strsim::jaro_winkler(a, b)
		+ LEVENSHTEIN_WEIGHT * strsim::normalized_levenshtein(a, b)
}

/// Ordered list of validators
pub struct PasswordValidators {
	validators: Vec<Box<dyn PasswordValidator>>,
}

impl PasswordValidators {
	pub fn new() -> Self {
		Self {
			validators: Vec::new(),
		}
	}

	/// The usual chain: similarity, minimum length, common, numeric
	pub fn standard(min_length: usize) -> Self {
		Self::new()
			.with(UserAttributeSimilarityValidator::default())
			.with(MinimumLengthValidator { min_length })
			.with(CommonPasswordValidator)
			.with(NumericPasswordValidator)
	}

	pub fn with(mut self, validator: impl PasswordValidator + 'static) -> Self {
		self.validators.push(Box::new(validator));
		self
	}

	/// Run every validator, reporting all messages on `password`
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker::auth::password_validation::{PasswordValidators, UserAttributes};
	///
	/// let validators = PasswordValidators::standard(8);
	/// let user = UserAttributes { email: "ann@example.com", first_name: "Ann", last_name: "Lee" };
	///
	/// assert!(validators.validate("violet-Harbor-42", &user).is_ok());
	/// assert!(validators.validate("1234", &user).is_err());
	/// ```
	pub fn validate(&self, password: &str, user: &UserAttributes<'_>) -> Result<()> {
		let mut errors = FieldErrors::new();
		for validator in &self.validators {
			if let Some(message) = validator.validate(password, user) {
				errors.add("password", message);
			}
		}
		errors.into_result()
	}
}

impl Default for PasswordValidators {
	fn default() -> Self {
		Self::standard(8)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::exception::Error;
	use rstest::rstest;
	use std::time::{Duration, Instant};

	fn user() -> UserAttributes<'static> {
		UserAttributes {
			email: "jordan.miles@example.com",
			first_name: "Jordan",
			last_name: "Miles",
		}
	}

	fn messages(password: &str) -> Vec<String> {
		match PasswordValidators::standard(8).validate(password, &user()) {
			Ok(()) => Vec::new(),
			Err(Error::Validation(errors)) => errors.get("password").unwrap().to_vec(),
			Err(other) => panic!("unexpected error {:?}", other),
		}
	}

	#[rstest]
	#[case("correct-Horse-7")]
	#[case("Tundra!Lantern")]
	fn test_strong_passwords_pass(#[case] password: &str) {
		assert!(messages(password).is_empty());
	}

	#[rstest]
	#[case("short1x", "This password is too short. It must contain at least 8 characters.")]
	#[case("password", "This password is too common.")]
	#[case("Password", "This password is too common.")]
	#[case("83920174", "This password is entirely numeric.")]
	#[case("jordanmiles", "The password is too similar to the email address.")]
	fn test_weak_passwords_fail(#[case] password: &str, #[case] expected: &str) {
		assert!(
			messages(password).iter().any(|m| m == expected),
			"{:?} did not report {:?}",
			messages(password),
			expected
		);
	}

	#[rstest]
	fn test_similarity_names_the_attribute() {
		let user = UserAttributes {
			email: "jm@example.com",
			first_name: "Jordan",
			last_name: "Miles",
		};
		let result = UserAttributeSimilarityValidator::default().validate("Jordan01", &user);
		assert_eq!(
			result.as_deref(),
			Some("The password is too similar to the first name.")
		);
	}

	#[rstest]
	fn test_all_failures_are_reported_together() {
		let reported = messages("1234");
		assert!(reported.contains(&"This password is too common.".to_string()));
		assert!(reported.contains(&"This password is entirely numeric.".to_string()));
		assert!(reported.iter().any(|m| m.starts_with("This password is too short.")));
	}

	#[rstest]
	#[case("abc", "abc", 1.0)]
	#[case("abcd", "wxyz", 0.0)]
	#[case("", "", 1.0)]
	fn test_similarity_ratio(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
		assert!((similarity(a, b) - expected).abs() < 1e-9);
	}

	#[rstest]
	fn test_similarity_rewards_shared_prefix() {
		assert!(similarity("jordan01", "jordan") >= MAX_SIMILARITY);
		assert!(similarity("tundra!lantern", "jordan") < MAX_SIMILARITY);
	}

	#[rstest]
	#[case("jordanmiles", "jordan", false)]
	#[case("aaaaaaaaaaaaaaaaaaaa", "ab", true)]
	#[case("aaaaaaaaaaaaaaaaaaa", "ab", false)]
	#[case("aaaaaaaaaaaaaaaaaaaa", "", true)]
	fn test_exceeds_maximum_length_ratio(
		#[case] password: &str,
		#[case] value: &str,
		#[case] expected: bool,
	) {
		assert_eq!(
			exceeds_maximum_length_ratio(password, MAX_SIMILARITY, value),
			expected
		);
	}

	#[rstest]
	fn test_huge_password_is_checked_quickly() {
		let password = "jordan".repeat(200_000);
		let started = Instant::now();

		let result = PasswordValidators::standard(8).validate(&password, &user());

		assert!(result.is_ok(), "{:?}", result);
		assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
	}
}
