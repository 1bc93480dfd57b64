//! Account serializers

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::apps::accounts::models::User;
use crate::serializers::{WriteSerializer, missing, not_blank};

pub const PASSWORD_MISMATCH: &str = "Password fields didn't match.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";

/// Request data for user registration
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
	#[validate(email(message = "Enter a valid email address."))]
	#[validate(length(max = 254, message = "Ensure this field has no more than 254 characters."))]
	pub email: Option<String>,

	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
	pub first_name: Option<String>,

	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
	pub last_name: Option<String>,

	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 4096, message = "Ensure this field has no more than 4096 characters."))]
	pub password: Option<String>,

	pub password_confirmation: Option<String>,
}

impl RegisterRequest {
	/// Both password fields hold the same value
	pub fn validate_passwords_match(&self) -> Result<(), &'static str> {
		if self.password != self.password_confirmation {
			return Err(PASSWORD_MISMATCH);
		}
		Ok(())
	}
}

impl WriteSerializer for RegisterRequest {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[
			("email", self.email.is_none()),
			("first_name", self.first_name.is_none()),
			("last_name", self.last_name.is_none()),
			("password", self.password.is_none()),
			("password_confirmation", self.password_confirmation.is_none()),
		])
	}
}

/// Request data for token issuance
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginRequest {
	#[validate(custom(function = "not_blank"))]
	pub email: Option<String>,
	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 4096, message = "Ensure this field has no more than 4096 characters."))]
	pub password: Option<String>,
}

impl WriteSerializer for LoginRequest {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[
			("email", self.email.is_none()),
			("password", self.password.is_none()),
		])
	}
}

/// Request data for token refresh
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RefreshRequest {
	#[validate(custom(function = "not_blank"))]
	pub refresh: Option<String>,
}

impl WriteSerializer for RefreshRequest {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[("refresh", self.refresh.is_none())])
	}
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
	pub access: String,
}

/// Public user representation, also embedded in contributor details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
	pub id: i64,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
}

impl From<&User> for UserResponse {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			email: user.email.clone(),
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
		}
	}
}
