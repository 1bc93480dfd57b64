//! Request and credential authentication

use reinhardt::{PasswordHasher, Request};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::apps::accounts::models::User;
use crate::auth::tokens::{TokenType, Tokens, user_id};
use crate::exception::{Error, Result};

pub const NO_ACTIVE_ACCOUNT: &str = "No active account found with the given credentials";

/// Token from an `Authorization: Bearer <token>` header
///
/// Returns `Ok(None)` when the header is absent and an error when it is
/// present but not a bearer credential.
pub fn bearer_token(request: &Request) -> Result<Option<&str>> {
	let Some(value) = request.headers.get("authorization") else {
		return Ok(None);
	};
	let value = value
		.to_str()
		.map_err(|_| Error::Unauthorized("Invalid Authorization header".to_string()))?;

	match value.split_once(' ') {
		Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
			Ok(Some(token.trim()))
		}
		_ => Err(Error::Unauthorized(
			"Authorization header must contain two space-delimited values: Bearer <token>".to_string(),
		)),
	}
}

/// Resolve the acting user from the bearer token
///
/// No `Authorization` header means an anonymous request (`Ok(None)`). A
/// header that is present but malformed, expired, of the wrong token type
/// or pointing at a missing or inactive user fails with `Unauthorized`.
pub async fn authenticate(tokens: &Tokens, db: &SqlitePool, request: &Request) -> Result<Option<User>> {
	let Some(token) = bearer_token(request)? else {
		return Ok(None);
	};

	let claims = tokens.verify(token, TokenType::Access)?;
	let user = User::get(db, user_id(&claims)?)
		.await?
		.ok_or_else(|| Error::Unauthorized("User not found".to_string()))?;

	if !user.is_active {
		return Err(Error::Unauthorized("User is inactive".to_string()));
	}
	Ok(Some(user))
}

/// Hash `password` on the blocking pool
pub async fn hash_password(hasher: Arc<dyn PasswordHasher>, password: String) -> Result<String> {
	tokio::task::spawn_blocking(move || hasher.hash(&password))
		.await
		.map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
		.map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Check `password` against `hash` on the blocking pool
///
/// A hash the hasher cannot parse, such as an unusable password, never
/// matches.
pub async fn verify_password(
	hasher: Arc<dyn PasswordHasher>,
	password: String,
	hash: String,
) -> Result<bool> {
	let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
		.await
		.map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))?;
	match verified {
		Ok(matches) => Ok(matches),
		Err(e) => {
			tracing::warn!(error = %e, "Stored password hash could not be verified");
			Ok(false)
		}
	}
}

/// Check an email and password pair
///
/// Unknown emails, wrong passwords and inactive accounts all fail with the
/// same message.
pub async fn authenticate_credentials(
	db: &SqlitePool,
	hasher: Arc<dyn PasswordHasher>,
	email: &str,
	password: &str,
) -> Result<User> {
	let Some(user) = User::get_by_email(db, email).await? else {
		return Err(Error::Unauthorized(NO_ACTIVE_ACCOUNT.to_string()));
	};

	let matches = verify_password(hasher, password.to_string(), user.password_hash.clone()).await?;
	if !matches || !user.is_active {
		tracing::info!(user_id = user.id, "Rejected login attempt");
		return Err(Error::Unauthorized(NO_ACTIVE_ACCOUNT.to_string()));
	}
	Ok(user)
}
