//! Access and refresh tokens
//!
//! Both kinds are [`reinhardt::JwtAuth`] tokens. Refresh tokens are signed
//! with a key derived from the secret, so neither kind verifies as the
//! other.

use chrono::Duration;
use reinhardt::{Claims, JwtAuth};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::apps::accounts::models::User;
use crate::exception::{Error, Result};

const INVALID_TOKEN: &str = "Token is invalid or expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
	Access,
	Refresh,
}

impl fmt::Display for TokenType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenType::Access => write!(f, "access"),
			TokenType::Refresh => write!(f, "refresh"),
		}
	}
}

/// Access and refresh token returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
	pub access: String,
	pub refresh: String,
}

/// Numeric user id carried in `sub`
pub fn user_id(claims: &Claims) -> Result<i64> {
	claims
		.sub
		.parse()
		.map_err(|_| Error::Unauthorized(INVALID_TOKEN.to_string()))
}

/// Issues and verifies both token kinds
pub struct Tokens {
	access: JwtAuth,
	refresh: JwtAuth,
	access_lifetime: Duration,
	refresh_lifetime: Duration,
}

impl Tokens {
	/// # Examples
	///
	/// ```
	/// use issuetracker::auth::Tokens;
	/// use chrono::Duration;
	///
	/// let tokens = Tokens::new("secret", Duration::minutes(5), Duration::days(1));
	/// ```
	pub fn new(secret: &str, access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
		Self {
			access: JwtAuth::new(secret.as_bytes()),
			refresh: JwtAuth::new(format!("{}:refresh", secret).as_bytes()),
			access_lifetime,
			refresh_lifetime,
		}
	}

	fn signer(&self, kind: TokenType) -> (&JwtAuth, Duration) {
		match kind {
			TokenType::Access => (&self.access, self.access_lifetime),
			TokenType::Refresh => (&self.refresh, self.refresh_lifetime),
		}
	}

	pub fn encode(&self, claims: &Claims, kind: TokenType) -> Result<String> {
		self.signer(kind)
			.0
			.encode(claims)
			.map_err(|e| Error::Internal(format!("Failed to sign {} token: {}", kind, e)))
	}

	pub fn issue(&self, user: &User, kind: TokenType) -> Result<String> {
		let (_, lifetime) = self.signer(kind);
		let claims = Claims::new(
			user.id.to_string(),
			user.email.clone(),
			lifetime,
			user.is_staff,
			user.is_admin,
		);
		self.encode(&claims, kind)
	}

	pub fn issue_pair(&self, user: &User) -> Result<TokenPair> {
		Ok(TokenPair {
			access: self.issue(user, TokenType::Access)?,
			refresh: self.issue(user, TokenType::Refresh)?,
		})
	}

	/// Check signature and expiry of a token of kind `kind`
	pub fn verify(&self, token: &str, kind: TokenType) -> Result<Claims> {
		self.signer(kind).0.verify_token(token).map_err(|e| {
			tracing::debug!(kind = %kind, error = %e, "Rejected token");
			Error::Unauthorized(INVALID_TOKEN.to_string())
		})
	}

	/// New access token for the holder of a valid refresh token
	///
	/// The `username` claim (the email) and the staff flags are copied over.
	pub fn refresh(&self, refresh_token: &str) -> Result<String> {
		let claims = self.verify(refresh_token, TokenType::Refresh)?;
		let access = Claims::new(
			claims.sub,
			claims.username,
			self.access_lifetime,
			claims.is_staff,
			claims.is_superuser,
		);
		self.encode(&access, TokenType::Access)
	}
}
