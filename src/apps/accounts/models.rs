//! User model
//!
//! Users log in with their email address. Passwords are stored as Argon2
//! PHC strings, never in clear text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::exception::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
	pub id: i64,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	#[serde(skip_serializing)]
	pub password_hash: String,
	pub is_active: bool,
	pub is_staff: bool,
	pub is_admin: bool,
	pub date_joined: DateTime<Utc>,
}

/// Values needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
	pub email: &'a str,
	pub first_name: &'a str,
	pub last_name: &'a str,
	pub password_hash: &'a str,
	pub is_staff: bool,
	pub is_admin: bool,
}

impl<'a> NewUser<'a> {
	pub fn new(email: &'a str, first_name: &'a str, last_name: &'a str, password_hash: &'a str) -> Self {
		Self {
			email,
			first_name,
			last_name,
			password_hash,
			is_staff: false,
			is_admin: false,
		}
	}

	/// Staff and admin flags, as given to accounts created from the command line
	pub fn superuser(mut self) -> Self {
		self.is_staff = true;
		self.is_admin = true;
		self
	}
}

const SELECT_USER: &str = "SELECT id, email, first_name, last_name, password_hash, is_active, \
	is_staff, is_admin, date_joined FROM users";

impl User {
	pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<User>> {
		let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", SELECT_USER))
			.bind(id)
			.fetch_optional(db)
			.await?;
		Ok(user)
	}

	/// Look a user up by email, ignoring surrounding whitespace and the
	/// case of the domain part
	pub async fn get_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>> {
		let user = sqlx::query_as::<_, User>(&format!("{} WHERE email = ?", SELECT_USER))
			.bind(normalize_email(email))
			.fetch_optional(db)
			.await?;
		Ok(user)
	}

	pub async fn exists(db: &SqlitePool, id: i64) -> Result<bool> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
			.bind(id)
			.fetch_one(db)
			.await?;
		Ok(count > 0)
	}

	pub async fn email_taken(db: &SqlitePool, email: &str) -> Result<bool> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
			.bind(normalize_email(email))
			.fetch_one(db)
			.await?;
		Ok(count > 0)
	}

	pub async fn create(db: &SqlitePool, new: &NewUser<'_>) -> Result<User> {
		let user = sqlx::query_as::<_, User>(
			"INSERT INTO users (email, first_name, last_name, password_hash, is_active, is_staff, \
			 is_admin, date_joined) VALUES (?, ?, ?, ?, 1, ?, ?, ?) \
			 RETURNING id, email, first_name, last_name, password_hash, is_active, is_staff, \
			 is_admin, date_joined",
		)
		.bind(normalize_email(new.email))
		.bind(new.first_name.trim())
		.bind(new.last_name.trim())
		.bind(new.password_hash)
		.bind(new.is_staff)
		.bind(new.is_admin)
		.bind(Utc::now())
		.fetch_one(db)
		.await?;

		tracing::info!(user_id = user.id, "User created");
		Ok(user)
	}
}

/// Trim the address and lower-case its domain part
///
/// # Examples
///
/// ```
/// use issuetracker::apps::accounts::models::normalize_email;
///
/// assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "Jane.Doe@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
	let email = email.trim();
	match email.rsplit_once('@') {
		Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
		None => email.to_string(),
	}
}
