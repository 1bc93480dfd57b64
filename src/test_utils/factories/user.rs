//! User factory.

use reinhardt::Argon2Hasher;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::apps::accounts::models::{NewUser, User};
use crate::auth::hash_password;

/// Stored hash that no password verifies against
pub const UNUSABLE_PASSWORD: &str = "!";

/// Create an active user that cannot log in
///
/// The first name is derived from the local part of `email`.
pub async fn create_user(db: &SqlitePool, email: &str) -> User {
	let first_name = email.split('@').next().unwrap_or("user");
	User::create(db, &NewUser::new(email, first_name, "Tester", UNUSABLE_PASSWORD))
		.await
		.expect("User creation should not fail")
}

/// Create a user whose password is hashed with Argon2
pub async fn create_user_with_password(db: &SqlitePool, email: &str, password: &str) -> User {
	let password_hash = hash_password(Arc::new(Argon2Hasher::new()), password.to_string())
		.await
		.expect("Password hashing should not fail");
	User::create(db, &NewUser::new(email, "Robin", "Tester", &password_hash))
		.await
		.expect("User creation should not fail")
}

/// Mark `user` inactive
pub async fn deactivate_user(db: &SqlitePool, user: &User) {
	sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
		.bind(user.id)
		.execute(db)
		.await
		.expect("User update should not fail");
}
