//! Application fixture for HTTP-level tests.

use bytes::Bytes;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use hyper::{HeaderMap, Version};
use reinhardt::{Method, Request, Response};
use rstest::*;
use sqlx::SqlitePool;

use crate::app::{App, AppState};
use crate::apps::accounts::models::User;
use crate::auth::TokenType;
use crate::conf::Settings;

use super::database::test_database;

/// Test context containing the application and its database.
pub struct TestContext {
	pub app: App,
	pub db: SqlitePool,
}

impl TestContext {
	pub fn state(&self) -> &AppState {
		self.app.state()
	}

	/// Access token for `user`, signed with the test settings
	pub fn token_for(&self, user: &User) -> String {
		self.state()
			.tokens
			.issue(user, TokenType::Access)
			.expect("Token issuance should not fail")
	}

	/// Send a request through the full handler
	///
	/// `user` is authenticated with a fresh access token; `None` sends the
	/// request anonymously.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		user: Option<&User>,
		body: Option<serde_json::Value>,
	) -> Response {
		let mut headers = HeaderMap::new();
		if let Some(user) = user {
			headers.insert(AUTHORIZATION, bearer(&self.token_for(user)));
		}
		let body = match body {
			Some(body) => {
				headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
				Bytes::from(body.to_string())
			}
			None => Bytes::new(),
		};
		self.app.respond(build_request(method, path, headers, body)).await
	}

	pub async fn get(&self, path: &str, user: &User) -> Response {
		self.request(Method::GET, path, Some(user), None).await
	}

	pub async fn post(&self, path: &str, user: &User, body: serde_json::Value) -> Response {
		self.request(Method::POST, path, Some(user), Some(body)).await
	}

	pub async fn patch(&self, path: &str, user: &User, body: serde_json::Value) -> Response {
		self.request(Method::PATCH, path, Some(user), Some(body)).await
	}

	pub async fn put(&self, path: &str, user: &User, body: serde_json::Value) -> Response {
		self.request(Method::PUT, path, Some(user), Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: &User) -> Response {
		self.request(Method::DELETE, path, Some(user), None).await
	}
}

/// `Authorization` header value carrying `token`
pub fn bearer(token: &str) -> HeaderValue {
	HeaderValue::from_str(&format!("Bearer {}", token)).expect("Token should be a valid header value")
}

/// HTTP/1.1 request with the given headers and raw body
pub fn build_request(method: Method, path: &str, headers: HeaderMap, body: Bytes) -> Request {
	Request::builder()
		.method(method)
		.uri(path)
		.version(Version::HTTP_11)
		.headers(headers)
		.body(body)
		.build()
		.expect("Test request should be valid")
}

/// Decode a response body as JSON
pub trait ResponseJson {
	fn json_body(&self) -> serde_json::Result<serde_json::Value>;
}

impl ResponseJson for Response {
	fn json_body(&self) -> serde_json::Result<serde_json::Value> {
		serde_json::from_slice(&self.body)
	}
}

/// Settings used by every test application
pub fn test_settings() -> Settings {
	Settings {
		secret_key: "test-secret-key".to_string(),
		database_url: "sqlite::memory:".to_string(),
		..Settings::default()
	}
}

/// Test context fixture.
///
/// Creates a complete test environment with:
/// - in-memory SQLite database with migrations
/// - the application handler built on top of it
#[fixture]
pub async fn test_context(#[future] test_database: SqlitePool) -> TestContext {
	let db = test_database.await;
	let app = App::new(AppState::new(test_settings(), db.clone()));
	TestContext { app, db }
}
