//! Login and token refresh tests
//!
//! Tests for token issuance including:
//! - Success cases (valid credentials, refresh)
//! - Authentication errors (wrong password, inactive user, wrong token type)
//! - Bearer authentication on resource endpoints

#[cfg(test)]
mod login_tests {
	use bytes::Bytes;
	use hyper::header::AUTHORIZATION;
	use hyper::{HeaderMap, Method, StatusCode};
	use reinhardt::Response;
	use rstest::rstest;
	use serde_json::json;

	use crate::auth::tokens::user_id;
	use crate::auth::{TokenPair, TokenType};
	use crate::test_utils::factories::*;
	use crate::test_utils::fixtures::*;

	const PASSWORD: &str = "amber-Falcon-19";

	async fn login(context: &TestContext, email: &str, password: &str) -> Response {
		context
			.request(
				Method::POST,
				"/login/",
				None,
				Some(json!({"email": email, "password": password})),
			)
			.await
	}

	async fn get_projects_with_token(context: &TestContext, token: &str) -> Response {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, bearer(token));
		context
			.app
			.respond(build_request(Method::GET, "/projects/", headers, Bytes::new()))
			.await
	}

	#[rstest]
	#[tokio::test]
	async fn test_login_issues_token_pair(#[future] test_context: TestContext) {
		let context = test_context.await;
		let user = create_user_with_password(&context.db, "lee@example.com", PASSWORD).await;

		let response = login(&context, "lee@example.com", PASSWORD).await;

		assert_eq!(response.status, StatusCode::OK);
		let pair: TokenPair = serde_json::from_slice(&response.body).unwrap();
		let access = context.state().tokens.verify(&pair.access, TokenType::Access).unwrap();
		let refresh = context.state().tokens.verify(&pair.refresh, TokenType::Refresh).unwrap();
		assert_eq!(user_id(&access).unwrap(), user.id);
		assert_eq!(access.username, "lee@example.com");
		assert_eq!(user_id(&refresh).unwrap(), user.id);

		let response = get_projects_with_token(&context, &pair.access).await;
		assert_eq!(response.status, StatusCode::OK);
	}

	#[rstest]
	#[case("lee@example.com", "wrong-Password-1")]
	#[case("nobody@example.com", PASSWORD)]
	#[tokio::test]
	async fn test_login_rejects_bad_credentials(
		#[future] test_context: TestContext,
		#[case] email: &str,
		#[case] password: &str,
	) {
		let context = test_context.await;
		create_user_with_password(&context.db, "lee@example.com", PASSWORD).await;

		let response = login(&context, email, password).await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.json_body().unwrap()["detail"],
			"No active account found with the given credentials"
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_login_rejects_inactive_user(#[future] test_context: TestContext) {
		let context = test_context.await;
		let user = create_user_with_password(&context.db, "lee@example.com", PASSWORD).await;
		deactivate_user(&context.db, &user).await;

		let response = login(&context, "lee@example.com", PASSWORD).await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_login_requires_fields(#[future] test_context: TestContext) {
		let context = test_context.await;

		let response = context.request(Method::POST, "/login/", None, Some(json!({}))).await;

		assert_eq!(response.status, StatusCode::BAD_REQUEST);
		let body = response.json_body().unwrap();
		assert!(body.get("email").is_some());
		assert!(body.get("password").is_some());
	}

	#[rstest]
	#[tokio::test]
	async fn test_refresh_returns_new_access_token(#[future] test_context: TestContext) {
		let context = test_context.await;
		let user = create_user(&context.db, "lee@example.com").await;
		let pair = context.state().tokens.issue_pair(&user).unwrap();

		let response = context
			.request(
				Method::POST,
				"/login/refresh/",
				None,
				Some(json!({"refresh": pair.refresh})),
			)
			.await;

		assert_eq!(response.status, StatusCode::OK);
		let body = response.json_body().unwrap();
		let access = body["access"].as_str().unwrap();
		let claims = context.state().tokens.verify(access, TokenType::Access).unwrap();
		assert_eq!(user_id(&claims).unwrap(), user.id);
	}

	#[rstest]
	#[tokio::test]
	async fn test_refresh_rejects_access_token(#[future] test_context: TestContext) {
		let context = test_context.await;
		let user = create_user(&context.db, "lee@example.com").await;
		let pair = context.state().tokens.issue_pair(&user).unwrap();

		let response = context
			.request(
				Method::POST,
				"/login/refresh/",
				None,
				Some(json!({"refresh": pair.access})),
			)
			.await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_refresh_token_is_not_a_bearer_credential(#[future] test_context: TestContext) {
		let context = test_context.await;
		let user = create_user(&context.db, "lee@example.com").await;
		let pair = context.state().tokens.issue_pair(&user).unwrap();

		let response = get_projects_with_token(&context, &pair.refresh).await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_malformed_bearer_token(#[future] test_context: TestContext) {
		let context = test_context.await;

		let response = get_projects_with_token(&context, "not.a.jwt").await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert!(response.headers.get("www-authenticate").is_some());
	}

	#[rstest]
	#[tokio::test]
	async fn test_token_of_inactive_user_is_rejected(#[future] test_context: TestContext) {
		let context = test_context.await;
		let user = create_user(&context.db, "lee@example.com").await;
		let token = context.token_for(&user);
		deactivate_user(&context.db, &user).await;

		let response = get_projects_with_token(&context, &token).await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	}

	#[rstest]
	#[tokio::test]
	async fn test_anonymous_request_is_unauthorized(#[future] test_context: TestContext) {
		let context = test_context.await;

		let response = context.request(Method::GET, "/projects/", None, None).await;

		assert_eq!(response.status, StatusCode::UNAUTHORIZED);
		assert_eq!(
			response.json_body().unwrap()["detail"],
			"Authentication credentials were not provided."
		);
	}
}
