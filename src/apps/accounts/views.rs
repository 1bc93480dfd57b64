//! Registration and token endpoints
//!
//! ```text
//! POST /signup/         -> 201 user
//! POST /login/          -> 200 {"access", "refresh"}
//! POST /login/refresh/  -> 200 {"access"}
//! ```
//!
//! These endpoints are open to anonymous clients.

use reinhardt::{Method, Request, Response};
use std::sync::Arc;

use crate::app::AppState;
use crate::apps::accounts::models::{NewUser, User};
use crate::apps::accounts::serializers::{
	EMAIL_TAKEN, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, UserResponse,
};
use crate::auth::{UserAttributes, authenticate_credentials, hash_password};
use crate::exception::{Error, FieldErrors, Result};
use crate::serializers::{WriteSerializer, required};
use crate::views::{Action, parse_body, render_created, render_json};

/// Register a new user
///
/// Field rules, password strength and email uniqueness are reported
/// together. The password confirmation is only compared once every field
/// is valid.
pub async fn signup(state: &AppState, request: &Request) -> Result<Response> {
	require_post(request)?;
	let input: RegisterRequest = parse_body(request)?;

	let mut errors = match input.validate_for(Action::Create) {
		Ok(()) => FieldErrors::new(),
		Err(Error::Validation(errors)) => errors,
		Err(other) => return Err(other),
	};

	if let Some(password) = &input.password
		&& errors.get("password").is_none()
	{
		let attributes = UserAttributes {
			email: input.email.as_deref().unwrap_or_default(),
			first_name: input.first_name.as_deref().unwrap_or_default(),
			last_name: input.last_name.as_deref().unwrap_or_default(),
		};
		if let Err(Error::Validation(password_errors)) =
			state.password_validators.validate(password, &attributes)
		{
			errors.merge(password_errors);
		}
	}

	if let Some(email) = &input.email
		&& errors.get("email").is_none()
		&& User::email_taken(&state.db, email).await?
	{
		errors.add("email", EMAIL_TAKEN);
	}
	errors.into_result()?;

	input
		.validate_passwords_match()
		.map_err(|message| Error::validation("password", message))?;

	let email = required("email", &input.email)?;
	let first_name = required("first_name", &input.first_name)?;
	let last_name = required("last_name", &input.last_name)?;
	let password = required("password", &input.password)?;

	let password_hash = hash_password(Arc::clone(&state.hasher), password).await?;
	let user = User::create(
		&state.db,
		&NewUser::new(&email, &first_name, &last_name, &password_hash),
	)
	.await?;

	render_created(&UserResponse::from(&user))
}

/// Exchange credentials for an access and refresh token pair
pub async fn login(state: &AppState, request: &Request) -> Result<Response> {
	require_post(request)?;
	let input: LoginRequest = parse_body(request)?;
	input.validate_for(Action::Create)?;

	let email = required("email", &input.email)?;
	let password = required("password", &input.password)?;

	let user = authenticate_credentials(&state.db, Arc::clone(&state.hasher), &email, &password).await?;
	let pair = state.tokens.issue_pair(&user)?;
	tracing::info!(user_id = user.id, "Issued token pair");

	render_json(&pair)
}

/// Exchange a refresh token for a new access token
pub async fn refresh(state: &AppState, request: &Request) -> Result<Response> {
	require_post(request)?;
	let input: RefreshRequest = parse_body(request)?;
	input.validate_for(Action::Create)?;

	let token = required("refresh", &input.refresh)?;
	let access = state.tokens.refresh(&token)?;

	render_json(&RefreshResponse { access })
}

fn require_post(request: &Request) -> Result<()> {
	if request.method != Method::POST {
		return Err(Error::MethodNotAllowed(format!(
			"Method \"{}\" not allowed.",
			request.method
		)));
	}
	Ok(())
}
