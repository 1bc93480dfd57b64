//! Application state and the request handler served by `manage runserver`

use async_trait::async_trait;
use chrono::Duration;
use reinhardt::urls::routers::UnifiedRouter;
use reinhardt::{Argon2Hasher, Handler, PasswordHasher, Request, Response};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

use crate::apps::accounts::models::User;
use crate::apps::accounts::views as accounts;
use crate::apps::issues::models::Issue;
use crate::apps::issues::views::{CommentViewSet, IssueScope, IssueViewSet};
use crate::apps::projects::models::Project;
use crate::apps::projects::views::{ContributorViewSet, ProjectViewSet};
use crate::auth::{self, PasswordValidators, Tokens};
use crate::conf::Settings;
use crate::exception::{Error, Result};
use crate::urls::{self, Route};
use crate::views::{dispatch, get_or_404};

/// Read-only state shared by every request
pub struct AppState {
	pub settings: Settings,
	pub db: SqlitePool,
	pub tokens: Tokens,
	pub hasher: Arc<dyn PasswordHasher>,
	pub password_validators: PasswordValidators,
}

impl AppState {
	pub fn new(settings: Settings, db: SqlitePool) -> Self {
		let tokens = Tokens::new(
			&settings.secret_key,
			Duration::seconds(settings.access_token_lifetime_secs),
			Duration::seconds(settings.refresh_token_lifetime_secs),
		);
		let password_validators = PasswordValidators::standard(settings.password_min_length);
		Self {
			settings,
			db,
			tokens,
			hasher: Arc::new(Argon2Hasher::new()),
			password_validators,
		}
	}
}

/// The API: the URL router plus the state its views share
#[derive(Clone)]
pub struct App {
	state: Arc<AppState>,
	router: Arc<UnifiedRouter>,
}

impl App {
	pub fn new(state: AppState) -> Self {
		let state = Arc::new(state);
		let router = urls::url_patterns(Arc::clone(&state));
		Self {
			state,
			router: Arc::new(router),
		}
	}

	pub fn state(&self) -> &AppState {
		&self.state
	}

	/// Route `request`, answering unmatched paths with a JSON 404
	pub async fn respond(&self, request: Request) -> Response {
		let method = request.method.clone();
		let path = request.path().to_string();
		let started = Instant::now();

		let response = match self.router.handle(request).await {
			Ok(response) => response,
			Err(error) => {
				tracing::debug!(error = %error, path = %path, "No route matched");
				Error::NotFound(format!("No route matches '{}'", path)).into()
			}
		};

		tracing::info!(
			%method,
			path = %path,
			status = response.status.as_u16(),
			latency_ms = started.elapsed().as_millis() as u64,
			"Handled request"
		);
		response
	}
}

#[async_trait]
impl Handler for App {
	async fn handle(&self, request: Request) -> reinhardt::Result<Response> {
		Ok(self.respond(request).await)
	}
}

/// Run a resolved route: authenticate, load the parent chain, dispatch
pub async fn handle_route(state: &AppState, route: Route, request: &Request) -> Result<Response> {
	let db = &state.db;

	match route {
		Route::Signup => accounts::signup(state, request).await,
		Route::Login => accounts::login(state, request).await,
		Route::LoginRefresh => accounts::refresh(state, request).await,
		Route::Projects { project } => {
			let actor = authenticate(state, request).await?;
			dispatch(&ProjectViewSet, state, request, actor.as_ref(), (), project).await
		}
		Route::Contributors { project, user } => {
			let actor = authenticate(state, request).await?;
			let project = get_or_404(Project::get(db, project).await?, "Project")?;
			dispatch(&ContributorViewSet, state, request, actor.as_ref(), project, user).await
		}
		Route::Issues { project, issue } => {
			let actor = authenticate(state, request).await?;
			let project = get_or_404(Project::get(db, project).await?, "Project")?;
			dispatch(&IssueViewSet, state, request, actor.as_ref(), project, issue).await
		}
		Route::Comments {
			project,
			issue,
			comment,
		} => {
			let actor = authenticate(state, request).await?;
			let project = get_or_404(Project::get(db, project).await?, "Project")?;
			let issue = get_or_404(Issue::get_in_project(db, project.id, issue).await?, "Issue")?;
			let scope = IssueScope { project, issue };
			dispatch(&CommentViewSet, state, request, actor.as_ref(), scope, comment).await
		}
	}
}

async fn authenticate(state: &AppState, request: &Request) -> Result<Option<User>> {
	auth::authenticate(&state.tokens, &state.db, request).await
}
