//! URL configuration
//!
//! Every endpoint is registered on a [`UnifiedRouter`](reinhardt::urls::routers::UnifiedRouter) for all
//! methods; the viewsets answer 405 themselves. Resources nest the same way
//! ownership does: issues and contributors live under a project, comments
//! under an issue.
//!
//! ```text
//! /signup/
//! /login/
//! /login/refresh/
//! /projects/[{project_id}/]
//! /projects/{project_id}/users/[{user_id}/]
//! /projects/{project_id}/issues/[{issue_id}/]
//! /projects/{project_id}/issues/{issue_id}/comments/[{comment_id}/]
//! ```

use reinhardt::urls::routers::UnifiedRouter;
use reinhardt::{Method, Request, Response};
use std::sync::Arc;

use crate::app::{AppState, handle_route};
use crate::exception::{Error, Result};

const METHODS: [Method; 7] = [
	Method::GET,
	Method::POST,
	Method::PUT,
	Method::PATCH,
	Method::DELETE,
	Method::HEAD,
	Method::OPTIONS,
];

/// A registered URL pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
	Signup,
	Login,
	LoginRefresh,
	ProjectList,
	ProjectDetail,
	ContributorList,
	ContributorDetail,
	IssueList,
	IssueDetail,
	CommentList,
	CommentDetail,
}

impl Endpoint {
	pub const ALL: [Endpoint; 11] = [
		Endpoint::Signup,
		Endpoint::Login,
		Endpoint::LoginRefresh,
		Endpoint::ProjectList,
		Endpoint::ProjectDetail,
		Endpoint::ContributorList,
		Endpoint::ContributorDetail,
		Endpoint::IssueList,
		Endpoint::IssueDetail,
		Endpoint::CommentList,
		Endpoint::CommentDetail,
	];

	pub fn pattern(&self) -> &'static str {
		match self {
			Endpoint::Signup => "/signup/",
			Endpoint::Login => "/login/",
			Endpoint::LoginRefresh => "/login/refresh/",
			Endpoint::ProjectList => "/projects/",
			Endpoint::ProjectDetail => "/projects/{project_id}/",
			Endpoint::ContributorList => "/projects/{project_id}/users/",
			Endpoint::ContributorDetail => "/projects/{project_id}/users/{user_id}/",
			Endpoint::IssueList => "/projects/{project_id}/issues/",
			Endpoint::IssueDetail => "/projects/{project_id}/issues/{issue_id}/",
			Endpoint::CommentList => "/projects/{project_id}/issues/{issue_id}/comments/",
			Endpoint::CommentDetail => {
				"/projects/{project_id}/issues/{issue_id}/comments/{comment_id}/"
			}
		}
	}

	/// Route name in the `basename-list` / `basename-detail` convention
	pub fn name(&self) -> &'static str {
		match self {
			Endpoint::Signup => "signup",
			Endpoint::Login => "token-obtain-pair",
			Endpoint::LoginRefresh => "token-refresh",
			Endpoint::ProjectList => "project-list",
			Endpoint::ProjectDetail => "project-detail",
			Endpoint::ContributorList => "project-users-list",
			Endpoint::ContributorDetail => "project-users-detail",
			Endpoint::IssueList => "project-issues-list",
			Endpoint::IssueDetail => "project-issues-detail",
			Endpoint::CommentList => "issue-comments-list",
			Endpoint::CommentDetail => "issue-comments-detail",
		}
	}
}

/// A matched endpoint with the ids of every path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
	Signup,
	Login,
	LoginRefresh,
	Projects {
		project: Option<i64>,
	},
	Contributors {
		project: i64,
		user: Option<i64>,
	},
	Issues {
		project: i64,
		issue: Option<i64>,
	},
	Comments {
		project: i64,
		issue: i64,
		comment: Option<i64>,
	},
}

/// Read the ids the router captured for `endpoint`
///
/// Ids must be plain decimal numbers; anything else is a 404.
pub fn resolve(endpoint: Endpoint, request: &Request) -> Result<Route> {
	let id = |name: &str| path_id(request, name);

	let route = match endpoint {
		Endpoint::Signup => Route::Signup,
		Endpoint::Login => Route::Login,
		Endpoint::LoginRefresh => Route::LoginRefresh,
		Endpoint::ProjectList => Route::Projects { project: None },
		Endpoint::ProjectDetail => Route::Projects {
			project: Some(id("project_id")?),
		},
		Endpoint::ContributorList => Route::Contributors {
			project: id("project_id")?,
			user: None,
		},
		Endpoint::ContributorDetail => Route::Contributors {
			project: id("project_id")?,
			user: Some(id("user_id")?),
		},
		Endpoint::IssueList => Route::Issues {
			project: id("project_id")?,
			issue: None,
		},
		Endpoint::IssueDetail => Route::Issues {
			project: id("project_id")?,
			issue: Some(id("issue_id")?),
		},
		Endpoint::CommentList => Route::Comments {
			project: id("project_id")?,
			issue: id("issue_id")?,
			comment: None,
		},
		Endpoint::CommentDetail => Route::Comments {
			project: id("project_id")?,
			issue: id("issue_id")?,
			comment: Some(id("comment_id")?),
		},
	};
	Ok(route)
}

fn path_id(request: &Request, name: &str) -> Result<i64> {
	request
		.path_params
		.get(name)
		.filter(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
		.and_then(|segment| segment.parse().ok())
		.ok_or_else(|| Error::NotFound(format!("No route matches '{}'", request.path())))
}

/// Router serving every endpoint against `state`
///
/// Each pattern is also registered without its trailing slash.
pub fn url_patterns(state: Arc<AppState>) -> UnifiedRouter {
	let mut router = UnifiedRouter::new();
	for endpoint in Endpoint::ALL {
		let pattern = endpoint.pattern();
		for path in [pattern, pattern.trim_end_matches('/')] {
			for method in METHODS {
				let state = Arc::clone(&state);
				router = router.function(path, method, move |request: Request| {
					let state = Arc::clone(&state);
					async move { Ok::<Response, reinhardt::Error>(respond(&state, endpoint, request).await) }
				});
			}
		}
	}
	router
}

async fn respond(state: &AppState, endpoint: Endpoint, request: Request) -> Response {
	let result = match resolve(endpoint, &request) {
		Ok(route) => {
			tracing::trace!(route = endpoint.name(), "Resolved route");
			handle_route(state, route, &request).await
		}
		Err(error) => Err(error),
	};
	result.unwrap_or_else(Response::from)
}
