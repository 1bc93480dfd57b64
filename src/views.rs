//! ViewSet plumbing shared by the resource apps
//!
//! A [`ViewSet`] owns the CRUD actions for one resource kind. The generic
//! [`dispatch`] loads the target object, builds the
//! [`OperationDescriptor`](crate::permissions::OperationDescriptor), runs the
//! permission check and only then hands control to the action.
//!
//! The shortcuts at the bottom wrap [`reinhardt::Response`] for the
//! viewsets and turn request bodies into serializer input.

use async_trait::async_trait;
use reinhardt::{Method, Request, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;

use crate::app::AppState;
use crate::apps::accounts::models::User;
use crate::apps::projects::models::Project;
use crate::exception::{Error, FieldErrors, Result};
use crate::permissions::{self, OperationDescriptor, ProjectAccess, ResourceKind};

/// Action type for ViewSet operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	List,
	Retrieve,
	Create,
	Update,
	PartialUpdate,
	Destroy,
}

impl Action {
	/// Map an HTTP method onto an action
	///
	/// `detail` tells whether the path addresses a single object. Any other
	/// combination is rejected with `MethodNotAllowed`.
	///
	/// # Examples
	///
	/// ```
	/// use issuetracker::views::Action;
	/// use reinhardt::Method;
	///
	/// assert_eq!(Action::from_method(&Method::PATCH, true).unwrap(), Action::PartialUpdate);
	/// assert!(Action::from_method(&Method::DELETE, false).is_err());
	/// ```
	pub fn from_method(method: &Method, detail: bool) -> Result<Self> {
		match (method, detail) {
			(&Method::GET, false) => Ok(Action::List),
			(&Method::POST, false) => Ok(Action::Create),
			(&Method::GET, true) => Ok(Action::Retrieve),
			(&Method::PUT, true) => Ok(Action::Update),
			(&Method::PATCH, true) => Ok(Action::PartialUpdate),
			(&Method::DELETE, true) => Ok(Action::Destroy),
			_ => Err(Error::MethodNotAllowed(format!(
				"Method \"{}\" not allowed.",
				method
			))),
		}
	}

	/// Read-only actions
	pub fn is_safe(&self) -> bool {
		matches!(self, Action::List | Action::Retrieve)
	}

	pub fn name(&self) -> &'static str {
		match self {
			Action::List => "list",
			Action::Retrieve => "retrieve",
			Action::Create => "create",
			Action::Update => "update",
			Action::PartialUpdate => "partial_update",
			Action::Destroy => "destroy",
		}
	}
}

/// Everything an action needs once the permission check passed
pub struct RequestContext<'a> {
	pub state: &'a AppState,
	pub request: &'a Request,
	pub user: &'a User,
}

impl RequestContext<'_> {
	pub fn db(&self) -> &SqlitePool {
		&self.state.db
	}
}

/// ViewSet trait
///
/// `Parent` is the already resolved enclosing chain (for example the
/// project and issue a comment lives under) and `Object` the row a detail
/// action targets.
#[async_trait]
pub trait ViewSet: Send + Sync {
	type Parent: Send + Sync;
	type Object: Send + Sync;

	/// Resource kind checked by the permission predicate
	const KIND: ResourceKind;

	fn basename(&self) -> &'static str;

	/// Load the object addressed by `pk` inside `parent`
	async fn get_object(&self, db: &SqlitePool, parent: &Self::Parent, pk: i64) -> Result<Self::Object>;

	/// Project the operation is scoped to, if any
	fn scope<'a>(&self, parent: &'a Self::Parent, object: Option<&'a Self::Object>) -> Option<&'a Project>;

	/// Author recorded on the object itself
	fn object_author(&self, _object: &Self::Object) -> Option<i64> {
		None
	}

	async fn list(&self, ctx: &RequestContext<'_>, parent: &Self::Parent) -> Result<Response>;

	async fn create(&self, ctx: &RequestContext<'_>, parent: &Self::Parent) -> Result<Response>;

	async fn retrieve(
		&self,
		ctx: &RequestContext<'_>,
		parent: &Self::Parent,
		object: Self::Object,
	) -> Result<Response>;

	async fn update(
		&self,
		ctx: &RequestContext<'_>,
		parent: &Self::Parent,
		object: Self::Object,
		partial: bool,
	) -> Result<Response>;

	async fn destroy(
		&self,
		ctx: &RequestContext<'_>,
		parent: &Self::Parent,
		object: Self::Object,
	) -> Result<Response>;
}

/// Run one request through a viewset
///
/// `pk` is `None` for collection paths. Missing objects fail with
/// `NotFound` before the permission check runs.
pub async fn dispatch<V: ViewSet>(
	viewset: &V,
	state: &AppState,
	request: &Request,
	actor: Option<&User>,
	parent: V::Parent,
	pk: Option<i64>,
) -> Result<Response> {
	let action = Action::from_method(&request.method, pk.is_some())?;

	let Some(pk) = pk else {
		let project = resolve_access(state, viewset.scope(&parent, None), actor).await?;
		let descriptor = OperationDescriptor::collection(V::KIND, action, project);
		let user = permissions::check(actor, &descriptor)?;
		let ctx = RequestContext {
			state,
			request,
			user,
		};
		tracing::debug!(
			basename = viewset.basename(),
			action = action.name(),
			user_id = user.id,
			"Dispatching collection action"
		);
		return match action {
			Action::List => viewset.list(&ctx, &parent).await,
			Action::Create => viewset.create(&ctx, &parent).await,
			other => Err(Error::MethodNotAllowed(format!(
				"Action \"{}\" needs an object id.",
				other.name()
			))),
		};
	};

	let object = viewset.get_object(&state.db, &parent, pk).await?;
	let project = resolve_access(state, viewset.scope(&parent, Some(&object)), actor).await?;
	let descriptor =
		OperationDescriptor::object(V::KIND, action, project, viewset.object_author(&object));
	let user = permissions::check(actor, &descriptor)?;
	let ctx = RequestContext {
		state,
		request,
		user,
	};
	tracing::debug!(
		basename = viewset.basename(),
		action = action.name(),
		pk,
		user_id = user.id,
		"Dispatching detail action"
	);

	match action {
		Action::Retrieve => viewset.retrieve(&ctx, &parent, object).await,
		Action::Update => viewset.update(&ctx, &parent, object, false).await,
		Action::PartialUpdate => viewset.update(&ctx, &parent, object, true).await,
		Action::Destroy => viewset.destroy(&ctx, &parent, object).await,
		other => Err(Error::MethodNotAllowed(format!(
			"Action \"{}\" does not take an object id.",
			other.name()
		))),
	}
}

async fn resolve_access(
	state: &AppState,
	project: Option<&Project>,
	actor: Option<&User>,
) -> Result<Option<ProjectAccess>> {
	match project {
		Some(project) => Ok(Some(ProjectAccess::resolve(&state.db, project, actor).await?)),
		None => Ok(None),
	}
}

/// Unwrap a lookup result or fail with 404
///
/// `name` is the model name used in the error detail.
///
/// # Examples
///
/// ```
/// use issuetracker::views::get_or_404;
///
/// assert_eq!(get_or_404(Some(3), "Project").unwrap(), 3);
///
/// let missing = get_or_404(None::<i64>, "Project").unwrap_err();
/// assert_eq!(missing.to_string(), "Not found: No Project matches the given query.");
/// ```
pub fn get_or_404<T>(found: Option<T>, name: &str) -> Result<T> {
	found.ok_or_else(|| Error::NotFound(format!("No {} matches the given query.", name)))
}

/// 200 response with `data` as JSON
pub fn render_json<T: Serialize>(data: &T) -> Result<Response> {
	Response::ok()
		.with_json(data)
		.map_err(|e| Error::Internal(format!("Failed to serialize response: {}", e)))
}

/// 201 response with `data` as JSON
pub fn render_created<T: Serialize>(data: &T) -> Result<Response> {
	Response::created()
		.with_json(data)
		.map_err(|e| Error::Internal(format!("Failed to serialize response: {}", e)))
}

/// Parse the request body as JSON
///
/// An empty body parses as `{}` so that missing fields are reported by
/// the serializer rather than as a parse error.
pub fn parse_body<T: DeserializeOwned>(request: &Request) -> Result<T> {
	let body: &[u8] = if request.body().is_empty() {
		b"{}"
	} else {
		request.body()
	};
	serde_json::from_slice(body).map_err(|e| {
		Error::Validation(FieldErrors::non_field(format!("JSON parse error - {}", e)))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use hyper::{HeaderMap, Version};
	use rstest::rstest;

	fn post_with_body(body: &'static str) -> Request {
		Request::builder()
			.method(Method::POST)
			.uri("/projects/")
			.version(Version::HTTP_11)
			.headers(HeaderMap::new())
			.body(Bytes::from_static(body.as_bytes()))
			.build()
			.unwrap()
	}

	#[rstest]
	fn test_parse_body_empty_is_empty_object() {
		let value: serde_json::Value = parse_body(&post_with_body("")).unwrap();
		assert_eq!(value, serde_json::json!({}));
	}

	#[rstest]
	fn test_parse_body_malformed_is_validation_error() {
		let result: Result<serde_json::Value> = parse_body(&post_with_body("{not json"));
		match result {
			Err(Error::Validation(errors)) => {
				assert!(errors.get("non_field_errors").unwrap()[0].starts_with("JSON parse error"))
			}
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_render_created_sets_status_and_content_type() {
		let response = render_created(&serde_json::json!({"id": 1})).unwrap();

		assert_eq!(response.status, reinhardt::StatusCode::CREATED);
		assert_eq!(response.headers.get("content-type").unwrap(), "application/json");
		let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
		assert_eq!(body["id"], 1);
	}

	#[rstest]
	#[case(Method::GET, false, Action::List)]
	#[case(Method::POST, false, Action::Create)]
	#[case(Method::GET, true, Action::Retrieve)]
	#[case(Method::PUT, true, Action::Update)]
	#[case(Method::PATCH, true, Action::PartialUpdate)]
	#[case(Method::DELETE, true, Action::Destroy)]
	fn test_action_from_method(#[case] method: Method, #[case] detail: bool, #[case] expected: Action) {
		assert_eq!(Action::from_method(&method, detail).unwrap(), expected);
	}

	#[rstest]
	#[case(Method::PUT, false)]
	#[case(Method::PATCH, false)]
	#[case(Method::DELETE, false)]
	#[case(Method::POST, true)]
	#[case(Method::OPTIONS, true)]
	fn test_action_from_method_rejects(#[case] method: Method, #[case] detail: bool) {
		assert!(matches!(
			Action::from_method(&method, detail),
			Err(Error::MethodNotAllowed(_))
		));
	}

	#[rstest]
	fn test_safe_actions() {
		assert!(Action::List.is_safe());
		assert!(Action::Retrieve.is_safe());
		assert!(!Action::Create.is_safe());
		assert!(!Action::Update.is_safe());
		assert!(!Action::PartialUpdate.is_safe());
		assert!(!Action::Destroy.is_safe());
	}
}
