//! Authorization predicate
//!
//! Every request is described by an [`OperationDescriptor`] and checked by
//! the single function [`check`]. The rules, in order:
//!
//! 1. anonymous requests are refused with `Unauthorized`
//! 2. any authenticated user may list or create projects
//! 3. inside a project the actor must be its author or a contributor
//! 4. read-only actions are then allowed
//! 5. creating a nested resource is allowed for members
//! 6. updates and deletes need the owner: the project author for projects
//!    and contributors, the object's own author for issues and comments

use sqlx::SqlitePool;

use crate::apps::accounts::models::User;
use crate::apps::projects::models::{Contributor, Project};
use crate::exception::{Error, Result};
use crate::views::Action;

const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Resource kinds the predicate distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
	Project,
	Contributor,
	Issue,
	Comment,
}

/// Facts about the enclosing project, resolved for the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAccess {
	pub project_id: i64,
	pub author_id: i64,
	pub is_contributor: bool,
}

impl ProjectAccess {
	/// Look up whether `actor` holds a contributor row on `project`
	pub async fn resolve(db: &SqlitePool, project: &Project, actor: Option<&User>) -> Result<Self> {
		let is_contributor = match actor {
			Some(user) => Contributor::exists(db, project.id, user.id).await?,
			None => false,
		};
		Ok(Self {
			project_id: project.id,
			author_id: project.author_user_id,
			is_contributor,
		})
	}
}

/// What the operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
	Collection,
	Object { own_author: Option<i64> },
}

/// Complete input of the authorization predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
	pub kind: ResourceKind,
	pub action: Action,
	pub project: Option<ProjectAccess>,
	pub target: Target,
}

impl OperationDescriptor {
	pub fn collection(kind: ResourceKind, action: Action, project: Option<ProjectAccess>) -> Self {
		Self {
			kind,
			action,
			project,
			target: Target::Collection,
		}
	}

	pub fn object(
		kind: ResourceKind,
		action: Action,
		project: Option<ProjectAccess>,
		own_author: Option<i64>,
	) -> Self {
		Self {
			kind,
			action,
			project,
			target: Target::Object { own_author },
		}
	}
}

/// Decide whether `actor` may perform `op`
///
/// Returns the authenticated user on success.
pub fn check<'u>(actor: Option<&'u User>, op: &OperationDescriptor) -> Result<&'u User> {
	let Some(user) = actor else {
		return Err(Error::Unauthorized(NOT_AUTHENTICATED.to_string()));
	};

	if op.kind == ResourceKind::Project && op.target == Target::Collection {
		return Ok(user);
	}

	let Some(project) = op.project else {
		return Err(deny(user, op, "operation is not scoped to a project"));
	};

	let is_author = project.author_id == user.id;
	if !is_author && !project.is_contributor {
		return Err(deny(user, op, "not a member of the project"));
	}

	if op.action.is_safe() {
		return Ok(user);
	}

	let own_author = match op.target {
		Target::Collection => return Ok(user),
		Target::Object { own_author } => own_author,
	};

	let owner = match op.kind {
		ResourceKind::Project | ResourceKind::Contributor => Some(project.author_id),
		ResourceKind::Issue | ResourceKind::Comment => own_author,
	};
	if owner == Some(user.id) {
		Ok(user)
	} else {
		Err(deny(user, op, "not the owner of the object"))
	}
}

fn deny(user: &User, op: &OperationDescriptor, reason: &str) -> Error {
	tracing::info!(
		user_id = user.id,
		project_id = op.project.map(|p| p.project_id),
		kind = ?op.kind,
		action = op.action.name(),
		reason,
		"Permission denied"
	);
	Error::Forbidden(PERMISSION_DENIED.to_string())
}
