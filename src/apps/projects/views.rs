//! Project and contributor viewsets

use async_trait::async_trait;
use reinhardt::Response;
use sqlx::SqlitePool;

use crate::apps::accounts::models::User;
use crate::apps::issues::models::Issue;
use crate::apps::projects::models::{Contributor, NewProject, Permission, Project, ProjectType, Role};
use crate::apps::projects::serializers::{
	ALREADY_CONTRIBUTOR, ContributorDetailResponse, ContributorInput, ContributorResponse,
	ProjectDetailResponse, ProjectInput, ProjectResponse, UNKNOWN_USER,
};
use crate::exception::{Error, Result};
use crate::permissions::ResourceKind;
use crate::serializers::{WriteSerializer, choice, required};
use crate::views::{Action, RequestContext, ViewSet, get_or_404, parse_body, render_created, render_json};

/// `/projects/` and `/projects/{id}/`
pub struct ProjectViewSet;

#[async_trait]
impl ViewSet for ProjectViewSet {
	type Parent = ();
	type Object = Project;

	const KIND: ResourceKind = ResourceKind::Project;

	fn basename(&self) -> &'static str {
		"project"
	}

	async fn get_object(&self, db: &SqlitePool, _parent: &(), pk: i64) -> Result<Project> {
		get_or_404(Project::get(db, pk).await?, "Project")
	}

	fn scope<'a>(&self, _parent: &'a (), object: Option<&'a Project>) -> Option<&'a Project> {
		object
	}

	fn object_author(&self, object: &Project) -> Option<i64> {
		Some(object.author_user_id)
	}

	async fn list(&self, ctx: &RequestContext<'_>, _parent: &()) -> Result<Response> {
		let projects = Project::list(ctx.db()).await?;
		let data: Vec<ProjectResponse> = projects.iter().map(ProjectResponse::from).collect();
		render_json(&data)
	}

	async fn create(&self, ctx: &RequestContext<'_>, _parent: &()) -> Result<Response> {
		let input: ProjectInput = parse_body(ctx.request)?;
		input.validate_for(Action::Create)?;

		let project_type: ProjectType = required("type", &choice("type", &input.project_type)?)?;
		let project = Project::create(
			ctx.db(),
			&NewProject {
				title: required("title", &input.title)?,
				description: input.description.clone().unwrap_or_default(),
				project_type,
				author_user_id: ctx.user.id,
			},
		)
		.await?;
		tracing::info!(project_id = project.id, user_id = ctx.user.id, "Created project");

		render_created(&ProjectResponse::from(&project))
	}

	async fn retrieve(&self, ctx: &RequestContext<'_>, _parent: &(), object: Project) -> Result<Response> {
		let contributors = Contributor::list_for_project(ctx.db(), object.id).await?;
		let issues = Issue::list_for_project(ctx.db(), object.id).await?;
		render_json(&ProjectDetailResponse::new(&object, &contributors, &issues))
	}

	async fn update(
		&self,
		ctx: &RequestContext<'_>,
		_parent: &(),
		mut object: Project,
		partial: bool,
	) -> Result<Response> {
		let input: ProjectInput = parse_body(ctx.request)?;
		input.validate_for(if partial { Action::PartialUpdate } else { Action::Update })?;

		if let Some(title) = &input.title {
			object.title = title.clone();
		}
		if let Some(description) = &input.description {
			object.description = description.clone();
		}
		if let Some(project_type) = choice("type", &input.project_type)? {
			object.project_type = project_type;
		}
		object.save(ctx.db()).await?;

		render_json(&ProjectResponse::from(&object))
	}

	async fn destroy(&self, ctx: &RequestContext<'_>, _parent: &(), object: Project) -> Result<Response> {
		object.delete(ctx.db()).await?;
		tracing::info!(project_id = object.id, user_id = ctx.user.id, "Deleted project");
		Ok(Response::no_content())
	}
}

/// `/projects/{id}/users/` and `/projects/{id}/users/{user_id}/`
///
/// Contributors are addressed by the id of the user they link.
pub struct ContributorViewSet;

#[async_trait]
impl ViewSet for ContributorViewSet {
	type Parent = Project;
	type Object = Contributor;

	const KIND: ResourceKind = ResourceKind::Contributor;

	fn basename(&self) -> &'static str {
		"contributor"
	}

	async fn get_object(&self, db: &SqlitePool, parent: &Project, pk: i64) -> Result<Contributor> {
		get_or_404(Contributor::get(db, parent.id, pk).await?, "Contributor")
	}

	fn scope<'a>(&self, parent: &'a Project, _object: Option<&'a Contributor>) -> Option<&'a Project> {
		Some(parent)
	}

	async fn list(&self, ctx: &RequestContext<'_>, parent: &Project) -> Result<Response> {
		let contributors = Contributor::list_for_project(ctx.db(), parent.id).await?;
		let data: Vec<ContributorResponse> =
			contributors.iter().map(ContributorResponse::from).collect();
		render_json(&data)
	}

	async fn create(&self, ctx: &RequestContext<'_>, parent: &Project) -> Result<Response> {
		let input: ContributorInput = parse_body(ctx.request)?;
		input.validate_for(Action::Create)?;

		let user_id = required("user_id", &input.user_id)?;
		let permission: Permission = required("permission", &choice("permission", &input.permission)?)?;
		let role: Role = required("role", &choice("role", &input.role)?)?;

		if !User::exists(ctx.db(), user_id).await? {
			return Err(Error::validation("user_id", format!("{} {}", user_id, UNKNOWN_USER)));
		}
		if Contributor::exists(ctx.db(), parent.id, user_id).await? {
			return Err(Error::validation("user_id", ALREADY_CONTRIBUTOR));
		}

		let contributor = Contributor::create(ctx.db(), parent.id, user_id, permission, role).await?;
		tracing::info!(
			project_id = parent.id,
			contributor_user_id = user_id,
			user_id = ctx.user.id,
			"Added contributor"
		);

		render_created(&ContributorResponse::from(&contributor))
	}

	async fn retrieve(
		&self,
		ctx: &RequestContext<'_>,
		_parent: &Project,
		object: Contributor,
	) -> Result<Response> {
		let user = get_or_404(User::get(ctx.db(), object.user_id).await?, "User")?;
		render_json(&ContributorDetailResponse::new(&object, &user))
	}

	async fn update(
		&self,
		ctx: &RequestContext<'_>,
		_parent: &Project,
		mut object: Contributor,
		partial: bool,
	) -> Result<Response> {
		let input: ContributorInput = parse_body(ctx.request)?;
		input.validate_for(if partial { Action::PartialUpdate } else { Action::Update })?;

		if let Some(user_id) = input.user_id
			&& user_id != object.user_id
		{
			return Err(Error::validation("user_id", "The contributing user cannot be changed."));
		}
		if let Some(permission) = choice("permission", &input.permission)? {
			object.permission = permission;
		}
		if let Some(role) = choice("role", &input.role)? {
			object.role = role;
		}
		object.save(ctx.db()).await?;

		render_json(&ContributorResponse::from(&object))
	}

	async fn destroy(
		&self,
		ctx: &RequestContext<'_>,
		parent: &Project,
		object: Contributor,
	) -> Result<Response> {
		let reassigned = object.remove(ctx.db(), parent.author_user_id).await?;
		tracing::info!(
			project_id = parent.id,
			contributor_user_id = object.user_id,
			reassigned,
			user_id = ctx.user.id,
			"Removed contributor"
		);
		Ok(Response::no_content())
	}
}
