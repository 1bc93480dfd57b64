//! Issue and comment viewsets

use async_trait::async_trait;
use reinhardt::Response;
use sqlx::SqlitePool;

use crate::apps::accounts::models::User;
use crate::apps::issues::models::{Comment, Issue, NewIssue, Priority, Status, Tag};
use crate::apps::issues::serializers::{
	CommentDetailResponse, CommentInput, CommentResponse, IssueDetailResponse, IssueInput,
	IssueResponse, UNKNOWN_ASSIGNEE,
};
use crate::apps::projects::models::{Contributor, Project};
use crate::exception::{Error, Result};
use crate::permissions::ResourceKind;
use crate::serializers::{WriteSerializer, choice, required};
use crate::views::{Action, RequestContext, ViewSet, get_or_404, parse_body, render_created, render_json};

/// Check that `user_id` may be assigned issues of `project`
///
/// The user must exist and be the project author or one of its
/// contributors.
async fn validate_assignee(db: &SqlitePool, project: &Project, user_id: i64) -> Result<()> {
	if !User::exists(db, user_id).await? {
		return Err(Error::validation(
			"assignee_user_id",
			format!("{} {}", user_id, UNKNOWN_ASSIGNEE),
		));
	}
	if user_id != project.author_user_id && !Contributor::exists(db, project.id, user_id).await? {
		return Err(Error::validation(
			"assignee_user_id",
			format!("assignee_user {} is no author nor contributor of this project", user_id),
		));
	}
	Ok(())
}

/// `/projects/{id}/issues/` and `/projects/{id}/issues/{issue_id}/`
pub struct IssueViewSet;

#[async_trait]
impl ViewSet for IssueViewSet {
	type Parent = Project;
	type Object = Issue;

	const KIND: ResourceKind = ResourceKind::Issue;

	fn basename(&self) -> &'static str {
		"issue"
	}

	async fn get_object(&self, db: &SqlitePool, parent: &Project, pk: i64) -> Result<Issue> {
		get_or_404(Issue::get_in_project(db, parent.id, pk).await?, "Issue")
	}

	fn scope<'a>(&self, parent: &'a Project, _object: Option<&'a Issue>) -> Option<&'a Project> {
		Some(parent)
	}

	fn object_author(&self, object: &Issue) -> Option<i64> {
		Some(object.author_user_id)
	}

	async fn list(&self, ctx: &RequestContext<'_>, parent: &Project) -> Result<Response> {
		let issues = Issue::list_for_project(ctx.db(), parent.id).await?;
		let data: Vec<IssueResponse> = issues.iter().map(IssueResponse::from).collect();
		render_json(&data)
	}

	async fn create(&self, ctx: &RequestContext<'_>, parent: &Project) -> Result<Response> {
		let input: IssueInput = parse_body(ctx.request)?;
		input.validate_for(Action::Create)?;

		let tag: Tag = required("tag", &choice("tag", &input.tag)?)?;
		let priority: Priority = required("priority", &choice("priority", &input.priority)?)?;
		let status: Status = required("status", &choice("status", &input.status)?)?;
		let assignee_user_id = required("assignee_user_id", &input.assignee_user_id)?;
		validate_assignee(ctx.db(), parent, assignee_user_id).await?;

		let issue = Issue::create(
			ctx.db(),
			&NewIssue {
				title: required("title", &input.title)?,
				description: input.description.clone().unwrap_or_default(),
				tag,
				priority,
				status,
				project_id: parent.id,
				author_user_id: ctx.user.id,
				assignee_user_id,
			},
		)
		.await?;
		tracing::info!(
			project_id = parent.id,
			issue_id = issue.id,
			user_id = ctx.user.id,
			"Created issue"
		);

		render_created(&IssueResponse::from(&issue))
	}

	async fn retrieve(&self, ctx: &RequestContext<'_>, _parent: &Project, object: Issue) -> Result<Response> {
		let comments = Comment::list_for_issue(ctx.db(), object.id).await?;
		render_json(&IssueDetailResponse::new(&object, &comments))
	}

	async fn update(
		&self,
		ctx: &RequestContext<'_>,
		parent: &Project,
		mut object: Issue,
		partial: bool,
	) -> Result<Response> {
		let input: IssueInput = parse_body(ctx.request)?;
		input.validate_for(if partial { Action::PartialUpdate } else { Action::Update })?;

		if let Some(assignee_user_id) = input.assignee_user_id {
			validate_assignee(ctx.db(), parent, assignee_user_id).await?;
			object.assignee_user_id = assignee_user_id;
		}
		if let Some(title) = &input.title {
			object.title = title.clone();
		}
		if let Some(description) = &input.description {
			object.description = description.clone();
		}
		if let Some(tag) = choice("tag", &input.tag)? {
			object.tag = tag;
		}
		if let Some(priority) = choice("priority", &input.priority)? {
			object.priority = priority;
		}
		if let Some(status) = choice("status", &input.status)? {
			object.status = status;
		}
		object.save(ctx.db()).await?;

		render_json(&IssueResponse::from(&object))
	}

	async fn destroy(&self, ctx: &RequestContext<'_>, parent: &Project, object: Issue) -> Result<Response> {
		object.delete(ctx.db()).await?;
		tracing::info!(
			project_id = parent.id,
			issue_id = object.id,
			user_id = ctx.user.id,
			"Deleted issue"
		);
		Ok(Response::no_content())
	}
}

/// Resolved parent chain of a comment
pub struct IssueScope {
	pub project: Project,
	pub issue: Issue,
}

/// `/projects/{id}/issues/{issue_id}/comments/` and `.../comments/{comment_id}/`
pub struct CommentViewSet;

#[async_trait]
impl ViewSet for CommentViewSet {
	type Parent = IssueScope;
	type Object = Comment;

	const KIND: ResourceKind = ResourceKind::Comment;

	fn basename(&self) -> &'static str {
		"comment"
	}

	async fn get_object(&self, db: &SqlitePool, parent: &IssueScope, pk: i64) -> Result<Comment> {
		get_or_404(Comment::get_in_issue(db, parent.issue.id, pk).await?, "Comment")
	}

	fn scope<'a>(&self, parent: &'a IssueScope, _object: Option<&'a Comment>) -> Option<&'a Project> {
		Some(&parent.project)
	}

	fn object_author(&self, object: &Comment) -> Option<i64> {
		Some(object.author_user_id)
	}

	async fn list(&self, ctx: &RequestContext<'_>, parent: &IssueScope) -> Result<Response> {
		let comments = Comment::list_for_issue(ctx.db(), parent.issue.id).await?;
		let data: Vec<CommentResponse> = comments.iter().map(CommentResponse::from).collect();
		render_json(&data)
	}

	async fn create(&self, ctx: &RequestContext<'_>, parent: &IssueScope) -> Result<Response> {
		let input: CommentInput = parse_body(ctx.request)?;
		input.validate_for(Action::Create)?;

		let description = required("description", &input.description)?;
		let comment = Comment::create(ctx.db(), parent.issue.id, ctx.user.id, &description).await?;
		tracing::info!(
			issue_id = parent.issue.id,
			comment_id = comment.id,
			user_id = ctx.user.id,
			"Created comment"
		);

		render_created(&CommentResponse::from(&comment))
	}

	async fn retrieve(
		&self,
		_ctx: &RequestContext<'_>,
		_parent: &IssueScope,
		object: Comment,
	) -> Result<Response> {
		render_json(&CommentDetailResponse::from(&object))
	}

	async fn update(
		&self,
		ctx: &RequestContext<'_>,
		_parent: &IssueScope,
		mut object: Comment,
		partial: bool,
	) -> Result<Response> {
		let input: CommentInput = parse_body(ctx.request)?;
		input.validate_for(if partial { Action::PartialUpdate } else { Action::Update })?;

		if let Some(description) = &input.description {
			object.description = description.clone();
		}
		object.save(ctx.db()).await?;

		render_json(&CommentResponse::from(&object))
	}

	async fn destroy(
		&self,
		ctx: &RequestContext<'_>,
		parent: &IssueScope,
		object: Comment,
	) -> Result<Response> {
		object.delete(ctx.db()).await?;
		tracing::info!(
			issue_id = parent.issue.id,
			comment_id = object.id,
			user_id = ctx.user.id,
			"Deleted comment"
		);
		Ok(Response::no_content())
	}
}
