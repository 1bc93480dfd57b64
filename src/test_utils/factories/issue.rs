//! Issue and comment factories.

use sqlx::SqlitePool;

use crate::apps::accounts::models::User;
use crate::apps::issues::models::{Comment, Issue, NewIssue, Priority, Status, Tag};
use crate::apps::projects::models::Project;

/// Create a to-do bug in `project` written by `author`
pub async fn create_issue(
	db: &SqlitePool,
	project: &Project,
	author: &User,
	assignee: &User,
	title: &str,
) -> Issue {
	Issue::create(
		db,
		&NewIssue {
			title: title.to_string(),
			description: String::new(),
			tag: Tag::Bug,
			priority: Priority::Medium,
			status: Status::ToDo,
			project_id: project.id,
			author_user_id: author.id,
			assignee_user_id: assignee.id,
		},
	)
	.await
	.expect("Issue creation should not fail")
}

pub async fn create_comment(db: &SqlitePool, issue: &Issue, author: &User, description: &str) -> Comment {
	Comment::create(db, issue.id, author.id, description)
		.await
		.expect("Comment creation should not fail")
}
