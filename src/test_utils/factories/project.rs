//! Project and contributor factories.

use sqlx::SqlitePool;

use crate::apps::accounts::models::User;
use crate::apps::projects::models::{Contributor, NewProject, Permission, Project, ProjectType, Role};

/// Create a backend project authored by `author`
pub async fn create_project(db: &SqlitePool, author: &User, title: &str) -> Project {
	Project::create(
		db,
		&NewProject {
			title: title.to_string(),
			description: format!("{} description", title),
			project_type: ProjectType::Backend,
			author_user_id: author.id,
		},
	)
	.await
	.expect("Project creation should not fail")
}

/// Add `user` to `project` as a developer
pub async fn add_contributor(db: &SqlitePool, project: &Project, user: &User) -> Contributor {
	Contributor::create(db, project.id, user.id, Permission::Member, Role::Developer)
		.await
		.expect("Contributor creation should not fail")
}
