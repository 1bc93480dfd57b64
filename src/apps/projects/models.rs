//! Project and Contributor models

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::exception::Result;

/// Project platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ProjectType {
	#[serde(rename = "BE")]
	#[sqlx(rename = "BE")]
	Backend,
	#[serde(rename = "FE")]
	#[sqlx(rename = "FE")]
	Frontend,
	#[serde(rename = "IOS")]
	#[sqlx(rename = "IOS")]
	Ios,
	#[serde(rename = "AN")]
	#[sqlx(rename = "AN")]
	Android,
}

/// Project model
///
/// The author is the user who created the project. It owns the project and
/// every contributor row attached to it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Project {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub project_type: ProjectType,
	pub author_user_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewProject {
	pub title: String,
	pub description: String,
	pub project_type: ProjectType,
	pub author_user_id: i64,
}

const SELECT_PROJECT: &str =
	"SELECT id, title, description, project_type, author_user_id FROM projects";

impl Project {
	pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<Project>> {
		let project = sqlx::query_as::<_, Project>(&format!("{} WHERE id = ?", SELECT_PROJECT))
			.bind(id)
			.fetch_optional(db)
			.await?;
		Ok(project)
	}

	pub async fn list(db: &SqlitePool) -> Result<Vec<Project>> {
		let projects = sqlx::query_as::<_, Project>(&format!("{} ORDER BY id", SELECT_PROJECT))
			.fetch_all(db)
			.await?;
		Ok(projects)
	}

	pub async fn create(db: &SqlitePool, new: &NewProject) -> Result<Project> {
		let project = sqlx::query_as::<_, Project>(
			"INSERT INTO projects (title, description, project_type, author_user_id) \
			 VALUES (?, ?, ?, ?) \
			 RETURNING id, title, description, project_type, author_user_id",
		)
		.bind(&new.title)
		.bind(&new.description)
		.bind(new.project_type)
		.bind(new.author_user_id)
		.fetch_one(db)
		.await?;
		Ok(project)
	}

	/// Write the editable columns back
	pub async fn save(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query("UPDATE projects SET title = ?, description = ?, project_type = ? WHERE id = ?")
			.bind(&self.title)
			.bind(&self.description)
			.bind(self.project_type)
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(())
	}

	/// Delete the project; issues, comments and contributors go with it
	pub async fn delete(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query("DELETE FROM projects WHERE id = ?")
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(())
	}
}

/// Contributor permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Permission {
	#[serde(rename = "A")]
	#[sqlx(rename = "A")]
	Admin,
	#[serde(rename = "R")]
	#[sqlx(rename = "R")]
	Restricted,
	#[serde(rename = "M")]
	#[sqlx(rename = "M")]
	Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
	Leader,
	Developer,
	Tester,
}

/// Contributor model
///
/// Links a user to a project. A user holds at most one row per project.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Contributor {
	pub id: i64,
	pub project_id: i64,
	pub user_id: i64,
	pub permission: Permission,
	pub role: Role,
}

const SELECT_CONTRIBUTOR: &str =
	"SELECT id, project_id, user_id, permission, role FROM contributors";

impl Contributor {
	pub async fn exists(db: &SqlitePool, project_id: i64, user_id: i64) -> Result<bool> {
		let count: i64 = sqlx::query_scalar(
			"SELECT COUNT(*) FROM contributors WHERE project_id = ? AND user_id = ?",
		)
		.bind(project_id)
		.bind(user_id)
		.fetch_one(db)
		.await?;
		Ok(count > 0)
	}

	/// Contributor row of `user_id` inside `project_id`
	pub async fn get(db: &SqlitePool, project_id: i64, user_id: i64) -> Result<Option<Contributor>> {
		let contributor = sqlx::query_as::<_, Contributor>(&format!(
			"{} WHERE project_id = ? AND user_id = ?",
			SELECT_CONTRIBUTOR
		))
		.bind(project_id)
		.bind(user_id)
		.fetch_optional(db)
		.await?;
		Ok(contributor)
	}

	pub async fn list_for_project(db: &SqlitePool, project_id: i64) -> Result<Vec<Contributor>> {
		let contributors = sqlx::query_as::<_, Contributor>(&format!(
			"{} WHERE project_id = ? ORDER BY id",
			SELECT_CONTRIBUTOR
		))
		.bind(project_id)
		.fetch_all(db)
		.await?;
		Ok(contributors)
	}

	pub async fn create(
		db: &SqlitePool,
		project_id: i64,
		user_id: i64,
		permission: Permission,
		role: Role,
	) -> Result<Contributor> {
		let contributor = sqlx::query_as::<_, Contributor>(
			"INSERT INTO contributors (project_id, user_id, permission, role) VALUES (?, ?, ?, ?) \
			 RETURNING id, project_id, user_id, permission, role",
		)
		.bind(project_id)
		.bind(user_id)
		.bind(permission)
		.bind(role)
		.fetch_one(db)
		.await?;
		Ok(contributor)
	}

	pub async fn save(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query("UPDATE contributors SET permission = ?, role = ? WHERE id = ?")
			.bind(self.permission)
			.bind(self.role)
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(())
	}

	/// Remove the contributor, handing its open assignments to `reassign_to`
	///
	/// Issues of the project assigned to this user move to `reassign_to`
	/// (the project author) in the same transaction, so no issue is left
	/// assigned to a non-member. Returns the number of reassigned issues.
	pub async fn remove(&self, db: &SqlitePool, reassign_to: i64) -> Result<u64> {
		let mut tx = db.begin().await?;

		let reassigned = sqlx::query(
			"UPDATE issues SET assignee_user_id = ? WHERE project_id = ? AND assignee_user_id = ?",
		)
		.bind(reassign_to)
		.bind(self.project_id)
		.bind(self.user_id)
		.execute(&mut *tx)
		.await?
		.rows_affected();

		sqlx::query("DELETE FROM contributors WHERE id = ?")
			.bind(self.id)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(reassigned)
	}
}
