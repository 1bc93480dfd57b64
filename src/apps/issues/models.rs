//! Issue and Comment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::exception::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Tag {
	#[serde(rename = "BUG")]
	#[sqlx(rename = "BUG")]
	Bug,
	#[serde(rename = "IMP")]
	#[sqlx(rename = "IMP")]
	Improvement,
	#[serde(rename = "TASK")]
	#[sqlx(rename = "TASK")]
	Task,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Priority {
	#[serde(rename = "LOW")]
	#[sqlx(rename = "LOW")]
	Low,
	#[serde(rename = "MED")]
	#[sqlx(rename = "MED")]
	Medium,
	#[serde(rename = "HIGH")]
	#[sqlx(rename = "HIGH")]
	High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Status {
	#[serde(rename = "TD")]
	#[sqlx(rename = "TD")]
	ToDo,
	#[serde(rename = "IP")]
	#[sqlx(rename = "IP")]
	InProgress,
	#[serde(rename = "COMP")]
	#[sqlx(rename = "COMP")]
	Completed,
}

/// Issue model
///
/// The assignee is always the project author or one of its contributors;
/// the views check this before writing.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Issue {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub tag: Tag,
	pub priority: Priority,
	pub status: Status,
	pub project_id: i64,
	pub author_user_id: i64,
	pub assignee_user_id: i64,
	pub created_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewIssue {
	pub title: String,
	pub description: String,
	pub tag: Tag,
	pub priority: Priority,
	pub status: Status,
	pub project_id: i64,
	pub author_user_id: i64,
	pub assignee_user_id: i64,
}

const SELECT_ISSUE: &str = "SELECT id, title, description, tag, priority, status, project_id, \
	author_user_id, assignee_user_id, created_time FROM issues";

impl Issue {
	/// Issue `id`, provided it belongs to `project_id`
	pub async fn get_in_project(db: &SqlitePool, project_id: i64, id: i64) -> Result<Option<Issue>> {
		let issue = sqlx::query_as::<_, Issue>(&format!(
			"{} WHERE id = ? AND project_id = ?",
			SELECT_ISSUE
		))
		.bind(id)
		.bind(project_id)
		.fetch_optional(db)
		.await?;
		Ok(issue)
	}

	pub async fn list_for_project(db: &SqlitePool, project_id: i64) -> Result<Vec<Issue>> {
		let issues =
			sqlx::query_as::<_, Issue>(&format!("{} WHERE project_id = ? ORDER BY id", SELECT_ISSUE))
				.bind(project_id)
				.fetch_all(db)
				.await?;
		Ok(issues)
	}

	pub async fn create(db: &SqlitePool, new: &NewIssue) -> Result<Issue> {
		let issue = sqlx::query_as::<_, Issue>(
			"INSERT INTO issues (title, description, tag, priority, status, project_id, \
			 author_user_id, assignee_user_id, created_time) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
			 RETURNING id, title, description, tag, priority, status, project_id, author_user_id, \
			 assignee_user_id, created_time",
		)
		.bind(&new.title)
		.bind(&new.description)
		.bind(new.tag)
		.bind(new.priority)
		.bind(new.status)
		.bind(new.project_id)
		.bind(new.author_user_id)
		.bind(new.assignee_user_id)
		.bind(Utc::now())
		.fetch_one(db)
		.await?;
		Ok(issue)
	}

	pub async fn save(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query(
			"UPDATE issues SET title = ?, description = ?, tag = ?, priority = ?, status = ?, \
			 assignee_user_id = ? WHERE id = ?",
		)
		.bind(&self.title)
		.bind(&self.description)
		.bind(self.tag)
		.bind(self.priority)
		.bind(self.status)
		.bind(self.assignee_user_id)
		.bind(self.id)
		.execute(db)
		.await?;
		Ok(())
	}

	/// Delete the issue together with its comments
	pub async fn delete(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query("DELETE FROM issues WHERE id = ?")
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
	pub id: i64,
	pub description: String,
	pub author_user_id: i64,
	pub issue_id: i64,
	pub created_time: DateTime<Utc>,
}

const SELECT_COMMENT: &str =
	"SELECT id, description, author_user_id, issue_id, created_time FROM comments";

impl Comment {
	/// Comment `id`, provided it belongs to `issue_id`
	pub async fn get_in_issue(db: &SqlitePool, issue_id: i64, id: i64) -> Result<Option<Comment>> {
		let comment = sqlx::query_as::<_, Comment>(&format!(
			"{} WHERE id = ? AND issue_id = ?",
			SELECT_COMMENT
		))
		.bind(id)
		.bind(issue_id)
		.fetch_optional(db)
		.await?;
		Ok(comment)
	}

	pub async fn list_for_issue(db: &SqlitePool, issue_id: i64) -> Result<Vec<Comment>> {
		let comments =
			sqlx::query_as::<_, Comment>(&format!("{} WHERE issue_id = ? ORDER BY id", SELECT_COMMENT))
				.bind(issue_id)
				.fetch_all(db)
				.await?;
		Ok(comments)
	}

	pub async fn create(
		db: &SqlitePool,
		issue_id: i64,
		author_user_id: i64,
		description: &str,
	) -> Result<Comment> {
		let comment = sqlx::query_as::<_, Comment>(
			"INSERT INTO comments (description, author_user_id, issue_id, created_time) \
			 VALUES (?, ?, ?, ?) RETURNING id, description, author_user_id, issue_id, created_time",
		)
		.bind(description)
		.bind(author_user_id)
		.bind(issue_id)
		.bind(Utc::now())
		.fetch_one(db)
		.await?;
		Ok(comment)
	}

	pub async fn save(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query("UPDATE comments SET description = ? WHERE id = ?")
			.bind(&self.description)
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(())
	}

	pub async fn delete(&self, db: &SqlitePool) -> Result<()> {
		sqlx::query("DELETE FROM comments WHERE id = ?")
			.bind(self.id)
			.execute(db)
			.await?;
		Ok(())
	}
}
