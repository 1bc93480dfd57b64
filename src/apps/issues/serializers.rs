//! Issue and comment serializers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::apps::issues::models::{Comment, Issue, Priority, Status, Tag};
use crate::serializers::{WriteSerializer, is_choice, missing, not_blank};

pub const UNKNOWN_ASSIGNEE: &str = "does not match any user id.";

/// Writable issue fields
#[derive(Debug, Default, Deserialize, Validate)]
pub struct IssueInput {
	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
	pub title: Option<String>,

	#[validate(length(max = 2048, message = "Ensure this field has no more than 2048 characters."))]
	pub description: Option<String>,

	#[validate(custom(function = "valid_tag"))]
	pub tag: Option<String>,

	#[validate(custom(function = "valid_priority"))]
	pub priority: Option<String>,

	#[validate(custom(function = "valid_status"))]
	pub status: Option<String>,

	pub assignee_user_id: Option<i64>,
}

impl WriteSerializer for IssueInput {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[
			("title", self.title.is_none()),
			("tag", self.tag.is_none()),
			("priority", self.priority.is_none()),
			("status", self.status.is_none()),
			("assignee_user_id", self.assignee_user_id.is_none()),
		])
	}
}

fn valid_tag(value: &str) -> Result<(), ValidationError> {
	is_choice::<Tag>(value)
}

fn valid_priority(value: &str) -> Result<(), ValidationError> {
	is_choice::<Priority>(value)
}

fn valid_status(value: &str) -> Result<(), ValidationError> {
	is_choice::<Status>(value)
}

/// Issue as listed, also embedded in project details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
	pub id: i64,
	pub title: String,
	pub description: String,
	pub tag: Tag,
	pub priority: Priority,
	pub status: Status,
	pub author_user_id: i64,
	pub assignee_user_id: i64,
}

impl From<&Issue> for IssueResponse {
	fn from(issue: &Issue) -> Self {
		Self {
			id: issue.id,
			title: issue.title.clone(),
			description: issue.description.clone(),
			tag: issue.tag,
			priority: issue.priority,
			status: issue.status,
			author_user_id: issue.author_user_id,
			assignee_user_id: issue.assignee_user_id,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetailResponse {
	#[serde(flatten)]
	pub issue: IssueResponse,
	pub project_id: i64,
	pub created_time: DateTime<Utc>,
	pub comments: Vec<CommentResponse>,
}

impl IssueDetailResponse {
	pub fn new(issue: &Issue, comments: &[Comment]) -> Self {
		Self {
			issue: IssueResponse::from(issue),
			project_id: issue.project_id,
			created_time: issue.created_time,
			comments: comments.iter().map(CommentResponse::from).collect(),
		}
	}
}

/// Writable comment fields
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CommentInput {
	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 2048, message = "Ensure this field has no more than 2048 characters."))]
	pub description: Option<String>,
}

impl WriteSerializer for CommentInput {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[("description", self.description.is_none())])
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
	pub id: i64,
	pub description: String,
	pub author_user_id: i64,
}

impl From<&Comment> for CommentResponse {
	fn from(comment: &Comment) -> Self {
		Self {
			id: comment.id,
			description: comment.description.clone(),
			author_user_id: comment.author_user_id,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDetailResponse {
	#[serde(flatten)]
	pub comment: CommentResponse,
	pub issue_id: i64,
	pub created_time: DateTime<Utc>,
}

impl From<&Comment> for CommentDetailResponse {
	fn from(comment: &Comment) -> Self {
		Self {
			comment: CommentResponse::from(comment),
			issue_id: comment.issue_id,
			created_time: comment.created_time,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::exception::Error;
	use crate::views::Action;
	use rstest::rstest;

	fn input(value: serde_json::Value) -> IssueInput {
		serde_json::from_value(value).unwrap()
	}

	#[rstest]
	fn test_unknown_codes_are_reported_on_their_field() {
		let issue = input(serde_json::json!({
			"title": "Crash on save",
			"tag": "FEATURE",
			"priority": "MED",
			"status": "done",
			"assignee_user_id": 1,
		}));

		match issue.validate_for(Action::Create) {
			Err(Error::Validation(errors)) => {
				assert_eq!(errors.get("tag").unwrap(), ["\"FEATURE\" is not a valid choice."]);
				assert_eq!(errors.get("status").unwrap(), ["\"done\" is not a valid choice."]);
				assert!(errors.get("priority").is_none());
			}
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_title_length_limit() {
		let issue = input(serde_json::json!({ "title": "x".repeat(129) }));

		match issue.validate_for(Action::PartialUpdate) {
			Err(Error::Validation(errors)) => assert_eq!(
				errors.get("title").unwrap(),
				["Ensure this field has no more than 128 characters."]
			),
			other => panic!("expected validation error, got {:?}", other),
		}
		assert!(input(serde_json::json!({ "title": "x".repeat(128) }))
			.validate_for(Action::PartialUpdate)
			.is_ok());
	}

	#[rstest]
	fn test_comment_description_is_required() {
		let comment: CommentInput = serde_json::from_value(serde_json::json!({})).unwrap();
		assert!(comment.validate_for(Action::Create).is_err());
		assert!(comment.validate_for(Action::PartialUpdate).is_ok());
	}
}
