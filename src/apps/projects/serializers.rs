//! Project and contributor serializers

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::apps::accounts::models::User;
use crate::apps::issues::models::Issue;
use crate::apps::issues::serializers::IssueResponse;
use crate::apps::projects::models::{Contributor, Permission, Project, ProjectType, Role};
use crate::serializers::{WriteSerializer, is_choice, missing, not_blank};

pub const UNKNOWN_USER: &str = "does not match any user id.";
pub const ALREADY_CONTRIBUTOR: &str = "This user is already a contributor of the project.";

/// Writable project fields
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProjectInput {
	#[validate(custom(function = "not_blank"))]
	#[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
	pub title: Option<String>,

	#[validate(length(max = 2048, message = "Ensure this field has no more than 2048 characters."))]
	pub description: Option<String>,

	#[serde(rename = "type")]
	#[validate(custom(function = "valid_project_type"))]
	pub project_type: Option<String>,
}

impl WriteSerializer for ProjectInput {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[
			("title", self.title.is_none()),
			("type", self.project_type.is_none()),
		])
	}

	fn renamed(&self) -> &'static [(&'static str, &'static str)] {
		&[("project_type", "type")]
	}
}

fn valid_project_type(value: &str) -> Result<(), ValidationError> {
	is_choice::<ProjectType>(value)
}

/// Project as listed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
	pub id: i64,
	pub title: String,
	pub description: String,
	#[serde(rename = "type")]
	pub project_type: ProjectType,
	pub author_user_id: i64,
}

impl From<&Project> for ProjectResponse {
	fn from(project: &Project) -> Self {
		Self {
			id: project.id,
			title: project.title.clone(),
			description: project.description.clone(),
			project_type: project.project_type,
			author_user_id: project.author_user_id,
		}
	}
}

/// Project with its contributors and issues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetailResponse {
	#[serde(flatten)]
	pub project: ProjectResponse,
	pub users: Vec<ContributorResponse>,
	pub issues: Vec<IssueResponse>,
}

impl ProjectDetailResponse {
	pub fn new(project: &Project, contributors: &[Contributor], issues: &[Issue]) -> Self {
		Self {
			project: ProjectResponse::from(project),
			users: contributors.iter().map(ContributorResponse::from).collect(),
			issues: issues.iter().map(IssueResponse::from).collect(),
		}
	}
}

/// Writable contributor fields
///
/// `user_id` is only taken into account on creation.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ContributorInput {
	pub user_id: Option<i64>,

	#[validate(custom(function = "valid_permission"))]
	pub permission: Option<String>,

	#[validate(custom(function = "valid_role"))]
	pub role: Option<String>,
}

impl WriteSerializer for ContributorInput {
	fn missing_required(&self) -> Vec<&'static str> {
		missing(&[
			("permission", self.permission.is_none()),
			("role", self.role.is_none()),
		])
	}
}

fn valid_permission(value: &str) -> Result<(), ValidationError> {
	is_choice::<Permission>(value)
}

fn valid_role(value: &str) -> Result<(), ValidationError> {
	is_choice::<Role>(value)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorResponse {
	pub id: i64,
	pub user_id: i64,
	pub permission: Permission,
	pub role: Role,
}

impl From<&Contributor> for ContributorResponse {
	fn from(contributor: &Contributor) -> Self {
		Self {
			id: contributor.id,
			user_id: contributor.user_id,
			permission: contributor.permission,
			role: contributor.role,
		}
	}
}

/// Name and email of the contributing user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorUser {
	pub first_name: String,
	pub last_name: String,
	pub email: String,
}

impl From<&User> for ContributorUser {
	fn from(user: &User) -> Self {
		Self {
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			email: user.email.clone(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorDetailResponse {
	#[serde(flatten)]
	pub contributor: ContributorResponse,
	pub project_id: i64,
	pub user: ContributorUser,
}

impl ContributorDetailResponse {
	pub fn new(contributor: &Contributor, user: &User) -> Self {
		Self {
			contributor: ContributorResponse::from(contributor),
			project_id: contributor.project_id,
			user: ContributorUser::from(user),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::exception::Error;
	use crate::views::Action;
	use rstest::rstest;

	#[rstest]
	#[case("BE")]
	#[case("FE")]
	#[case("IOS")]
	#[case("AN")]
	fn test_project_type_codes(#[case] code: &str) {
		let input: ProjectInput =
			serde_json::from_value(serde_json::json!({ "title": "Atlas", "type": code })).unwrap();
		assert!(input.validate_for(Action::Create).is_ok());
	}

	#[rstest]
	fn test_project_requires_title_and_type() {
		let input: ProjectInput =
			serde_json::from_value(serde_json::json!({ "description": "no title" })).unwrap();

		match input.validate_for(Action::Update) {
			Err(Error::Validation(errors)) => {
				assert!(errors.get("title").is_some());
				assert!(errors.get("type").is_some());
				assert!(errors.get("description").is_none());
			}
			other => panic!("expected validation error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_project_response_uses_type_key() {
		let project = Project {
			id: 4,
			title: "Atlas".to_string(),
			description: String::new(),
			project_type: ProjectType::Ios,
			author_user_id: 9,
		};

		let value = serde_json::to_value(ProjectResponse::from(&project)).unwrap();
		assert_eq!(value["type"], "IOS");
		assert_eq!(value["author_user_id"], 9);
	}

	#[rstest]
	fn test_contributor_codes() {
		let input: ContributorInput = serde_json::from_value(serde_json::json!({
			"user_id": 2,
			"permission": "admin",
			"role": "leader",
		}))
		.unwrap();

		match input.validate_for(Action::Create) {
			Err(Error::Validation(errors)) => {
				assert_eq!(errors.get("permission").unwrap(), ["\"admin\" is not a valid choice."]);
				assert!(errors.get("role").is_none());
			}
			other => panic!("expected validation error, got {:?}", other),
		}
	}
}
