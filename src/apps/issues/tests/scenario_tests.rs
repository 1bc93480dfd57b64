//! End-to-end walkthrough of a small team using the API over HTTP only.

#[cfg(test)]
mod scenario_tests {
	use hyper::StatusCode;
	use rstest::rstest;
	use serde_json::json;

	use crate::test_utils::factories::*;
	use crate::test_utils::fixtures::*;

	#[rstest]
	#[tokio::test]
	async fn test_team_workflow(#[future] test_context: TestContext) {
		let context = test_context.await;
		let u1 = create_user(&context.db, "u1@example.com").await;
		let u2 = create_user(&context.db, "u2@example.com").await;
		let u3 = create_user(&context.db, "u3@example.com").await;

		let response = context
			.post("/projects/", &u1, json!({"title": "Alpha", "type": "BE"}))
			.await;
		assert_eq!(response.status, StatusCode::CREATED);
		let project_id = response.json_body().unwrap()["id"].as_i64().unwrap();

		let response = context
			.post(
				&format!("/projects/{}/users/", project_id),
				&u1,
				json!({"user_id": u2.id, "permission": "M", "role": "developer"}),
			)
			.await;
		assert_eq!(response.status, StatusCode::CREATED);

		let response = context
			.post(
				&format!("/projects/{}/issues/", project_id),
				&u2,
				json!({
					"title": "Bug1",
					"tag": "BUG",
					"priority": "MED",
					"status": "TD",
					"assignee_user_id": u1.id,
				}),
			)
			.await;
		assert_eq!(response.status, StatusCode::CREATED);
		let issue_id = response.json_body().unwrap()["id"].as_i64().unwrap();
		let issue_path = format!("/projects/{}/issues/{}/", project_id, issue_id);

		assert_eq!(context.get(&issue_path, &u3).await.status, StatusCode::FORBIDDEN);
		assert_eq!(context.get(&issue_path, &u1).await.status, StatusCode::OK);

		let response = context
			.post(
				&format!("{}comments/", issue_path),
				&u1,
				json!({"description": "Looking into it"}),
			)
			.await;
		assert_eq!(response.status, StatusCode::CREATED);

		let response = context.get(&issue_path, &u2).await;
		assert_eq!(response.json_body().unwrap()["comments"][0]["author_user_id"], u1.id);
	}
}
