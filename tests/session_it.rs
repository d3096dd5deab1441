#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
// self
use common::{build_reqwest_test_client, test_config};
use taskboard_client::{
	auth::{CredentialPair, CredentialSecret},
	error::Error,
	store::CredentialStore,
};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
struct Task {
	id: u64,
	title: String,
	column: String,
}

#[tokio::test]
async fn sign_in_then_manage_tasks() {
	let server = MockServer::start_async().await;
	let (client, store) =
		build_reqwest_test_client(test_config(&server.base_url()), CredentialPair::default());
	let login = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/login")
				.header_missing("authorization")
				.json_body(json!({ "email": "ada@example.com", "password": "hunter2" }));
			then.status(200).json_body(json!({
				"accessToken": "tok1",
				"refreshToken": "ref1",
				"user": { "id": 7, "name": "Ada" },
			}));
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/boards/3/tasks")
				.header("authorization", "Bearer tok1")
				.header("content-type", "application/json")
				.json_body(json!({ "title": "Write docs" }));
			then.status(201).json_body(json!({ "id": 11, "title": "Write docs", "column": "todo" }));
		})
		.await;
	let move_task = server
		.mock_async(|when, then| {
			when.method(PATCH)
				.path("/tasks/11")
				.header("authorization", "Bearer tok1")
				.json_body(json!({ "column": "done" }));
			then.status(200).json_body(json!({ "id": 11, "title": "Write docs", "column": "done" }));
		})
		.await;
	let rename = server
		.mock_async(|when, then| {
			when.method(PUT).path("/tasks/11").header("authorization", "Bearer tok1");
			then.status(200).json_body(json!({ "id": 11, "title": "Ship docs", "column": "done" }));
		})
		.await;
	let principal =
		client.sign_in("ada@example.com", "hunter2").await.expect("Sign-in should succeed.");

	assert_eq!(&*principal.id, "7");
	assert_eq!(principal.name.as_deref(), Some("Ada"));
	assert_eq!(store.current().access_token().map(CredentialSecret::expose), Some("tok1"));

	let created: Task = client
		.post_json("/boards/3/tasks", &json!({ "title": "Write docs" }))
		.await
		.expect("Task creation should succeed.");

	assert_eq!(created, Task { id: 11, title: "Write docs".into(), column: "todo".into() });

	let moved: Task = client
		.patch_json("/tasks/11", &json!({ "column": "done" }))
		.await
		.expect("Task move should succeed.");

	assert_eq!(moved.column, "done");

	let renamed: Task = client
		.put_json("/tasks/11", &Task { id: 11, title: "Ship docs".into(), column: "done".into() })
		.await
		.expect("Task rename should succeed.");

	assert_eq!(renamed.title, "Ship docs");

	login.assert_async().await;
	create.assert_async().await;
	move_task.assert_async().await;
	rename.assert_async().await;

	client.sign_out();

	assert!(store.current().is_empty());
}

#[tokio::test]
async fn rejected_sign_in_leaves_store_empty() {
	let server = MockServer::start_async().await;
	let (client, store) =
		build_reqwest_test_client(test_config(&server.base_url()), CredentialPair::default());
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(401)
				.json_body(json!({ "error": "AuthenticationError", "message": "bad password" }));
		})
		.await;
	let err = client.sign_in("ada@example.com", "nope").await.expect_err("Sign-in must fail.");

	match err {
		Error::Authentication { status, message, .. } => {
			assert_eq!(status, 401);
			assert_eq!(message, "bad password");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	login.assert_async().await;

	assert!(store.current().is_empty());
	assert_eq!(client.refresh_metrics().attempts(), 0);
}

#[tokio::test]
async fn malformed_success_body_reports_decode_path() {
	let server = MockServer::start_async().await;
	let (client, _) =
		build_reqwest_test_client(test_config(&server.base_url()), CredentialPair::new("tok1", "ref1"));
	let _task = server
		.mock_async(|when, then| {
			when.method(GET).path("/tasks/1");
			then.status(200).json_body(json!({ "id": "eleven", "title": "x", "column": "todo" }));
		})
		.await;
	let err = client.get_json::<Task>("/tasks/1").await.expect_err("Decode should fail.");

	match err {
		Error::Decode { status, source } => {
			assert_eq!(status, 200);
			assert_eq!(source.path().to_string(), "id");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}
}
