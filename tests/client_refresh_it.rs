#![cfg(feature = "reqwest")]

mod common;

// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
use tokio::task::JoinSet;
use url::Url;
// self
use common::{build_reqwest_test_client, test_config};
use taskboard_client::{
	auth::{CredentialPair, CredentialSecret},
	client::ReqwestApiClient,
	config::ClientConfig,
	error::{Error, RefreshError, Result},
	http::ApiRequest,
	store::{CredentialStore, MemoryStore},
};

const REFRESH_DELAY: Duration = Duration::from_millis(750);

fn expired_body() -> serde_json::Value {
	json!({ "error": "AuthenticationError", "message": "jwt expired" })
}

fn grant_body(access: &str, refresh: &str) -> serde_json::Value {
	json!({
		"accessToken": access,
		"refreshToken": refresh,
		"user": { "id": "user-1", "email": "ada@example.com" },
	})
}

fn seeded_client(server: &MockServer) -> (ReqwestApiClient, MemoryStore) {
	build_reqwest_test_client(test_config(&server.base_url()), CredentialPair::new("tok1", "ref1"))
}

async fn mock_rotation<'a>(
	server: &'a MockServer,
	path: &str,
) -> (httpmock::Mock<'a>, httpmock::Mock<'a>) {
	let stale = server
		.mock_async(|when, then| {
			when.method(GET).path(path).header("authorization", "Bearer tok1");
			then.status(401).json_body(expired_body());
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path(path).header("authorization", "Bearer tok2");
			then.status(200).json_body(json!({ "path": path }));
		})
		.await;

	(stale, fresh)
}

async fn fire_concurrently(client: &ReqwestApiClient, paths: Vec<String>) -> Vec<Result<String>> {
	let mut set = JoinSet::new();

	for path in paths {
		let client = client.clone();

		set.spawn(async move {
			let body: serde_json::Value = client.get_json(&path).await?;

			Ok::<_, Error>(body["path"].as_str().unwrap_or_default().to_owned())
		});
	}

	let mut outcomes = Vec::new();

	while let Some(joined) = set.join_next().await {
		outcomes.push(joined.expect("Request task should not panic."));
	}

	outcomes
}

async fn assert_single_flight(burst: usize) {
	let server = MockServer::start_async().await;
	let (client, store) = seeded_client(&server);
	let (stale, fresh) = mock_rotation(&server, "/tasks").await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/refresh")
				.header_missing("authorization")
				.json_body(json!({ "refreshToken": "ref1" }));
			then.status(200).delay(REFRESH_DELAY).json_body(grant_body("tok2", "ref2"));
		})
		.await;
	let outcomes = fire_concurrently(&client, vec!["/tasks".to_owned(); burst]).await;

	assert_eq!(outcomes.len(), burst);

	for outcome in outcomes {
		assert_eq!(outcome.expect("Every request should succeed after replay."), "/tasks");
	}

	refresh.assert_hits_async(1).await;
	stale.assert_hits_async(burst).await;
	fresh.assert_hits_async(burst).await;

	assert_eq!(client.refresh_metrics().attempts(), 1);
	assert_eq!(store.current().access_token().map(CredentialSecret::expose), Some("tok2"));
	assert_eq!(store.current().refresh_token().map(CredentialSecret::expose), Some("ref2"));
}

#[tokio::test]
async fn single_request_refreshes_once() {
	assert_single_flight(1).await;
}

#[tokio::test]
async fn five_concurrent_requests_share_one_refresh() {
	assert_single_flight(5).await;
}

#[tokio::test]
async fn fifty_concurrent_requests_share_one_refresh() {
	assert_single_flight(50).await;
}

#[tokio::test]
async fn three_named_requests_replay_with_the_same_credential() {
	let server = MockServer::start_async().await;
	let (client, store) = seeded_client(&server);
	let mut rotations = Vec::new();

	for path in ["/tasks/a", "/tasks/b", "/tasks/c"] {
		rotations.push(mock_rotation(&server, path).await);
	}

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).delay(REFRESH_DELAY).json_body(grant_body("tok2", "ref2"));
		})
		.await;
	let mut outcomes = fire_concurrently(
		&client,
		vec!["/tasks/a".to_owned(), "/tasks/b".to_owned(), "/tasks/c".to_owned()],
	)
	.await
	.into_iter()
	.map(|outcome| outcome.expect("Replay should succeed."))
	.collect::<Vec<_>>();

	outcomes.sort();

	assert_eq!(outcomes, ["/tasks/a", "/tasks/b", "/tasks/c"]);

	refresh.assert_hits_async(1).await;

	for (stale, fresh) in &rotations {
		stale.assert_hits_async(1).await;
		fresh.assert_hits_async(1).await;
	}

	assert_eq!(store.current().access_token().map(CredentialSecret::expose), Some("tok2"));
}

#[tokio::test]
async fn second_expiry_after_replay_is_terminal() {
	let server = MockServer::start_async().await;
	let (client, _) = seeded_client(&server);
	let tasks = server
		.mock_async(|when, then| {
			when.method(GET).path("/tasks");
			then.status(401).json_body(expired_body());
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).json_body(grant_body("tok2", "ref2"));
		})
		.await;
	let err = client
		.send(ApiRequest::get("/tasks"))
		.await
		.expect_err("A request expiring twice must fail.");

	assert!(matches!(err, Error::Authentication { status: 401, .. }));
	assert!(err.is_authentication_failure());

	refresh.assert_hits_async(1).await;
	tasks.assert_hits_async(2).await;
}

#[tokio::test]
async fn refresh_endpoint_rejection_never_recurses() {
	let server = MockServer::start_async().await;
	let (client, store) = seeded_client(&server);
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").header_missing("authorization");
			then.status(401).json_body(expired_body());
		})
		.await;
	let err = client
		.send(
			ApiRequest::post("/auth/refresh")
				.json(&json!({ "refreshToken": "ref1" }))
				.expect("Refresh body should serialize."),
		)
		.await
		.expect_err("Refresh endpoint rejection should surface.");

	assert!(matches!(err, Error::Authentication { status: 401, .. }));

	refresh.assert_hits_async(1).await;

	assert_eq!(store.current(), CredentialPair::new("tok1", "ref1"));
	assert_eq!(client.refresh_metrics().attempts(), 0);
}

#[tokio::test]
async fn refresh_failure_fans_out_and_leaves_store_untouched() {
	let server = MockServer::start_async().await;
	let (client, store) = seeded_client(&server);
	let (stale, fresh) = mock_rotation(&server, "/tasks").await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401)
				.delay(REFRESH_DELAY)
				.json_body(json!({ "error": "AuthenticationError", "message": "refresh expired" }));
		})
		.await;
	let outcomes = fire_concurrently(&client, vec!["/tasks".to_owned(); 3]).await;

	assert_eq!(outcomes.len(), 3);

	for outcome in outcomes {
		let err = outcome.expect_err("Every queued request should receive the refresh error.");

		match err {
			Error::Refresh(RefreshError::Rejected { status, message, .. }) => {
				assert_eq!(status, 401);
				assert_eq!(message, "refresh expired");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	refresh.assert_hits_async(1).await;
	stale.assert_hits_async(3).await;
	fresh.assert_hits_async(0).await;

	assert_eq!(store.current(), CredentialPair::new("tok1", "ref1"));
	assert_eq!(client.refresh_metrics().failures(), 1);
}

#[tokio::test]
async fn refresh_timeout_releases_waiters_with_failure() {
	let server = MockServer::start_async().await;
	let config = ClientConfig::builder(Url::parse(&server.base_url()).expect("Mock URL parses."))
		.refresh_timeout(Duration::from_millis(200))
		.build()
		.expect("Config with short refresh timeout should validate.");
	let (client, store) = build_reqwest_test_client(config, CredentialPair::new("tok1", "ref1"));
	let _rotation = mock_rotation(&server, "/tasks").await;
	let _refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).delay(Duration::from_secs(3)).json_body(grant_body("tok2", "ref2"));
		})
		.await;
	let outcomes = fire_concurrently(&client, vec!["/tasks".to_owned(); 2]).await;

	for outcome in outcomes {
		assert!(matches!(
			outcome.expect_err("Timed-out refresh should fail every waiter."),
			Error::Refresh(RefreshError::Transport { .. })
		));
	}

	assert_eq!(store.current(), CredentialPair::new("tok1", "ref1"));
	assert!(!client.coordinator().is_refreshing());
}

#[tokio::test]
async fn attaches_current_credential_and_passes_other_errors_through() {
	let server = MockServer::start_async().await;
	let (client, _) = seeded_client(&server);
	let boards = server
		.mock_async(|when, then| {
			when.method(GET).path("/boards").header("authorization", "Bearer tok1");
			then.status(200).json_body(json!([{ "id": 1, "name": "Roadmap" }]));
		})
		.await;
	let missing = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/tasks/404");
			then.status(404).json_body(json!({ "error": "NotFound", "message": "no such task" }));
		})
		.await;
	let body: serde_json::Value = client.get_json("/boards").await.expect("Boards should load.");

	assert_eq!(body[0]["name"], "Roadmap");

	let err = client.delete("/tasks/404").await.expect_err("Missing task should surface.");

	match err {
		Error::Api { status, error, message } => {
			assert_eq!(status, 404);
			assert_eq!(error.as_deref(), Some("NotFound"));
			assert_eq!(message, "no such task");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	boards.assert_async().await;
	missing.assert_async().await;

	assert_eq!(client.refresh_metrics().attempts(), 0);
}
