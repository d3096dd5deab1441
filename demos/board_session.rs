//! Demonstrates plugging a custom transport into the client and watching a burst of expired
//! requests share one refresh.
//!
//! 1. Implement [`ApiTransport`] for an in-process fake task board.
//! 2. Seed a [`MemoryStore`] with a stale access credential.
//! 3. Fire three requests at once; all of them expire, one refresh runs, and every request is
//!    replayed with the fresh credential.

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use taskboard_client::{
	auth::CredentialPair,
	client::ApiClient,
	config::ClientConfig,
	http::{ApiRequest, ApiResponse, ApiTransport, TransportFuture},
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store = MemoryStore::with_pair(CredentialPair::new("tok1", "ref1"));
	let config = ClientConfig::builder(Url::parse("https://board.example.com/api")?).build()?;
	let transport = FakeBoard::default();
	let client: ApiClient<FakeBoard> =
		ApiClient::with_transport(Arc::new(store.clone()), config, transport);
	let (a, b, c) = tokio::join!(
		client.send(ApiRequest::get("/tasks/a")),
		client.send(ApiRequest::get("/tasks/b")),
		client.send(ApiRequest::get("/tasks/c")),
	);

	for response in [a?, b?, c?] {
		println!("{} -> {}", response.status, response.text());
	}

	println!(
		"refresh calls: {}, current credential: {:?}",
		client.transport.refreshes.load(Ordering::SeqCst),
		store.current().access_token().map(|secret| secret.expose().to_owned()),
	);

	Ok(())
}

#[derive(Debug)]
struct FakeBoardError;
impl Display for FakeBoardError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Fake board is unreachable.")
	}
}
impl StdError for FakeBoardError {}

#[derive(Default)]
struct FakeBoard {
	refreshes: AtomicUsize,
}
impl ApiTransport for FakeBoard {
	type TransportError = FakeBoardError;

	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		Box::pin(async move {
			if url.path().ends_with("/auth/refresh") {
				self.refreshes.fetch_add(1, Ordering::SeqCst);
				tokio::time::sleep(Duration::from_millis(50)).await;

				return Ok(ApiResponse::new(200).with_body(
					r#"{"accessToken":"tok2","refreshToken":"ref2","user":{"id":"demo"}}"#,
				));
			}

			match request.authorization() {
				Some("Bearer tok2") =>
					Ok(ApiResponse::new(200).with_body(format!(r#"{{"path":"{}"}}"#, request.path))),
				_ => Ok(ApiResponse::new(401)
					.with_body(r#"{"error":"AuthenticationError","message":"jwt expired"}"#)),
			}
		})
	}
}
