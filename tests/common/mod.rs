//! Shared fixtures for reqwest-backed integration tests.

#![allow(dead_code)]

// std
use std::{sync::Arc, time::Duration};
// crates.io
use url::Url;
// self
use taskboard_client::{
	auth::CredentialPair,
	client::ReqwestApiClient,
	config::ClientConfig,
	http::ReqwestTransport,
	reqwest::Client as ReqwestClient,
	store::{CredentialStore, MemoryStore},
};

/// Builds a client config rooted at `base_url` with the crate defaults.
pub fn test_config(base_url: &str) -> ClientConfig {
	let base = Url::parse(base_url).expect("Test base URL should parse.");

	ClientConfig::builder(base).build().expect("Default test config should validate.")
}

/// Builds a reqwest transport with a short connect timeout.
pub fn test_reqwest_transport() -> ReqwestTransport {
	let client = ReqwestClient::builder()
		.connect_timeout(Duration::from_secs(5))
		.build()
		.expect("Failed to build Reqwest client for tests.");

	ReqwestTransport::with_client(client)
}

/// Constructs a reqwest-backed client whose in-memory store is seeded with `pair`.
pub fn build_reqwest_test_client(
	config: ClientConfig,
	pair: CredentialPair,
) -> (ReqwestApiClient, MemoryStore) {
	let store_backend = MemoryStore::with_pair(pair);
	let store: Arc<dyn CredentialStore> = Arc::new(store_backend.clone());
	let client = ReqwestApiClient::with_transport(store, config, test_reqwest_transport());

	(client, store_backend)
}
