//! Authenticated API client wrapping every call in the credential lifecycle.
//!
//! [`ApiClient::send`] attaches the current access credential, dispatches the request, and,
//! when the server reports credential expiry, routes the call through the shared
//! [`RefreshCoordinator`] so a burst of expired requests costs exactly one refresh. Each
//! blocked request is then resubmitted once with the refreshed credential; a second expiry
//! on the same request is surfaced to the caller instead of looping.

pub mod attempt;
pub mod session;

mod intercept;

pub use attempt::Attempt;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::CredentialPair,
	client::intercept::Verdict,
	config::ClientConfig,
	error::TransportError,
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
	refresh::{RefreshCoordinator, RefreshMetrics},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Task-board API client bound to one credential store and one refresh coordinator.
///
/// Cloning is cheap and clones share the transport, store, and coordinator, so every clone
/// takes part in the same single-flight refresh.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound request, including the refresh call.
	pub transport: Arc<T>,
	/// Store holding the current credential pair.
	pub store: Arc<dyn CredentialStore>,
	/// Validated client configuration.
	pub config: ClientConfig,
	coordinator: Arc<RefreshCoordinator>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		config: ClientConfig,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self { transport: transport.into(), store, config, coordinator: Default::default() }
	}

	/// Shares `coordinator` with other clients talking to the same session.
	pub fn with_coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
		self.coordinator = coordinator;

		self
	}

	/// Coordinator serializing refreshes for this client.
	pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
		&self.coordinator
	}

	/// Counters describing refresh activity.
	pub fn refresh_metrics(&self) -> &RefreshMetrics {
		self.coordinator.metrics()
	}

	/// Sends `request`, refreshing and replaying it at most once if the credential expired.
	///
	/// Resolves to the first non-expired 2xx response; every other outcome is an [`Error`]
	/// carrying the server's status and discriminator, or the refresh failure that blocked
	/// the replay.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.execute(Attempt::new(request))).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Issues `GET path` and decodes the JSON body.
	pub async fn get_json<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiRequest::get(path)).await?.json()
	}

	/// Issues `POST path` with a JSON body and decodes the JSON response.
	pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send(ApiRequest::post(path).json(body)?).await?.json()
	}

	/// Issues `PUT path` with a JSON body and decodes the JSON response.
	pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send(ApiRequest::put(path).json(body)?).await?.json()
	}

	/// Issues `PATCH path` with a JSON body and decodes the JSON response.
	pub async fn patch_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.send(ApiRequest::patch(path).json(body)?).await?.json()
	}

	/// Issues `DELETE path`, discarding the response body.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::delete(path)).await.map(|_| ())
	}

	/// Runs the per-request state machine for `attempt`.
	pub(crate) async fn execute(&self, mut attempt: Attempt) -> Result<ApiResponse> {
		loop {
			attempt.observe_generation(self.coordinator.generation());

			let pair = self.store.current();
			let verdict = self
				.dispatch(&attempt, &pair)
				.await
				.map(|response| intercept::classify(&self.config, &attempt.request().path, response));

			if attempt.is_retried() {
				let outcome = match &verdict {
					Ok(Verdict::Done(_)) => CallOutcome::Success,
					_ => CallOutcome::Failure,
				};

				obs::record_call_outcome(CallKind::Replay, outcome);
			}

			let expired = match verdict? {
				Verdict::Done(response) => return Ok(response),
				Verdict::Failed(err) => return Err(err),
				Verdict::Expired(err) => err,
			};

			if attempt.is_retried() {
				#[cfg(feature = "tracing")]
				tracing::debug!(
					path = %attempt.request().path,
					"credential expired again after replay; giving up"
				);

				return Err(expired);
			}

			// The store may have been cleared while the request was out.
			let Some(refresh) = self.store.current().refresh else {
				return Err(expired);
			};

			attempt.mark_retried();

			let credential = self
				.coordinator
				.run_exclusive_since(attempt.observed_generation(), || self.refresh_with(refresh))
				.await?;

			#[cfg(feature = "tracing")]
			tracing::debug!(
				path = %attempt.request().path,
				"replaying request with refreshed credential"
			);

			attempt.pin_credential(credential);
		}
	}

	async fn dispatch(&self, attempt: &Attempt, pair: &CredentialPair) -> Result<ApiResponse> {
		let mut request = attempt.request().clone();
		let credential = attempt.pinned_credential().or(pair.access_token());

		intercept::attach_credential(&self.config, &mut request, credential);

		if request.timeout.is_none() {
			request.timeout = self.config.request_timeout;
		}
		if attempt.is_retried() {
			obs::record_call_outcome(CallKind::Replay, CallOutcome::Attempt);
		}

		let url = self.config.endpoint(&request.path);

		self.transport
			.execute(url, request)
			.await
			.map_err(|err| TransportError::network(err).into())
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(store: Arc<dyn CredentialStore>, config: ClientConfig) -> Self {
		Self::with_transport(store, config, ReqwestTransport::default())
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("refresh_path", &self.config.refresh_path)
			.field("refreshing", &self.coordinator.is_refreshing())
			.finish()
	}
}
