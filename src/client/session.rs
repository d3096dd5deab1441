//! Session endpoints: sign-in, sign-out, and the coordinated refresh call.

// self
use crate::{
	_prelude::*,
	auth::{CredentialSecret, Principal, RefreshRequestBody, SessionGrant, SignInBody},
	client::ApiClient,
	error::{RefreshError, TransportError},
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
	refresh::RefreshOutcome,
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Exchanges account credentials for a session and stores the issued pair.
	///
	/// The sign-in endpoint is exempt from credential attachment and refresh triggers; a
	/// rejection surfaces as [`Error::Authentication`] when it carries the configured failure
	/// status and as [`Error::Api`] otherwise.
	pub async fn sign_in(&self, email: &str, password: &str) -> Result<Principal> {
		const KIND: CallKind = CallKind::SignIn;

		let span = CallSpan::new(KIND, "sign_in");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = ApiRequest::post(&self.config.login_path)
					.json(&SignInBody { email, password })?;
				let request = match self.config.request_timeout {
					Some(timeout) => request.timeout(timeout),
					None => request,
				};
				let response = self
					.transport
					.execute(self.config.endpoint(&self.config.login_path), request)
					.await
					.map_err(|err| Error::from(TransportError::network(err)))?;

				if !response.is_success() {
					return Err(self.session_failure(&response));
				}

				let grant = response.json::<SessionGrant>()?;
				let principal = grant.user.clone();
				let access = grant.access_token.clone();

				self.store.replace(grant.into_pair(OffsetDateTime::now_utc()));
				self.coordinator.install(access);

				Ok(principal)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Clears the stored credentials. Requests already in flight keep their outcome; any of
	/// them that later expire surface the failure instead of refreshing.
	pub fn sign_out(&self) {
		self.store.clear();
		self.coordinator.forget();
	}

	/// Forces a refresh through the same single-flight path used by expired requests.
	pub async fn refresh_now(&self) -> Result<CredentialSecret> {
		let refresh = self
			.store
			.current()
			.refresh
			.ok_or(Error::Refresh(RefreshError::MissingRefreshCredential))?;

		Ok(self.coordinator.run_exclusive(|| self.refresh_with(refresh)).await?)
	}

	/// Calls the refresh endpoint once and, on success, rotates the stored pair.
	///
	/// The grant is only stored while the store still holds `refresh`; a session cleared or
	/// replaced during the call is never overwritten.
	///
	/// Only the coordinator's leader invokes this. The call bypasses the request pipeline so a
	/// rejection from the refresh endpoint can never trigger another refresh.
	pub(crate) async fn refresh_with(&self, refresh: CredentialSecret) -> RefreshOutcome {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_with");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let body = RefreshRequestBody { refresh_token: refresh.expose() };
				let request = ApiRequest::post(&self.config.refresh_path)
					.json(&body)
					.map_err(|err| RefreshError::Transport { message: err.to_string() })?
					.timeout(self.config.refresh_timeout);
				let response = self
					.transport
					.execute(self.config.endpoint(&self.config.refresh_path), request)
					.await
					.map_err(|err| RefreshError::Transport {
						message: TransportError::network(err).render_chain(),
					})?;

				if !response.is_success() {
					let envelope = response.error_body();

					return Err(RefreshError::Rejected {
						status: response.status,
						error: envelope.error,
						message: response.failure_message(),
					});
				}

				let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
				let grant: SessionGrant = serde_path_to_error::deserialize(&mut deserializer)
					.map_err(|err| RefreshError::MalformedResponse { message: err.to_string() })?;
				let access = grant.access_token.clone();

				// Signed out or signed in again while the call was in flight; keep that session.
				if !self.store.rotate(&refresh, grant.into_pair(OffsetDateTime::now_utc())) {
					#[cfg(feature = "tracing")]
					tracing::debug!("session changed during refresh; discarding the grant");

					return self.store.current().access.ok_or(RefreshError::MissingRefreshCredential);
				}

				Ok(access)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	fn session_failure(&self, response: &ApiResponse) -> Error {
		let envelope = response.error_body();
		let message = response.failure_message();

		if response.status == self.config.auth_failure.status {
			Error::Authentication { status: response.status, error: envelope.error, message }
		} else {
			Error::Api { status: response.status, error: envelope.error, message }
		}
	}
}
