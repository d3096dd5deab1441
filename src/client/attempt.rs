//! Per-request retry bookkeeping.

// self
use crate::{auth::CredentialSecret, http::ApiRequest};

/// One logical call travelling through the client: the caller's request plus the retry
/// marker that bounds credential-driven resubmission to a single replay.
#[derive(Clone, Debug)]
pub struct Attempt {
	request: ApiRequest,
	retried: bool,
	credential: Option<CredentialSecret>,
	generation: Option<u64>,
}
impl Attempt {
	/// Wraps a fresh request; the retry marker starts unset.
	pub fn new(request: ApiRequest) -> Self {
		Self { request, retried: false, credential: None, generation: None }
	}

	/// The caller's request, without any credential attached by the client.
	pub fn request(&self) -> &ApiRequest {
		&self.request
	}

	/// Returns `true` once the request has been resubmitted after a refresh.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	/// Credential pinned for the replay, if the request went through a refresh.
	pub fn pinned_credential(&self) -> Option<&CredentialSecret> {
		self.credential.as_ref()
	}

	/// Refresh generation observed when the request was first dispatched.
	pub fn observed_generation(&self) -> Option<u64> {
		self.generation
	}

	pub(crate) fn observe_generation(&mut self, generation: u64) {
		if !self.retried {
			self.generation = Some(generation);
		}
	}

	/// Sets the retry marker. Called before the refresh outcome is known so a second expiry
	/// is terminal even when the refresh itself fails.
	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}

	/// Pins the credential the replay must carry.
	pub(crate) fn pin_credential(&mut self, credential: CredentialSecret) {
		self.credential = Some(credential);
	}
}
