//! Credential store contract and the built-in in-memory implementation.
//!
//! The store is passive state owned outside the refresh core: the request path reads it
//! before every dispatch and the refresher replaces it exactly once per successful refresh.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, CredentialSecret},
};

/// Storage contract consumed by the API client.
///
/// Implementations must be cheap and non-blocking; both calls happen synchronously on the
/// request path with no suspension between reading the store and attaching the credential.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns a snapshot of the current credential pair.
	fn current(&self) -> CredentialPair;

	/// Replaces the stored pair wholesale.
	fn replace(&self, pair: CredentialPair);

	/// Replaces the pair only while it still carries `expected` as its refresh credential.
	///
	/// Returns `false` and leaves the store untouched when the pair was cleared or swapped
	/// for another session since `expected` was read. Implementations backed by a lock
	/// should perform the check and the write under one acquisition.
	fn rotate(&self, expected: &CredentialSecret, pair: CredentialPair) -> bool {
		if self.current().refresh.as_ref() != Some(expected) {
			return false;
		}

		self.replace(pair);

		true
	}

	/// Drops every stored credential (sign-out).
	fn clear(&self) {
		self.replace(CredentialPair::default());
	}
}
impl<S> CredentialStore for Arc<S>
where
	S: ?Sized + CredentialStore,
{
	fn current(&self) -> CredentialPair {
		(**self).current()
	}

	fn replace(&self, pair: CredentialPair) {
		(**self).replace(pair)
	}

	fn rotate(&self, expected: &CredentialSecret, pair: CredentialPair) -> bool {
		(**self).rotate(expected, pair)
	}

	fn clear(&self) {
		(**self).clear()
	}
}
