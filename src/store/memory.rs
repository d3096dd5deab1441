//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, CredentialSecret},
	store::CredentialStore,
};

/// Cloneable handle over a shared in-process credential pair.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<CredentialPair>>);
impl MemoryStore {
	/// Creates a store seeded with `pair`.
	pub fn with_pair(pair: CredentialPair) -> Self {
		Self(Arc::new(RwLock::new(pair)))
	}
}
impl CredentialStore for MemoryStore {
	fn current(&self) -> CredentialPair {
		self.0.read().clone()
	}

	fn replace(&self, pair: CredentialPair) {
		*self.0.write() = pair;
	}

	fn rotate(&self, expected: &CredentialSecret, pair: CredentialPair) -> bool {
		let mut slot = self.0.write();

		if slot.refresh.as_ref() != Some(expected) {
			return false;
		}

		*slot = pair;

		true
	}
}
