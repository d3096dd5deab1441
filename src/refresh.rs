//! Single-flight credential refresh coordination.
//!
//! [`RefreshCoordinator`] serializes "who may call the refresh endpoint". The first caller
//! that observes an expired credential becomes the leader and runs the refresh; every caller
//! arriving while that refresh is outstanding parks on a one-shot channel and is released
//! with a clone of the leader's outcome. Checking and setting the in-flight flag happen
//! under one lock acquisition, and the waiter queue is swapped for an empty one in the same
//! critical section that clears the flag, so a late arrival always joins a fresh flight.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	error::RefreshError,
	obs::{self, RefreshJoin},
};

/// Outcome shared between the leader and every released waiter.
pub type RefreshOutcome = Result<CredentialSecret, RefreshError>;

type Waiter = oneshot::Sender<RefreshOutcome>;

#[derive(Debug, Default)]
struct FlightState {
	refreshing: bool,
	waiters: Vec<Waiter>,
	generation: u64,
	latest: Option<CredentialSecret>,
}

enum Role {
	Leader,
	Follower(oneshot::Receiver<RefreshOutcome>),
	Superseded(CredentialSecret),
}

/// Owner of the refresh flight flag, the waiter queue, and the refresh generation.
///
/// One coordinator is shared (behind `Arc`) by every request issued through a client.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
	state: Mutex<FlightState>,
	metrics: RefreshMetrics,
}
impl RefreshCoordinator {
	/// Creates an idle coordinator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` while a refresh call is outstanding.
	pub fn is_refreshing(&self) -> bool {
		self.state.lock().refreshing
	}

	/// Number of callers currently parked on the in-flight refresh.
	pub fn waiting(&self) -> usize {
		self.state.lock().waiters.len()
	}

	/// Count of successful refreshes so far.
	pub fn generation(&self) -> u64 {
		self.state.lock().generation
	}

	/// Counters describing refresh activity.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Records a credential minted outside a refresh flight (sign-in) as the newest one, so
	/// requests dispatched before it replay with it instead of refreshing.
	pub fn install(&self, credential: CredentialSecret) {
		let mut state = self.state.lock();

		state.generation += 1;
		state.latest = Some(credential);
	}

	/// Drops the remembered credential (sign-out); stale requests can no longer reuse it.
	pub fn forget(&self) {
		self.state.lock().latest = None;
	}

	/// Runs `refresh` unless one is already in flight, in which case the caller waits for that
	/// flight's outcome instead. `refresh` is invoked at most once per flight.
	pub async fn run_exclusive<F, Fut>(&self, refresh: F) -> RefreshOutcome
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = RefreshOutcome>,
	{
		self.run_exclusive_since(None, refresh).await
	}

	/// Like [`run_exclusive`](Self::run_exclusive), but a caller that observed `generation`
	/// before its request went out reuses the newest credential when a refresh already
	/// settled successfully since then, instead of starting a redundant flight.
	pub async fn run_exclusive_since<F, Fut>(
		&self,
		generation: Option<u64>,
		refresh: F,
	) -> RefreshOutcome
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = RefreshOutcome>,
	{
		match self.enter(generation) {
			Role::Superseded(credential) => {
				self.metrics.record_superseded();
				obs::record_refresh_join(RefreshJoin::Superseded);

				#[cfg(feature = "tracing")]
				tracing::debug!(
					observed = ?generation,
					"credential already refreshed since the request went out; reusing it"
				);

				Ok(credential)
			},
			Role::Follower(receiver) => {
				self.metrics.record_coalesced();
				obs::record_refresh_join(RefreshJoin::Follower);

				#[cfg(feature = "tracing")]
				tracing::debug!("credential refresh in flight; waiting for its outcome");

				receiver.await.unwrap_or(Err(RefreshError::Abandoned))
			},
			Role::Leader => {
				self.metrics.record_attempt();
				obs::record_refresh_join(RefreshJoin::Leader);

				#[cfg(feature = "tracing")]
				tracing::debug!("credential refresh started");

				let mut flight = Flight { coordinator: self, settled: false };
				let outcome = refresh().await;

				flight.settle(&outcome);

				outcome
			},
		}
	}

	fn enter(&self, generation: Option<u64>) -> Role {
		let mut state = self.state.lock();

		if let (Some(observed), Some(latest)) = (generation, state.latest.as_ref())
			&& state.generation > observed
		{
			return Role::Superseded(latest.clone());
		}
		if state.refreshing {
			let (sender, receiver) = oneshot::channel();

			state.waiters.push(sender);

			return Role::Follower(receiver);
		}

		state.refreshing = true;

		Role::Leader
	}
}

/// Leader-side guard; releases every waiter exactly once, even if the leader is dropped.
struct Flight<'a> {
	coordinator: &'a RefreshCoordinator,
	settled: bool,
}
impl Flight<'_> {
	fn settle(&mut self, outcome: &RefreshOutcome) {
		self.settled = true;

		let waiters = {
			let mut state = self.coordinator.state.lock();

			if let Ok(credential) = outcome {
				state.generation += 1;
				state.latest = Some(credential.clone());
			}

			state.refreshing = false;

			mem::take(&mut state.waiters)
		};

		match outcome {
			Ok(_) => self.coordinator.metrics.record_success(),
			Err(_err) => {
				self.coordinator.metrics.record_failure();

				#[cfg(feature = "tracing")]
				tracing::warn!(error = %_err, waiters = waiters.len(), "credential refresh failed");
			},
		}

		for waiter in waiters {
			// A waiter whose request was dropped no longer listens.
			let _ = waiter.send(outcome.clone());
		}
	}
}
impl Drop for Flight<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.settle(&Err(RefreshError::Abandoned));
		}
	}
}
