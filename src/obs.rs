//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `taskboard_client.call` with the `call`
//!   (request kind) and `stage` (call site) fields, plus refresh lifecycle events.
//! - Enable `metrics` to increment the `taskboard_client_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`, and the
//!   `taskboard_client_refresh_join_total` counter labeled by the `role` each expired request
//!   took in the refresh coordinator.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Kinds of calls issued by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Ordinary authenticated API request.
	Request,
	/// Request resubmitted after a refresh.
	Replay,
	/// Call to the refresh endpoint.
	Refresh,
	/// Call to the sign-in endpoint.
	SignIn,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Request => "request",
			CallKind::Replay => "replay",
			CallKind::Refresh => "refresh",
			CallKind::SignIn => "sign_in",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Role an expired request took when it joined the refresh coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshJoin {
	/// Ran the refresh call.
	Leader,
	/// Waited on a refresh that was already in flight.
	Follower,
	/// Reused a credential minted after the request went out.
	Superseded,
}
impl RefreshJoin {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshJoin::Leader => "leader",
			RefreshJoin::Follower => "follower",
			RefreshJoin::Superseded => "superseded",
		}
	}
}
impl Display for RefreshJoin {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
