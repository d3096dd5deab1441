// self
use crate::obs::{CallKind, CallOutcome, RefreshJoin};

/// Records a call outcome via the global metrics recorder (when enabled).
///
/// Replays report their own `attempt` and the outcome of the resubmitted request, so
/// `replay/failure` counts requests that expired again or failed after a refresh.
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"taskboard_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how an expired request joined the refresh coordinator.
///
/// A healthy burst of `n` expired requests shows one `leader` and `n - 1` `follower` joins.
pub fn record_refresh_join(join: RefreshJoin) {
	#[cfg(feature = "metrics")]
	metrics::counter!("taskboard_client_refresh_join_total", "role" => join.as_str()).increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = join;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_metrics() {
		record_call_outcome(CallKind::Replay, CallOutcome::Failure);

		for join in [RefreshJoin::Leader, RefreshJoin::Follower, RefreshJoin::Superseded] {
			record_refresh_join(join);
		}
	}

	#[test]
	fn join_labels_are_stable() {
		assert_eq!(RefreshJoin::Superseded.to_string(), "superseded");
		assert_eq!(CallKind::Replay.as_str(), "replay");
	}
}
