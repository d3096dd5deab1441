//! Client configuration: base URL, session endpoints, and the authentication-failure rule.
//!
//! Values are assembled through [`ClientConfigBuilder`] and validated once; the client never
//! re-derives them at runtime.

/// Builder API for assembling client configs.
pub mod builder;

pub use builder::*;

// self
use crate::_prelude::*;

/// Rule deciding which responses count as credential expiry.
///
/// A response matches when its status equals [`status`](Self::status) and, if a
/// discriminator is configured, the body's `error` field equals it. Other responses with the
/// same status (for example a 401 caused by a disabled account) are surfaced unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFailureRule {
	/// HTTP status signalling an authentication failure.
	pub status: u16,
	/// Required value of the response body's `error` field, if any.
	pub discriminator: Option<String>,
}
impl AuthFailureRule {
	/// Default status checked by the rule.
	pub const DEFAULT_STATUS: u16 = 401;
	/// Default discriminator checked by the rule.
	pub const DEFAULT_DISCRIMINATOR: &'static str = "AuthenticationError";

	/// Rule that matches every response carrying `status`.
	pub fn status_only(status: u16) -> Self {
		Self { status, discriminator: None }
	}

	/// Checks a response status + parsed discriminator against the rule.
	pub fn matches(&self, status: u16, discriminator: Option<&str>) -> bool {
		if status != self.status {
			return false;
		}

		match self.discriminator.as_deref() {
			Some(expected) => discriminator == Some(expected),
			None => true,
		}
	}
}
impl Default for AuthFailureRule {
	fn default() -> Self {
		Self {
			status: Self::DEFAULT_STATUS,
			discriminator: Some(Self::DEFAULT_DISCRIMINATOR.into()),
		}
	}
}

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Absolute base URL every request path is appended to.
	pub base_url: Url,
	/// Path of the refresh endpoint; exempt from credential attachment and refresh triggers.
	pub refresh_path: String,
	/// Path of the sign-in endpoint; exempt from credential attachment and refresh triggers.
	pub login_path: String,
	/// Rule classifying responses as credential expiry.
	pub auth_failure: AuthFailureRule,
	/// Upper bound for the refresh call; waiters are bounded by it as well.
	pub refresh_timeout: Duration,
	/// Default timeout for ordinary requests, if any.
	pub request_timeout: Option<Duration>,
}
impl ClientConfig {
	/// Creates a new builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Joins the base URL with an absolute request path, keeping any base path prefix.
	pub fn endpoint(&self, path: &str) -> Url {
		let mut url = self.base_url.clone();
		let prefix = url.path().trim_end_matches('/').to_owned();
		let suffix = path.trim_start_matches('/');

		url.set_path(&format!("{prefix}/{suffix}"));

		url
	}

	/// Returns `true` when `path` targets the refresh endpoint.
	pub fn is_refresh_path(&self, path: &str) -> bool {
		normalize(path) == normalize(&self.refresh_path)
	}

	/// Returns `true` when `path` targets the sign-in endpoint.
	pub fn is_login_path(&self, path: &str) -> bool {
		normalize(path) == normalize(&self.login_path)
	}

	/// Returns `true` when `path` is one of the session endpoints that never carry or refresh
	/// the access credential.
	pub fn is_session_path(&self, path: &str) -> bool {
		self.is_refresh_path(path) || self.is_login_path(path)
	}
}

fn normalize(path: &str) -> &str {
	let path = path.split(['?', '#']).next().unwrap_or_default();
	let trimmed = path.trim_end_matches('/');

	if trimmed.is_empty() { "/" } else { trimmed }
}
