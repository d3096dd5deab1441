// self
use crate::{
	_prelude::*,
	config::{AuthFailureRule, ClientConfig},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL for every request.
	pub base_url: Url,
	/// Refresh endpoint path.
	pub refresh_path: String,
	/// Sign-in endpoint path.
	pub login_path: String,
	/// Authentication-failure rule.
	pub auth_failure: AuthFailureRule,
	/// Refresh call timeout.
	pub refresh_timeout: Duration,
	/// Default request timeout.
	pub request_timeout: Option<Duration>,
}
impl ClientConfigBuilder {
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default sign-in endpoint path.
	pub const DEFAULT_LOGIN_PATH: &'static str = "/auth/login";
	/// Default bound on the refresh call.
	pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

	/// Creates a new builder seeded with crate defaults.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: Self::DEFAULT_REFRESH_PATH.into(),
			login_path: Self::DEFAULT_LOGIN_PATH.into(),
			auth_failure: AuthFailureRule::default(),
			refresh_timeout: Self::DEFAULT_REFRESH_TIMEOUT,
			request_timeout: None,
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the sign-in endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the authentication-failure rule.
	pub fn auth_failure(mut self, rule: AuthFailureRule) -> Self {
		self.auth_failure = rule;

		self
	}

	/// Overrides the refresh call timeout.
	pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	/// Sets a default timeout for ordinary requests.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			auth_failure: self.auth_failure,
			refresh_timeout: self.refresh_timeout,
			request_timeout: self.request_timeout,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		validate_base_url(&self.base_url)?;
		validate_path("refresh", &self.refresh_path)?;
		validate_path("login", &self.login_path)?;

		if self.is_refresh_path(&self.login_path) {
			return Err(ConfigError::ConflictingPaths { path: self.refresh_path.clone() });
		}
		if !(400..=499).contains(&self.auth_failure.status) {
			return Err(ConfigError::InvalidFailureStatus { status: self.auth_failure.status });
		}

		Ok(())
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
		Err(ConfigError::UnsupportedBaseUrl { url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ConfigError> {
	if !path.starts_with('/') || path.contains(['?', '#']) {
		Err(ConfigError::InvalidPath { name, path: path.to_owned() })
	} else {
		Ok(())
	}
}
