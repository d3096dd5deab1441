//! Client-level error types shared across the transport, refresh coordinator, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout). Never triggers a refresh.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The coordinated credential refresh failed; every request blocked on it receives this.
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// The server rejected the request's credentials and no further refresh is allowed.
	#[error("Authentication failed with HTTP {status}: {message}.")]
	Authentication {
		/// HTTP status code returned by the server.
		status: u16,
		/// Server-supplied error discriminator, when present.
		error: Option<String>,
		/// Server- or client-supplied message.
		message: String,
	},
	/// The server answered with a non-success status unrelated to credential expiry.
	#[error("Request failed with HTTP {status}: {message}.")]
	Api {
		/// HTTP status code returned by the server.
		status: u16,
		/// Server-supplied error discriminator, when present.
		error: Option<String>,
		/// Server- or client-supplied message.
		message: String,
	},
	/// A success response carried a body that could not be decoded.
	#[error("Response body is malformed JSON.")]
	Decode {
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A request body could not be serialized.
	#[error("Request body could not be serialized.")]
	Encode(#[source] serde_json::Error),
}
impl Error {
	/// Returns `true` when the failure means the session is no longer usable and the caller
	/// should route to a re-authentication flow.
	pub fn is_authentication_failure(&self) -> bool {
		match self {
			Self::Authentication { .. } => true,
			Self::Refresh(err) => err.is_authentication_failure(),
			_ => false,
		}
	}

	/// HTTP status attached to the failure, if the server produced one.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authentication { status, .. }
			| Self::Api { status, .. }
			| Self::Decode { status, .. } => Some(*status),
			Self::Refresh(RefreshError::Rejected { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL cannot carry request paths.
	#[error("Base URL `{url}` must be an absolute http(s) URL.")]
	UnsupportedBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// Endpoint paths must be absolute and free of query/fragment parts.
	#[error("The {name} path `{path}` must start with `/` and carry no query or fragment.")]
	InvalidPath {
		/// Which configured path failed validation.
		name: &'static str,
		/// Offending path.
		path: String,
	},
	/// The refresh and login endpoints collapsed onto the same path.
	#[error("The refresh and login paths must differ: `{path}`.")]
	ConflictingPaths {
		/// Shared path.
		path: String,
	},
	/// The authentication-failure status is not a client error code.
	#[error("Authentication failure status must be a 4xx code, got {status}.")]
	InvalidFailureStatus {
		/// Configured status.
		status: u16,
	},
}

/// Refresh failure shared by the refresher and every waiter released with it.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// The refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the refresh credential with HTTP {status}: {message}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
		/// Server-supplied error discriminator, when present.
		error: Option<String>,
		/// Server- or client-supplied message.
		message: String,
	},
	/// The refresh call never produced a response (network failure or timeout).
	#[error("Refresh call failed in transport: {message}.")]
	Transport {
		/// Rendered transport failure.
		message: String,
	},
	/// The refresh endpoint answered 2xx with a body that is not a session grant.
	#[error("Refresh endpoint returned a malformed session grant: {message}.")]
	MalformedResponse {
		/// Rendered parsing failure.
		message: String,
	},
	/// No refresh credential is stored, so a refresh cannot be attempted.
	#[error("No refresh credential is available.")]
	MissingRefreshCredential,
	/// The refresher was dropped before the refresh settled.
	#[error("The in-flight refresh was abandoned before it settled.")]
	Abandoned,
}
impl RefreshError {
	/// Returns `true` when the refresh credential itself was refused or is missing.
	pub fn is_authentication_failure(&self) -> bool {
		matches!(
			self,
			Self::Rejected { status: 400..=499, .. } | Self::MissingRefreshCredential
		)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Renders the error and its source chain on one line.
	pub fn render_chain(&self) -> String {
		let mut rendered = self.to_string();
		let mut source = StdError::source(self);

		while let Some(inner) = source {
			rendered.push_str(": ");
			rendered.push_str(&inner.to_string());

			source = inner.source();
		}

		rendered
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
