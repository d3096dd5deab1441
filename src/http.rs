//! Transport primitives for task-board API calls.
//!
//! The module exposes [`ApiTransport`] alongside the transport-neutral [`ApiRequest`] and
//! [`ApiResponse`] values so downstream crates (and tests) can plug in their own HTTP stack
//! without touching the credential lifecycle that wraps every call.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<ApiResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing a single API request.
///
/// The trait is the client's only dependency on an HTTP stack. Implementations must resolve
/// to `Ok` for every response the server produced, whatever its status; only failures that
/// left no response (DNS, TCP, TLS, timeout) are reported as `Err`. Status classification,
/// credential attachment, and replay all happen above this layer.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` to `url` and collects the full response.
	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, url: Url, request: ApiRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let ApiRequest { method, query, headers, body, timeout, .. } = request;
			let mut builder = client.request(method.into(), url);

			if !query.is_empty() {
				builder = builder.query(&query);
			}
			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = body {
				builder = builder.body(body);
			}
			if let Some(timeout) = timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.filter_map(|(name, value)| {
					value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
				})
				.collect();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
