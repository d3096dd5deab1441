//! Fully buffered API response plus helpers for decoding bodies and error envelopes.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Error envelope the task-board API attaches to non-success responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
	/// Error discriminator (for example `AuthenticationError`).
	#[serde(default)]
	pub error: Option<String>,
	/// Human-readable message.
	#[serde(default)]
	pub message: Option<String>,
}

/// Response captured by an [`ApiTransport`](crate::http::ApiTransport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers keyed by lower-cased names.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Creates an empty response with `status`.
	pub fn new(status: u16) -> Self {
		Self { status, headers: BTreeMap::new(), body: Vec::new() }
	}

	/// Replaces the body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns a header value by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::Decode { status: self.status, source })
	}

	/// Parses the error envelope; bodies that are not an envelope yield an empty one.
	pub fn error_body(&self) -> ErrorBody {
		serde_json::from_slice(&self.body).unwrap_or_default()
	}

	/// Body rendered as text, replacing invalid UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Message to surface for a failed response: the envelope message, else a body preview.
	pub fn failure_message(&self) -> String {
		const PREVIEW_LIMIT: usize = 256;

		if let Some(message) = self.error_body().message {
			return message;
		}

		let text = self.text();
		let trimmed = text.trim();

		if trimmed.is_empty() {
			return format!("HTTP {}", self.status);
		}

		trimmed.chars().take(PREVIEW_LIMIT).collect()
	}
}
