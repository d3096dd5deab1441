//! Transport-neutral outgoing request descriptor.

// self
use crate::{_prelude::*, auth::CredentialSecret};

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";
/// Name of the header describing the body encoding.
pub const CONTENT_TYPE: &str = "content-type";

/// HTTP verbs used by the task-board API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(value: Method) -> Self {
		match value {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Outgoing request: method, path relative to the configured base URL, query pairs,
/// lower-cased headers, and an optional body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute path below the base URL (for example `/boards/3/tasks`).
	pub path: String,
	/// Query string pairs, in order.
	pub query: Vec<(String, String)>,
	/// Header map keyed by lower-cased names.
	pub headers: BTreeMap<String, String>,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
	/// Per-request timeout overriding the client default.
	pub timeout: Option<Duration>,
}
impl ApiRequest {
	/// Creates a bodiless request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: BTreeMap::new(),
			body: None,
			timeout: None,
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Shorthand for a `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::Put, path)
	}

	/// Shorthand for a `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::Patch, path)
	}

	/// Shorthand for a `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::Delete, path)
	}

	/// Sets a header, replacing any previous value under the same (case-insensitive) name.
	pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());

		self
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Serializes `body` as JSON and sets the matching content type.
	pub fn json<T>(mut self, body: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let bytes = serde_json::to_vec(body).map_err(Error::Encode)?;

		self.body = Some(bytes);

		Ok(self.header(CONTENT_TYPE, "application/json"))
	}

	/// Overrides the timeout for this request.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Returns a header value by case-insensitive name.
	pub fn header_value(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Returns the `Authorization` header, if set.
	pub fn authorization(&self) -> Option<&str> {
		self.header_value(AUTHORIZATION)
	}

	/// Sets `Authorization: Bearer <credential>`.
	pub fn set_bearer(&mut self, credential: &CredentialSecret) {
		self.headers.insert(AUTHORIZATION.into(), credential.bearer_header());
	}

	/// Drops the `Authorization` header.
	pub fn clear_authorization(&mut self) {
		self.headers.remove(AUTHORIZATION);
	}
}
