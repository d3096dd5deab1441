//! Access/refresh credential pair and the session grant that mints it.

// self
use crate::{
	_prelude::*,
	auth::{CredentialSecret, Principal},
};

/// Current access + refresh credentials owned by a [`CredentialStore`](crate::store::CredentialStore).
///
/// Absent at process start, set on sign-in, replaced wholesale on every successful refresh,
/// and cleared on sign-out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential attached to API calls.
	pub access: Option<CredentialSecret>,
	/// Longer-lived credential exchanged for a new pair.
	pub refresh: Option<CredentialSecret>,
	/// Identity the pair was issued to, when known.
	pub principal: Option<Principal>,
	/// Local instant at which the pair was stored.
	pub issued_at: Option<OffsetDateTime>,
}
impl CredentialPair {
	/// Creates a pair from raw access and refresh values.
	pub fn new(access: impl Into<CredentialSecret>, refresh: impl Into<CredentialSecret>) -> Self {
		Self {
			access: Some(access.into()),
			refresh: Some(refresh.into()),
			principal: None,
			issued_at: None,
		}
	}

	/// Creates a pair that only carries an access credential.
	pub fn access_only(access: impl Into<CredentialSecret>) -> Self {
		Self { access: Some(access.into()), ..Self::default() }
	}

	/// Attaches the principal the pair belongs to.
	pub fn with_principal(mut self, principal: Principal) -> Self {
		self.principal = Some(principal);

		self
	}

	/// Stamps the instant the pair was issued.
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Returns `true` when neither credential is present.
	pub fn is_empty(&self) -> bool {
		self.access.is_none() && self.refresh.is_none()
	}

	/// Borrowed access credential, if any.
	pub fn access_token(&self) -> Option<&CredentialSecret> {
		self.access.as_ref()
	}

	/// Borrowed refresh credential, if any.
	pub fn refresh_token(&self) -> Option<&CredentialSecret> {
		self.refresh.as_ref()
	}
}

/// Body returned by the sign-in and refresh endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
	/// Newly minted access credential.
	#[serde(alias = "access_token")]
	pub access_token: CredentialSecret,
	/// Newly minted refresh credential.
	#[serde(alias = "refresh_token")]
	pub refresh_token: CredentialSecret,
	/// Identity the credentials belong to.
	#[serde(alias = "principal")]
	pub user: Principal,
}
impl SessionGrant {
	/// Converts the grant into a stored pair stamped with `now`.
	pub fn into_pair(self, now: OffsetDateTime) -> CredentialPair {
		CredentialPair::new(self.access_token, self.refresh_token)
			.with_principal(self.user)
			.with_issued_at(now)
	}
}

/// Body posted to the refresh endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequestBody<'a> {
	/// Refresh credential being exchanged.
	pub refresh_token: &'a str,
}

/// Body posted to the sign-in endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct SignInBody<'a> {
	/// Account email.
	pub email: &'a str,
	/// Account password.
	pub password: &'a str,
}
