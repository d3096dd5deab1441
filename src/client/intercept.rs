//! Request and response interceptors wrapped around every transport call.

// self
use crate::{
	_prelude::*,
	auth::CredentialSecret,
	config::ClientConfig,
	http::{ApiRequest, ApiResponse},
};

/// Classification of a response produced by [`classify`].
#[derive(Debug)]
pub(crate) enum Verdict {
	/// 2xx response handed back to the caller.
	Done(ApiResponse),
	/// Failure surfaced to the caller unchanged.
	Failed(Error),
	/// Credential expiry on a non-session path; may be recovered by one refresh.
	Expired(Error),
}

/// Attaches `credential` as a bearer header unless `request` targets a session endpoint,
/// which never carries the access credential.
pub(crate) fn attach_credential(
	config: &ClientConfig,
	request: &mut ApiRequest,
	credential: Option<&CredentialSecret>,
) {
	if config.is_session_path(&request.path) {
		request.clear_authorization();

		return;
	}
	if let Some(credential) = credential {
		request.set_bearer(credential);
	}
}

/// Classifies `response` for a request sent to `path`.
pub(crate) fn classify(config: &ClientConfig, path: &str, response: ApiResponse) -> Verdict {
	if response.is_success() {
		return Verdict::Done(response);
	}

	let status = response.status;
	let body = response.error_body();
	let message = response.failure_message();
	let expired = config.auth_failure.matches(status, body.error.as_deref());

	if status == config.auth_failure.status {
		let err = Error::Authentication { status, error: body.error, message };

		if expired && !config.is_session_path(path) {
			Verdict::Expired(err)
		} else {
			Verdict::Failed(err)
		}
	} else {
		Verdict::Failed(Error::Api { status, error: body.error, message })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> ClientConfig {
		ClientConfig::builder(Url::parse("https://board.example.com/api").expect("URL parses."))
			.build()
			.expect("Default config should validate.")
	}

	fn expired() -> ApiResponse {
		ApiResponse::new(401)
			.with_body(r#"{"error":"AuthenticationError","message":"jwt expired"}"#)
	}

	#[test]
	fn attaches_bearer_to_ordinary_requests() {
		let mut request = ApiRequest::get("/boards");

		attach_credential(&config(), &mut request, Some(&CredentialSecret::new("tok1")));

		assert_eq!(request.authorization(), Some("Bearer tok1"));

		let mut anonymous = ApiRequest::get("/boards");

		attach_credential(&config(), &mut anonymous, None);

		assert!(anonymous.authorization().is_none());
	}

	#[test]
	fn session_endpoints_never_carry_access_credential() {
		let mut refresh =
			ApiRequest::post("/auth/refresh").header("Authorization", "Bearer smuggled");

		attach_credential(&config(), &mut refresh, Some(&CredentialSecret::new("tok1")));

		assert!(refresh.authorization().is_none());

		let mut login = ApiRequest::post("/auth/login");

		attach_credential(&config(), &mut login, Some(&CredentialSecret::new("tok1")));

		assert!(login.authorization().is_none());
	}

	#[test]
	fn discriminated_401_is_expired_except_on_session_paths() {
		assert!(matches!(classify(&config(), "/tasks", expired()), Verdict::Expired(_)));
		assert!(matches!(
			classify(&config(), "/auth/refresh", expired()),
			Verdict::Failed(Error::Authentication { status: 401, .. })
		));
	}

	#[test]
	fn other_failures_pass_through() {
		let plain_401 = ApiResponse::new(401).with_body(r#"{"error":"AccountDisabled"}"#);

		assert!(matches!(
			classify(&config(), "/tasks", plain_401),
			Verdict::Failed(Error::Authentication { error: Some(_), .. })
		));

		match classify(&config(), "/tasks", ApiResponse::new(404).with_body("missing")) {
			Verdict::Failed(Error::Api { status, message, .. }) => {
				assert_eq!(status, 404);
				assert_eq!(message, "missing");
			},
			other => panic!("Unexpected verdict: {other:?}."),
		}

		assert!(matches!(
			classify(&config(), "/tasks", ApiResponse::new(204)),
			Verdict::Done(_)
		));
	}
}
