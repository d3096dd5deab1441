//! Principal identity returned alongside issued credentials.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const IDENTIFIER_MAX_LEN: usize = 128;

/// Error returned when principal identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Principal identifier cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Principal identifier contains whitespace.")]
	ContainsWhitespace,
	/// The identifier exceeded the allowed character count.
	#[error("Principal identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Identifier of the signed-in user.
///
/// Servers emit it either as a string or as an integer; both deserialize into the same
/// validated textual form.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPrincipalId", into = "String")]
pub struct PrincipalId(String);
impl PrincipalId {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for PrincipalId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for PrincipalId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for PrincipalId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<PrincipalId> for String {
	fn from(value: PrincipalId) -> Self {
		value.0
	}
}
impl TryFrom<RawPrincipalId> for PrincipalId {
	type Error = IdentifierError;

	fn try_from(value: RawPrincipalId) -> Result<Self, Self::Error> {
		match value {
			RawPrincipalId::Text(text) => {
				validate_view(&text)?;

				Ok(Self(text))
			},
			RawPrincipalId::Number(number) => Ok(Self(number.to_string())),
		}
	}
}
impl Debug for PrincipalId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Principal({})", self.0)
	}
}
impl Display for PrincipalId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for PrincipalId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

/// Wire form of a [`PrincipalId`] before validation.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawPrincipalId {
	/// Textual identifier.
	Text(String),
	/// Integer identifier.
	Number(u64),
}

/// Identity of the user a credential pair was issued to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
	/// Stable user identifier.
	#[serde(alias = "_id")]
	pub id: PrincipalId,
	/// Contact email, when the server shares it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Display name, when the server shares it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}
impl Principal {
	/// Creates a principal carrying only its identifier.
	pub fn new(id: PrincipalId) -> Self {
		Self { id, email: None, name: None }
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}
