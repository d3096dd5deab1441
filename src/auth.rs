//! Credential model: redacted secrets, the access/refresh pair, and principal identity.

pub mod credential;
pub mod principal;
pub mod secret;

pub use credential::*;
pub use principal::*;
pub use secret::*;
