//! Registered application credentials.

// self
use crate::{
	_prelude::*,
	auth::{AppId, TokenSecret},
};

/// Identity and shared secrets for one registered application.
///
/// `secret` authenticates the app against the token endpoint; `token` is the shared value
/// mixed into callback signatures. Both are redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
	/// Platform application identifier (`appid`).
	pub id: AppId,
	/// Application secret (`secret`).
	pub secret: TokenSecret,
	/// Callback verification token.
	pub token: TokenSecret,
}
impl AppConfig {
	/// Creates a new application config.
	pub fn new(id: AppId, secret: impl Into<String>, token: impl Into<String>) -> Self {
		Self { id, secret: TokenSecret::new(secret), token: TokenSecret::new(token) }
	}
}
impl Debug for AppConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AppConfig")
			.field("id", &self.id)
			.field("secret", &"<redacted>")
			.field("token", &"<redacted>")
			.finish()
	}
}
