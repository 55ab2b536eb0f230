//! Cached access-token records and the token endpoint's response shape.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, time_serde};

/// Parsed token endpoint reply.
///
/// `expires_in` is kept exactly as the platform declared it; the manager never clamps it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Opaque access token.
	pub access_token: TokenSecret,
	/// Platform-declared TTL in seconds.
	pub expires_in: i64,
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.finish()
	}
}

/// Access token cached per application in the settings store.
///
/// Persisted as `{"accessToken", "expiresIn", "lastFetchTime"}` with the fetch instant in
/// unix milliseconds. A missing record means no fetch has succeeded yet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Platform-declared TTL in seconds.
	pub expires_in: i64,
	/// Instant of the last successful fetch.
	#[serde(with = "time_serde::unix_millis")]
	pub last_fetch_time: OffsetDateTime,
}
impl TokenRecord {
	/// Builds a record from a token endpoint reply fetched at `fetched_at`.
	pub fn from_response(response: &TokenResponse, fetched_at: OffsetDateTime) -> Self {
		Self {
			access_token: response.access_token.clone(),
			expires_in: response.expires_in,
			last_fetch_time: fetched_at,
		}
	}

	/// Time elapsed since the last fetch, as seen at `now`.
	pub fn elapsed_at(&self, now: OffsetDateTime) -> Duration {
		now - self.last_fetch_time
	}

	/// Returns `true` once at least `interval` has passed since the last fetch.
	pub fn is_refresh_due_at(&self, now: OffsetDateTime, interval: Duration) -> bool {
		self.elapsed_at(now) >= interval
	}

	/// Instant the platform-declared TTL runs out, if representable.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.last_fetch_time.checked_add(Duration::seconds(self.expires_in))
	}

	/// Returns `true` if the platform-declared TTL has elapsed at `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at().is_some_and(|expires_at| now >= expires_at)
	}

	/// Returns `true` if the platform-declared TTL has elapsed.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("access_token", &"<redacted>")
			.field("expires_in", &self.expires_in)
			.field("last_fetch_time", &self.last_fetch_time)
			.finish()
	}
}
