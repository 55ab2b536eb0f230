//! Construction-time knobs for [`TokenManager`](crate::manager::TokenManager).

// self
use crate::{_prelude::*, time_serde};

/// Token manager configuration.
///
/// Deserializes from `{"access_token_exp": <seconds>, "singleflight": <bool>}`; missing fields
/// take their defaults and a negative interval clamps to zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenManagerConfig {
	/// Local refresh interval measured from the last successful fetch.
	#[serde(with = "time_serde::non_negative_seconds")]
	pub access_token_exp: Duration,
	/// Serializes refreshes issued by `access_token` per application.
	///
	/// Off by default: overlapping refreshes then race and the last write wins.
	pub singleflight: bool,
}
impl TokenManagerConfig {
	/// Default refresh interval (two hours).
	pub const DEFAULT_ACCESS_TOKEN_EXP: Duration = Duration::seconds(7_200);

	/// Overrides the refresh interval. Negative values clamp to zero.
	pub fn with_access_token_exp(mut self, interval: Duration) -> Self {
		self.access_token_exp = if interval.is_negative() { Duration::ZERO } else { interval };

		self
	}

	/// Enables or disables per-application refresh serialization.
	pub fn with_singleflight(mut self, enabled: bool) -> Self {
		self.singleflight = enabled;

		self
	}
}
impl Default for TokenManagerConfig {
	fn default() -> Self {
		Self { access_token_exp: Self::DEFAULT_ACCESS_TOKEN_EXP, singleflight: false }
	}
}
