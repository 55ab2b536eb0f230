//! Serde adapters for the integer time encodings used in persisted settings.

// self
use crate::_prelude::*;

/// `OffsetDateTime` <-> integer unix milliseconds.
pub(crate) mod unix_millis {
	// crates.io
	use serde::{Deserializer, Serializer, de::Error as _, ser::Error as _};
	// self
	use crate::_prelude::*;

	pub(crate) fn serialize<S>(instant: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let millis = i64::try_from(instant.unix_timestamp_nanos() / 1_000_000)
			.map_err(S::Error::custom)?;

		serializer.serialize_i64(millis)
	}

	pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let millis = i64::deserialize(deserializer)?;

		OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
			.map_err(D::Error::custom)
	}
}

/// `Duration` <-> integer whole seconds.
pub(crate) mod whole_seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub(crate) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(duration.whole_seconds())
	}

	pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(Duration::seconds)
	}
}

/// Like [`whole_seconds`], but negative inputs clamp to zero on the way in.
pub(crate) mod non_negative_seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub(crate) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		super::whole_seconds::serialize(duration, serializer)
	}

	pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		super::whole_seconds::deserialize(deserializer).map(|duration| duration.max(Duration::ZERO))
	}
}

/// Truncates an instant to millisecond precision so it survives a persistence round trip.
pub(crate) fn truncate_to_millis(instant: OffsetDateTime) -> OffsetDateTime {
	let nanos = instant.nanosecond() / 1_000_000 * 1_000_000;

	instant.replace_nanosecond(nanos).unwrap_or(instant)
}
