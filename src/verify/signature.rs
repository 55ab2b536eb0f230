//! Callback signature primitives.

// crates.io
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;
// self
use crate::_prelude::*;

/// Computes the platform signature for `(token, timestamp, nonce)`.
///
/// The three values are sorted by byte order, concatenated without a separator, hashed with
/// SHA-1, and rendered as 40 lowercase hex characters. The result does not depend on argument
/// order. Empty inputs are accepted.
pub fn generate_signature(token: &str, timestamp: impl Display, nonce: &str) -> String {
	let timestamp = timestamp.to_string();
	let mut parts = [token, timestamp.as_str(), nonce];

	parts.sort_unstable();

	let mut hasher = Sha1::new();

	for part in parts {
		hasher.update(part.as_bytes());
	}

	hex::encode(hasher.finalize())
}

/// Returns `true` iff `signature` equals the recomputed signature exactly.
///
/// Comparison is case-sensitive and runs in constant time for equal-length inputs.
pub fn check(token: &str, signature: &str, timestamp: impl Display, nonce: &str) -> bool {
	let expected = generate_signature(token, timestamp, nonce);

	expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
