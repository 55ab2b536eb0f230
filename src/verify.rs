//! Inbound callback verification.
//!
//! The platform signs every callback with `sha1(sort([token, timestamp, nonce]).join(""))`.
//! [`ack`] checks an extracted [`CallbackEnvelope`] against the app's shared token and returns
//! the `echostr` handshake value on success. Verification is synchronous and performs no I/O.

mod envelope;
mod signature;

pub use envelope::*;
pub use signature::*;

// self
use crate::{
	_prelude::*,
	auth::{AppConfig, TokenSecret},
	error::ErrorKind,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Reasons a callback fails verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ThisError)]
pub enum VerifyError {
	/// One or more of signature/timestamp/nonce is missing or empty.
	#[error("Callback is missing a signature, timestamp, or nonce.")]
	InputInvalid,
	/// The supplied signature does not match the recomputed one.
	#[error("Callback signature does not match.")]
	SignatureNotMatch,
}
impl VerifyError {
	/// Classification used when rendering the failure.
	pub const fn kind(self) -> ErrorKind {
		match self {
			VerifyError::InputInvalid => ErrorKind::InputInvalid,
			VerifyError::SignatureNotMatch => ErrorKind::SignatureNotMatch,
		}
	}
}

/// Verifies a callback envelope against `token`.
///
/// Returns the `echostr` value unchanged on success (possibly `None` for ordinary message
/// callbacks).
pub fn ack(token: &str, envelope: &CallbackEnvelope) -> Result<Option<String>, VerifyError> {
	const KIND: OpKind = OpKind::Ack;

	let _span = OpSpan::new(KIND, "ack").entered();

	obs::record_op_outcome(KIND, OpOutcome::Attempt);

	let result = verify_envelope(token, envelope);

	match &result {
		Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
		Err(err) => {
			#[cfg(feature = "tracing")]
			tracing::warn!(kind = err.kind().as_str(), "Callback verification failed.");

			obs::record_verify_failure(err.kind());
			obs::record_op_outcome(KIND, OpOutcome::Failure);
		},
	}

	result
}

fn verify_envelope(
	token: &str,
	envelope: &CallbackEnvelope,
) -> Result<Option<String>, VerifyError> {
	let (Some(signature), Some(timestamp), Some(nonce)) =
		(present(&envelope.signature), present(&envelope.timestamp), present(&envelope.nonce))
	else {
		return Err(VerifyError::InputInvalid);
	};

	if !check(token, signature, timestamp, nonce) {
		return Err(VerifyError::SignatureNotMatch);
	}

	Ok(envelope.echostr.clone())
}

fn present(field: &Option<String>) -> Option<&str> {
	field.as_deref().filter(|value| !value.is_empty())
}

/// Verifier bound to one application's callback token.
#[derive(Clone)]
pub struct SignatureVerifier {
	token: TokenSecret,
}
impl SignatureVerifier {
	/// Creates a verifier for a bare callback token.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: TokenSecret::new(token) }
	}

	/// Creates a verifier for the app's callback token.
	pub fn for_app(app: &AppConfig) -> Self {
		Self { token: app.token.clone() }
	}

	/// Computes the signature for `(timestamp, nonce)` under this verifier's token.
	pub fn sign(&self, timestamp: impl Display, nonce: &str) -> String {
		generate_signature(self.token.expose(), timestamp, nonce)
	}

	/// Checks `signature` for `(timestamp, nonce)` under this verifier's token.
	pub fn check(&self, signature: &str, timestamp: impl Display, nonce: &str) -> bool {
		check(self.token.expose(), signature, timestamp, nonce)
	}

	/// Verifies `envelope`; see [`ack`].
	pub fn ack(&self, envelope: &CallbackEnvelope) -> Result<Option<String>, VerifyError> {
		ack(self.token.expose(), envelope)
	}
}
impl Debug for SignatureVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignatureVerifier").field("token", &"<redacted>").finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::auth::AppId;

	const TOKEN: &str = "sososso";
	const TIMESTAMP: u64 = 1439402998232;
	const NONCE: &str = "wo1cn2NJPRnZWiTuQW8zQ6Mzn4qQ3kWi";
	const SIGNATURE: &str = "886a1db814d97a26c081a9814a47bf0b9ff1da9c";

	#[test]
	fn ack_echoes_echostr_verbatim() {
		let envelope = CallbackEnvelope::new(SIGNATURE, TIMESTAMP, NONCE).with_echostr("Hello world!");

		assert_eq!(ack(TOKEN, &envelope), Ok(Some("Hello world!".into())));
	}

	#[test]
	fn ack_without_echostr_still_succeeds() {
		let envelope = CallbackEnvelope::new(SIGNATURE, TIMESTAMP, NONCE);

		assert_eq!(ack(TOKEN, &envelope), Ok(None));
	}

	#[test]
	fn missing_or_empty_fields_are_input_invalid() {
		assert_eq!(ack(TOKEN, &CallbackEnvelope::default()), Err(VerifyError::InputInvalid));

		let mut envelope = CallbackEnvelope::new(SIGNATURE, TIMESTAMP, NONCE);

		envelope.nonce = Some(String::new());

		assert_eq!(ack(TOKEN, &envelope), Err(VerifyError::InputInvalid));

		let envelope = extract(&json!({ "signature": SIGNATURE, "nonce": NONCE }));

		assert_eq!(ack(TOKEN, &envelope), Err(VerifyError::InputInvalid));
	}

	#[test]
	fn falsy_json_fields_are_input_invalid() {
		let signature = generate_signature(TOKEN, 0, "n");
		let zero_timestamp =
			extract(&json!({ "signature": signature, "timestamp": 0, "nonce": "n", "echostr": "e" }));

		assert_eq!(ack(TOKEN, &zero_timestamp), Err(VerifyError::InputInvalid));

		let false_nonce = extract(&json!({
			"signature": SIGNATURE,
			"timestamp": TIMESTAMP,
			"nonce": false,
			"echostr": "e",
		}));

		assert_eq!(ack(TOKEN, &false_nonce), Err(VerifyError::InputInvalid));

		let null_signature =
			extract(&json!({ "signature": null, "timestamp": TIMESTAMP, "nonce": NONCE }));

		assert_eq!(ack(TOKEN, &null_signature), Err(VerifyError::InputInvalid));
	}

	#[test]
	fn wrong_token_is_signature_not_match() {
		let envelope = CallbackEnvelope::new(SIGNATURE, TIMESTAMP, NONCE).with_echostr("x");
		let err = ack("sdfsfdfds", &envelope).expect_err("Wrong token must not verify.");

		assert_eq!(err, VerifyError::SignatureNotMatch);
		assert_eq!(Error::from(err).kind(), ErrorKind::SignatureNotMatch);
	}

	#[test]
	fn verifier_binds_app_token() {
		let app = AppConfig::new(
			AppId::new("wx-verify").expect("App fixture should be valid."),
			"secret",
			TOKEN,
		);
		let verifier = SignatureVerifier::for_app(&app);
		let signature = verifier.sign(TIMESTAMP, NONCE);

		assert_eq!(signature, SIGNATURE);
		assert!(verifier.check(&signature, TIMESTAMP, NONCE));
		assert_eq!(
			verifier.ack(&CallbackEnvelope::new(signature, TIMESTAMP, NONCE).with_echostr("e")),
			Ok(Some("e".into()))
		);
		assert!(!format!("{verifier:?}").contains(TOKEN));
		assert!(!SignatureVerifier::new("other").check(SIGNATURE, TIMESTAMP, NONCE));
	}
}
