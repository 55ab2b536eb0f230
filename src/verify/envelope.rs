//! Callback envelope extraction.

// crates.io
use serde_json::Value;
// self
use crate::_prelude::*;

const SIGNATURE: &str = "signature";
const TIMESTAMP: &str = "timestamp";
const NONCE: &str = "nonce";
const ECHOSTR: &str = "echostr";

/// Fields the platform attaches to every callback.
///
/// Missing fields are `None`; validity is judged by [`ack`](crate::verify::ack).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackEnvelope {
	/// Platform-computed signature.
	pub signature: Option<String>,
	/// Platform timestamp, kept in its textual form.
	pub timestamp: Option<String>,
	/// Per-callback random value.
	pub nonce: Option<String>,
	/// Handshake challenge to echo back; present only on verification requests.
	pub echostr: Option<String>,
}
impl CallbackEnvelope {
	/// Creates an envelope from the three signed fields.
	pub fn new(
		signature: impl Into<String>,
		timestamp: impl Display,
		nonce: impl Into<String>,
	) -> Self {
		Self {
			signature: Some(signature.into()),
			timestamp: Some(timestamp.to_string()),
			nonce: Some(nonce.into()),
			echostr: None,
		}
	}

	/// Attaches the handshake challenge.
	pub fn with_echostr(mut self, echostr: impl Into<String>) -> Self {
		self.echostr = Some(echostr.into());

		self
	}

	/// Extracts the fields from a JSON payload.
	///
	/// Strings are taken verbatim; numbers and `true` are stringified. `null`, `false`, zero
	/// and structured values count as absent.
	pub fn from_json(payload: &Value) -> Self {
		let field = |name: &str| scalar(payload.get(name));

		Self {
			signature: field(SIGNATURE),
			timestamp: field(TIMESTAMP),
			nonce: field(NONCE),
			echostr: field(ECHOSTR),
		}
	}

	/// Extracts the fields from a URL query or `application/x-www-form-urlencoded` body.
	///
	/// When a key repeats, the first occurrence wins.
	pub fn from_query(query: &str) -> Self {
		let mut envelope = Self::default();

		for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
			let slot = match key.as_ref() {
				SIGNATURE => &mut envelope.signature,
				TIMESTAMP => &mut envelope.timestamp,
				NONCE => &mut envelope.nonce,
				ECHOSTR => &mut envelope.echostr,
				_ => continue,
			};

			if slot.is_none() {
				*slot = Some(value.into_owned());
			}
		}

		envelope
	}

	/// Extracts the fields from a callback URL's query string.
	pub fn from_url(url: &Url) -> Self {
		Self::from_query(url.query().unwrap_or_default())
	}
}

/// Pulls the callback fields out of a JSON request body.
pub fn extract(payload: &Value) -> CallbackEnvelope {
	CallbackEnvelope::from_json(payload)
}

fn scalar(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
		Value::Bool(true) => Some(true.to_string()),
		_ => None,
	}
}
