//! Crate-level error types shared across verification, token management, and stores.

// self
use crate::{_prelude::*, endpoint::EndpointKind};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Inbound callback failed verification.
	#[error(transparent)]
	Verify(#[from] crate::verify::VerifyError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; the caller may retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Platform answered with a non-zero `errcode`.
	#[error("Platform rejected the {endpoint} request with errcode {code}: {message}.")]
	Platform {
		/// Endpoint that produced the error body.
		endpoint: EndpointKind,
		/// Platform `errcode` value.
		code: i64,
		/// Platform `errmsg` value (empty when omitted).
		message: String,
	},
}
impl Error {
	/// Coarse classification used when rendering errors back to the platform.
	///
	/// Only verification failures carry a dedicated kind; everything else collapses into
	/// [`ErrorKind::UnknownError`].
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Verify(err) => err.kind(),
			_ => ErrorKind::UnknownError,
		}
	}
}

/// Classification surfaced to callback responders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
	/// One or more of signature/timestamp/nonce is missing.
	InputInvalid,
	/// The recomputed signature disagrees with the supplied one.
	SignatureNotMatch,
	/// Any other failure.
	UnknownError,
}
impl ErrorKind {
	/// Returns the stable wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ErrorKind::InputInvalid => "INPUT_INVALID",
			ErrorKind::SignatureNotMatch => "SIGNATURE_NOT_MATCH",
			ErrorKind::UnknownError => "UNKNOWN_ERROR",
		}
	}

	/// Human-readable message paired with the label.
	pub const fn message(self) -> &'static str {
		match self {
			ErrorKind::InputInvalid => "Input invalid.",
			ErrorKind::SignatureNotMatch => "Signature does not match.",
			ErrorKind::UnknownError => "Unknown error.",
		}
	}

	/// Builds the structured body a responder sends back (always with HTTP 200).
	pub const fn body(self) -> ErrorBody {
		ErrorBody { code: self, message: self.message() }
	}
}
impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<&Error> for ErrorKind {
	fn from(err: &Error) -> Self {
		err.kind()
	}
}

/// Structured error object rendered in callback responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
	/// Classification label.
	pub code: ErrorKind,
	/// Human-readable message.
	pub message: &'static str,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint set failed validation.
	#[error(transparent)]
	InvalidEndpoint(#[from] crate::endpoint::EndpointError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Endpoint returned an unexpected but non-fatal response.
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Endpoint that failed.
		endpoint: EndpointKind,
		/// Message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint responded with JSON that could not be parsed.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	ResponseParse {
		/// Endpoint that failed.
		endpoint: EndpointKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
