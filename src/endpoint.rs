//! Platform endpoint set consumed by the token manager.
//!
//! Endpoints must use HTTPS. Plain HTTP is accepted only for loopback hosts so local mock
//! servers can stand in for the platform.

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::_prelude::*;

/// Production token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.weixin.qq.com/cgi-bin/token";
/// Production callback-IP endpoint.
pub const DEFAULT_CALLBACK_IP_ENDPOINT: &str = "https://api.weixin.qq.com/cgi-bin/getcallbackip";

const TOKEN_PATH: &str = "cgi-bin/token";
const CALLBACK_IP_PATH: &str = "cgi-bin/getcallbackip";

/// Outbound platform endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
	/// Access-token endpoint.
	Token,
	/// Callback server IP-list endpoint.
	CallbackIp,
}
impl EndpointKind {
	/// Returns a stable label suitable for span or error fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Token => "token",
			EndpointKind::CallbackIp => "callback_ip",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Errors raised while assembling or validating [`PlatformEndpoints`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum EndpointError {
	/// Endpoint string could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidUrl {
		/// Which endpoint failed.
		endpoint: EndpointKind,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoint must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: EndpointKind,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Validated endpoint set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEndpoints {
	/// Access-token endpoint (`grant_type=client_credential`).
	pub token: Url,
	/// Callback server IP-list endpoint.
	pub callback_ip: Url,
}
impl PlatformEndpoints {
	/// Returns a builder seeded with the production endpoints.
	pub fn builder() -> PlatformEndpointsBuilder {
		PlatformEndpointsBuilder::default()
	}

	/// Returns the URL for the provided endpoint.
	pub fn url(&self, kind: EndpointKind) -> &Url {
		match kind {
			EndpointKind::Token => &self.token,
			EndpointKind::CallbackIp => &self.callback_ip,
		}
	}

	/// Re-checks the scheme rules, e.g. after deserializing from configuration.
	pub fn validate(&self) -> Result<(), EndpointError> {
		validate_endpoint(EndpointKind::Token, &self.token)?;
		validate_endpoint(EndpointKind::CallbackIp, &self.callback_ip)
	}
}

/// Builder for [`PlatformEndpoints`]. Unset endpoints fall back to the production URLs.
#[derive(Clone, Debug, Default)]
pub struct PlatformEndpointsBuilder {
	/// Base URL that both endpoint paths are joined onto.
	pub base_url: Option<Url>,
	/// Explicit token endpoint override.
	pub token: Option<Url>,
	/// Explicit callback-IP endpoint override.
	pub callback_ip: Option<Url>,
}
impl PlatformEndpointsBuilder {
	/// Resolves both endpoints relative to `base` (`cgi-bin/token`, `cgi-bin/getcallbackip`).
	///
	/// The base should end with `/` so its last path segment is kept.
	pub fn base_url(mut self, base: Url) -> Self {
		self.base_url = Some(base);

		self
	}

	/// Overrides the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token = Some(url);

		self
	}

	/// Overrides the callback-IP endpoint.
	pub fn callback_ip_endpoint(mut self, url: Url) -> Self {
		self.callback_ip = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting endpoint set.
	pub fn build(self) -> Result<PlatformEndpoints, EndpointError> {
		let token = self.resolve(EndpointKind::Token, self.token.clone())?;
		let callback_ip = self.resolve(EndpointKind::CallbackIp, self.callback_ip.clone())?;
		let endpoints = PlatformEndpoints { token, callback_ip };

		endpoints.validate()?;

		Ok(endpoints)
	}

	fn resolve(&self, endpoint: EndpointKind, explicit: Option<Url>) -> Result<Url, EndpointError> {
		if let Some(url) = explicit {
			return Ok(url);
		}

		let (path, default) = match endpoint {
			EndpointKind::Token => (TOKEN_PATH, DEFAULT_TOKEN_ENDPOINT),
			EndpointKind::CallbackIp => (CALLBACK_IP_PATH, DEFAULT_CALLBACK_IP_ENDPOINT),
		};
		let resolved = match &self.base_url {
			Some(base) => base.join(path),
			None => Url::parse(default),
		};

		resolved.map_err(|source| EndpointError::InvalidUrl { endpoint, source })
	}
}

fn validate_endpoint(endpoint: EndpointKind, url: &Url) -> Result<(), EndpointError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(EndpointError::InsecureEndpoint { endpoint, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
