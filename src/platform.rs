//! Platform API facade shared by the token manager.
//!
//! Every call is a single GET whose JSON reply is either the expected payload or the platform's
//! error envelope `{"errcode": n, "errmsg": "..."}`. Non-zero `errcode` values surface as
//! [`Error::Platform`]; the facade never retries.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AppConfig, TokenResponse, TokenSecret},
	endpoint::{EndpointKind, PlatformEndpoints},
	error::TransientError,
	http::{PlatformHttpClient, ResponseMetadata, ResponseMetadataSlot, TransportErrorMapper},
};

const GRANT_TYPE: &str = "client_credential";

#[derive(Deserialize)]
struct CallbackIpList {
	ip_list: Vec<String>,
}

pub(crate) struct PlatformFacade<'a, C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	endpoints: &'a PlatformEndpoints,
	http_client: &'a C,
	error_mapper: &'a M,
}
impl<'a, C, M> PlatformFacade<'a, C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		endpoints: &'a PlatformEndpoints,
		http_client: &'a C,
		error_mapper: &'a M,
	) -> Self {
		Self { endpoints, http_client, error_mapper }
	}

	/// Exchanges the app credentials for a fresh access token.
	pub(crate) async fn fetch_token(&self, app: &AppConfig) -> Result<TokenResponse> {
		let mut url = self.endpoints.token.clone();

		url.query_pairs_mut()
			.append_pair("grant_type", GRANT_TYPE)
			.append_pair("appid", app.id.as_ref())
			.append_pair("secret", app.secret.expose());

		self.get_json(EndpointKind::Token, url).await
	}

	/// Lists the IP addresses the platform sends callbacks from.
	pub(crate) async fn fetch_callback_ips(&self, access_token: &TokenSecret) -> Result<Vec<String>> {
		let mut url = self.endpoints.callback_ip.clone();

		url.query_pairs_mut().append_pair("access_token", access_token.expose());

		let list: CallbackIpList = self.get_json(EndpointKind::CallbackIp, url).await?;

		Ok(list.ip_list)
	}

	async fn get_json<T>(&self, endpoint: EndpointKind, url: Url) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let slot = ResponseMetadataSlot::default();
		let response = match self.http_client.get(url, slot.clone()).await {
			Ok(response) => response,
			Err(e) => {
				let meta = slot.take();

				return Err(self.error_mapper.map_transport_error(endpoint, meta.as_ref(), e));
			},
		};
		let meta = slot.take();
		let status = Some(response.status);

		if !response.is_success() {
			return Err(TransientError::Endpoint {
				endpoint,
				message: format!("unexpected HTTP status {}", response.status),
				status,
				retry_after: meta_retry_after(meta.as_ref()),
			}
			.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let payload: Value = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TransientError::ResponseParse { endpoint, source, status })?;

		let code = payload.get("errcode").and_then(Value::as_i64).unwrap_or_default();

		if code != 0 {
			let message =
				payload.get("errmsg").and_then(Value::as_str).unwrap_or_default().to_owned();

			#[cfg(feature = "tracing")]
			tracing::debug!(
				endpoint = endpoint.as_str(),
				code,
				%message,
				"Platform returned an error body."
			);

			return Err(Error::Platform { endpoint, code, message });
		}

		serde_path_to_error::deserialize(payload)
			.map_err(|source| TransientError::ResponseParse { endpoint, source, status }.into())
	}
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

#[cfg(test)]
mod tests {
	// std
	use std::io::{Error as IoError, ErrorKind as IoErrorKind};
	// self
	use super::*;
	use crate::{
		auth::AppId,
		http::{HttpFuture, HttpResponse},
	};

	struct CannedClient {
		status: u16,
		body: &'static str,
		seen: Mutex<Vec<Url>>,
	}
	impl CannedClient {
		fn new(status: u16, body: &'static str) -> Self {
			Self { status, body, seen: Mutex::new(Vec::new()) }
		}
	}
	impl PlatformHttpClient for CannedClient {
		type TransportError = IoError;

		fn get(&self, url: Url, slot: ResponseMetadataSlot) -> HttpFuture<'_, Self::TransportError> {
			self.seen.lock().push(url);

			let status = self.status;

			if status == 0 {
				return Box::pin(async move {
					slot.store(ResponseMetadata { status: Some(504), retry_after: None });

					Err(IoError::new(IoErrorKind::TimedOut, "gateway went away"))
				});
			}

			let body = self.body;

			Box::pin(async move {
				slot.store(ResponseMetadata {
					status: Some(status),
					retry_after: Some(Duration::seconds(5)),
				});

				Ok(HttpResponse::new(status, body))
			})
		}
	}

	struct StatusEchoMapper;
	impl TransportErrorMapper<IoError> for StatusEchoMapper {
		fn map_transport_error(
			&self,
			endpoint: EndpointKind,
			metadata: Option<&ResponseMetadata>,
			error: IoError,
		) -> Error {
			TransientError::Endpoint {
				endpoint,
				message: error.to_string(),
				status: metadata.and_then(|meta| meta.status),
				retry_after: None,
			}
			.into()
		}
	}

	fn app() -> AppConfig {
		let id = AppId::new("wx-platform").expect("App fixture should be valid.");

		AppConfig::new(id, "s&cret", "t")
	}

	fn endpoints() -> PlatformEndpoints {
		PlatformEndpoints::builder().build().expect("Default endpoints should validate.")
	}

	#[tokio::test]
	async fn token_request_carries_credentials_in_query() {
		let client = CannedClient::new(200, r#"{"access_token":"tok","expires_in":7200}"#);
		let endpoints = endpoints();
		let facade = PlatformFacade::new(&endpoints, &client, &StatusEchoMapper);
		let response = facade.fetch_token(&app()).await.expect("Token fetch should succeed.");

		assert_eq!(response.access_token.expose(), "tok");
		assert_eq!(response.expires_in, 7200);

		let seen = client.seen.lock();
		let pairs: Vec<(String, String)> = seen[0].query_pairs().into_owned().collect();

		assert_eq!(seen[0].path(), "/cgi-bin/token");
		assert_eq!(
			pairs,
			vec![
				("grant_type".into(), "client_credential".into()),
				("appid".into(), "wx-platform".into()),
				("secret".into(), "s&cret".into()),
			]
		);
	}

	#[tokio::test]
	async fn errcode_bodies_become_platform_errors() {
		let client = CannedClient::new(200, r#"{"errcode":40013,"errmsg":"invalid appid"}"#);
		let endpoints = endpoints();
		let facade = PlatformFacade::new(&endpoints, &client, &StatusEchoMapper);
		let err = facade.fetch_token(&app()).await.expect_err("Error body must fail.");

		assert!(matches!(
			err,
			Error::Platform { endpoint: EndpointKind::Token, code: 40013, ref message }
				if message == "invalid appid"
		));
	}

	#[tokio::test]
	async fn zero_errcode_is_not_an_error() {
		let client = CannedClient::new(200, r#"{"errcode":0,"ip_list":["101.226.62.77"]}"#);
		let endpoints = endpoints();
		let facade = PlatformFacade::new(&endpoints, &client, &StatusEchoMapper);
		let ips = facade
			.fetch_callback_ips(&TokenSecret::new("tok"))
			.await
			.expect("IP list fetch should succeed.");

		assert_eq!(ips, vec!["101.226.62.77".to_owned()]);
		assert_eq!(client.seen.lock()[0].query(), Some("access_token=tok"));
	}

	#[tokio::test]
	async fn missing_fields_report_a_json_path() {
		let client = CannedClient::new(200, r#"{"access_token":"tok","expires_in":"soon"}"#);
		let endpoints = endpoints();
		let facade = PlatformFacade::new(&endpoints, &client, &StatusEchoMapper);
		let err = facade.fetch_token(&app()).await.expect_err("Bad TTL must fail.");

		match err {
			Error::Transient(TransientError::ResponseParse { source, status, .. }) => {
				assert_eq!(source.path().to_string(), "expires_in");
				assert_eq!(status, Some(200));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[tokio::test]
	async fn non_success_status_is_transient_with_retry_hint() {
		let client = CannedClient::new(503, "busy");
		let endpoints = endpoints();
		let facade = PlatformFacade::new(&endpoints, &client, &StatusEchoMapper);
		let err = facade.fetch_token(&app()).await.expect_err("503 must fail.");

		assert!(matches!(
			err,
			Error::Transient(TransientError::Endpoint {
				status: Some(503),
				retry_after: Some(retry),
				..
			}) if retry == Duration::seconds(5)
		));
	}

	#[tokio::test]
	async fn transport_failures_go_through_the_mapper_with_metadata() {
		let client = CannedClient::new(0, "");
		let endpoints = endpoints();
		let facade = PlatformFacade::new(&endpoints, &client, &StatusEchoMapper);
		let err = facade
			.fetch_callback_ips(&TokenSecret::new("tok"))
			.await
			.expect_err("Transport failure must surface.");

		assert!(matches!(
			err,
			Error::Transient(TransientError::Endpoint {
				endpoint: EndpointKind::CallbackIp,
				status: Some(504),
				..
			})
		));
	}
}
