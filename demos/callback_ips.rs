//! Demonstrates the full lifecycle against a mock platform: verify a callback handshake, fetch
//! and cache an access token, then list the platform's callback IPs.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use weixin_auth::{
	auth::{AppConfig, AppId},
	endpoint::PlatformEndpoints,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	manager::{TokenManager, TokenManagerConfig},
	reqwest::Client,
	store::{MemoryStore, SettingsStore},
	verify::{CallbackEnvelope, SignatureVerifier},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let app = AppConfig::new(AppId::new("wx-demo")?, "demo-secret", "demo-token");
	let verifier = SignatureVerifier::for_app(&app);
	let signature = verifier.sign(1_700_000_000, "demo-nonce");
	let handshake =
		CallbackEnvelope::new(signature, 1_700_000_000, "demo-nonce").with_echostr("ping");

	println!("Handshake echo: {:?}.", verifier.ack(&handshake)?);

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/cgi-bin/token").query_param("appid", "wx-demo");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"expires_in\":7200}");
		})
		.await;
	let ip_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/cgi-bin/getcallbackip")
				.query_param("access_token", "demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"ip_list\":[\"101.226.62.77\",\"101.226.62.78\"]}");
		})
		.await;
	let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::default());
	let endpoints = PlatformEndpoints::builder().base_url(Url::parse(&server.url("/"))?).build()?;
	let http_client = ReqwestHttpClient::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let mapper = <Arc<ReqwestTransportErrorMapper>>::new(ReqwestTransportErrorMapper);
	let manager = <TokenManager<ReqwestHttpClient, ReqwestTransportErrorMapper>>::with_http_client(
		store,
		endpoints,
		http_client,
		mapper,
	)
	.with_config(TokenManagerConfig::default().with_singleflight(true));
	let ips = manager.ips(&app).await?;
	let record = manager.access_token(&app).await?;

	println!("Callback IPs: {}.", ips.join(", "));
	println!("Cached access token expires in {}s.", record.expires_in);

	token_mock.assert_async().await;
	ip_mock.assert_async().await;

	Ok(())
}
