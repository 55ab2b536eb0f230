//! Shared helpers for integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::MockServer;
// self
use weixin_auth::{
	auth::{AppConfig, AppId},
	endpoint::PlatformEndpoints,
	http::{ReqwestHttpClient, ReqwestTransportErrorMapper},
	manager::{ReqwestTokenManager, TokenManager, TokenManagerConfig},
	reqwest::Client,
	store::{MemoryStore, SettingsStore},
	url::Url,
};

pub const APP_SECRET: &str = "app-secret";
pub const APP_TOKEN: &str = "app-token";

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock` during tests.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Points both platform endpoints at the mock server.
pub fn mock_endpoints(server: &MockServer) -> PlatformEndpoints {
	let base = Url::parse(&server.url("/")).expect("Mock server base URL should parse.");

	PlatformEndpoints::builder()
		.base_url(base)
		.build()
		.expect("Mock endpoints should pass validation.")
}

/// Registered app fixture sharing the crate-wide secret + callback token.
pub fn app(id: &str) -> AppConfig {
	AppConfig::new(AppId::new(id).expect("App fixture should be valid."), APP_SECRET, APP_TOKEN)
}

/// Constructs a reqwest-backed manager over an in-memory store.
pub fn build_reqwest_test_manager(
	server: &MockServer,
	config: TokenManagerConfig,
) -> (ReqwestTokenManager, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn SettingsStore> = store_backend.clone();
	let manager = build_reqwest_test_manager_with_store(server, store, config);

	(manager, store_backend)
}

/// Constructs a reqwest-backed manager over the provided store.
pub fn build_reqwest_test_manager_with_store(
	server: &MockServer,
	store: Arc<dyn SettingsStore>,
	config: TokenManagerConfig,
) -> ReqwestTokenManager {
	let endpoints = mock_endpoints(server);
	let http_client = test_reqwest_http_client();

	TokenManager::with_http_client(store, endpoints, http_client, ReqwestTransportErrorMapper)
		.with_config(config)
}

/// JSON body the token endpoint answers with.
pub fn token_body(access_token: &str, expires_in: i64) -> String {
	format!(r#"{{"access_token":"{access_token}","expires_in":{expires_in}}}"#)
}
