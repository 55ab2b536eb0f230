//! Access-token lifecycle manager.
//!
//! [`TokenManager`] owns the per-application [`TokenRecord`] cached in a [`SettingsStore`]
//! under [`AUTH_NAMESPACE`]. It fetches tokens from the platform ([`TokenManager::tokenize`]),
//! decides whether the cached token is due for refresh ([`TokenManager::determine`]), hands out
//! a usable token ([`TokenManager::access_token`]), and lists callback IPs
//! ([`TokenManager::ips`]).
//!
//! `determine` is advisory: it takes no lock, so a caller that checks and then refreshes can
//! race with another caller doing the same. Enable [`TokenManagerConfig::singleflight`] to
//! serialize the refreshes performed by `access_token` per application.

mod access;
mod config;
mod ips;
mod metrics;
mod tokenize;

pub use config::TokenManagerConfig;
pub use metrics::RefreshMetrics;

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AppId, TokenRecord},
	endpoint::PlatformEndpoints,
	http::{PlatformHttpClient, TransportErrorMapper},
	platform::PlatformFacade,
	store::{AUTH_NAMESPACE, SettingsStore, StoreError},
};
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Manager specialized for the crate's default reqwest transport stack.
pub type ReqwestTokenManager = TokenManager<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates access-token fetches, caching, and refresh decisions for registered apps.
///
/// The manager is cheap to clone; clones share the transport, store, metrics, and refresh
/// guards.
pub struct TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound platform request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Settings store holding the cached token records.
	pub store: Arc<dyn SettingsStore>,
	/// Platform endpoints the manager calls.
	pub endpoints: PlatformEndpoints,
	/// Refresh interval and concurrency settings.
	pub config: TokenManagerConfig,
	/// Shared metrics recorder for token endpoint refreshes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guards: Arc<Mutex<HashMap<AppId, Arc<AsyncMutex<()>>>>>,
}
impl<C, M> TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a manager that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn SettingsStore>,
		endpoints: PlatformEndpoints,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			endpoints,
			config: TokenManagerConfig::default(),
			refresh_metrics: Default::default(),
			refresh_guards: Default::default(),
		}
	}

	/// Replaces the manager configuration.
	pub fn with_config(mut self, config: TokenManagerConfig) -> Self {
		self.config = config;

		self
	}

	pub(crate) fn facade(&self) -> PlatformFacade<'_, C, M> {
		PlatformFacade::new(
			&self.endpoints,
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
		)
	}

	pub(crate) fn refresh_guard(&self, app_id: &AppId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.refresh_guards.lock();

		guards.entry(app_id.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}

	/// Loads the stored record, failing on values that do not decode.
	pub(crate) async fn stored_record(&self, app_id: &AppId) -> Result<Option<TokenRecord>> {
		let Some(value) = <dyn SettingsStore>::get(self.store.as_ref(), app_id, AUTH_NAMESPACE)
			.await
			.map_err(Error::from)?
		else {
			return Ok(None);
		};

		decode_record(app_id, value).map(Some)
	}

	/// Loads the stored record, treating undecodable values as absent so a refresh replaces
	/// them.
	pub(crate) async fn cached_record(&self, app_id: &AppId) -> Result<Option<TokenRecord>> {
		match self.stored_record(app_id).await {
			Err(Error::Storage(StoreError::Serialization { message })) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(app = %app_id, %message, "Ignoring undecodable token record.");
				#[cfg(not(feature = "tracing"))]
				let _ = message;

				Ok(None)
			},
			other => other,
		}
	}

	pub(crate) async fn save_record(&self, app_id: &AppId, record: &TokenRecord) -> Result<()> {
		let value = serde_json::to_value(record).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode token record for {app_id}: {e}"),
		})?;

		<dyn SettingsStore>::set(self.store.as_ref(), app_id, AUTH_NAMESPACE, value)
			.await
			.map_err(Error::from)
	}
}
impl<C, M> Clone for TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			store: self.store.clone(),
			endpoints: self.endpoints.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guards: self.refresh_guards.clone(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl TokenManager<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a manager backed by a default reqwest client.
	///
	/// Use [`TokenManager::with_http_client`] to supply a preconfigured client (timeouts,
	/// proxies, TLS roots).
	pub fn new(store: Arc<dyn SettingsStore>, endpoints: PlatformEndpoints) -> Self {
		Self::with_http_client(
			store,
			endpoints,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("endpoints", &self.endpoints)
			.field("config", &self.config)
			.finish()
	}
}

fn decode_record(app_id: &AppId, value: Value) -> Result<TokenRecord> {
	serde_json::from_value(value).map_err(|e| {
		StoreError::Serialization {
			message: format!("Stored token record for {app_id} is malformed: {e}"),
		}
		.into()
	})
}
