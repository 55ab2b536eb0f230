//! Settings-store contract and built-in implementations.
//!
//! The store is a plain key-value map keyed by `(app id, namespace)` holding JSON values.
//! The token manager keeps its [`TokenRecord`](crate::auth::TokenRecord) under
//! [`AUTH_NAMESPACE`]; other namespaces are free for callers.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, auth::AppId};

/// Namespace the token manager persists access-token records under.
pub const AUTH_NAMESPACE: &str = "auth";

/// Boxed future returned by [`SettingsStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by settings stores.
///
/// Writes replace any previous value for the key. No transactional isolation is implied:
/// concurrent writers resolve as last-writer-wins.
pub trait SettingsStore
where
	Self: Send + Sync,
{
	/// Fetches the value stored for the app + namespace, if present.
	fn get<'a>(&'a self, app_id: &'a AppId, namespace: &'a str) -> StoreFuture<'a, Option<Value>>;

	/// Persists or replaces the value stored for the app + namespace.
	fn set<'a>(
		&'a self,
		app_id: &'a AppId,
		namespace: &'a str,
		value: Value,
	) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`SettingsStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend or while decoding stored values.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Unique key identifying a stored value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
	/// Owning application.
	pub app_id: AppId,
	/// Namespace within the application's settings.
	pub namespace: String,
}
impl StoreKey {
	/// Builds a key for the provided app + namespace.
	pub fn new(app_id: &AppId, namespace: &str) -> Self {
		Self { app_id: app_id.clone(), namespace: namespace.to_owned() }
	}
}
