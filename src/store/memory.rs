//! Thread-safe in-memory [`SettingsStore`] implementation for local development and tests.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::AppId,
	store::{SettingsStore, StoreError, StoreFuture, StoreKey},
};

type StoreMap = Arc<RwLock<HashMap<StoreKey, Value>>>;

/// Storage backend that keeps settings in-process; clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of stored entries across all apps and namespaces.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing has been stored yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	fn get_now(map: StoreMap, key: StoreKey) -> Option<Value> {
		map.read().get(&key).cloned()
	}

	fn set_now(map: StoreMap, key: StoreKey, value: Value) -> Result<(), StoreError> {
		map.write().insert(key, value);

		Ok(())
	}
}
impl SettingsStore for MemoryStore {
	fn get<'a>(&'a self, app_id: &'a AppId, namespace: &'a str) -> StoreFuture<'a, Option<Value>> {
		let map = self.0.clone();
		let key = StoreKey::new(app_id, namespace);

		Box::pin(async move { Ok(Self::get_now(map, key)) })
	}

	fn set<'a>(
		&'a self,
		app_id: &'a AppId,
		namespace: &'a str,
		value: Value,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let key = StoreKey::new(app_id, namespace);

		Box::pin(async move { Self::set_now(map, key, value) })
	}
}
