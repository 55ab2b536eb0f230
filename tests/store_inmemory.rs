// crates.io
use serde_json::json;
// self
use weixin_auth::{
	auth::AppId,
	store::{AUTH_NAMESPACE, MemoryStore, SettingsStore},
};

fn app(id: &str) -> AppId {
	AppId::new(id).expect("Failed to build app identifier for memory store tests.")
}

#[tokio::test]
async fn namespaces_and_apps_are_isolated() {
	let store = MemoryStore::default();
	let first = app("wx-first");
	let second = app("wx-second");

	store
		.set(&first, AUTH_NAMESPACE, json!({ "accessToken": "first" }))
		.await
		.expect("Failed to save first app auth settings.");
	store
		.set(&first, "menu", json!(["button"]))
		.await
		.expect("Failed to save first app menu settings.");

	assert_eq!(
		store.get(&first, AUTH_NAMESPACE).await.expect("Failed to read auth settings."),
		Some(json!({ "accessToken": "first" }))
	);
	assert_eq!(
		store.get(&first, "menu").await.expect("Failed to read menu settings."),
		Some(json!(["button"]))
	);
	assert_eq!(store.get(&second, AUTH_NAMESPACE).await.expect("Failed to read settings."), None);
	assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn last_writer_wins_and_clones_share_state() {
	let store = MemoryStore::default();
	let shared = store.clone();
	let id = app("wx-overwrite");

	store
		.set(&id, AUTH_NAMESPACE, json!({ "accessToken": "old" }))
		.await
		.expect("Failed to save initial settings.");
	shared
		.set(&id, AUTH_NAMESPACE, json!({ "accessToken": "new" }))
		.await
		.expect("Failed to overwrite settings through a clone.");

	assert_eq!(
		store.get(&id, AUTH_NAMESPACE).await.expect("Failed to read overwritten settings."),
		Some(json!({ "accessToken": "new" }))
	);
	assert_eq!(store.len(), 1);
	assert!(!shared.is_empty());
}
