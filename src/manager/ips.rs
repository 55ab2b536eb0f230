//! Callback server IP-list lookup.

// self
use crate::{
	_prelude::*,
	auth::AppConfig,
	http::{PlatformHttpClient, TransportErrorMapper},
	manager::TokenManager,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

impl<C, M> TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Lists the IP addresses the platform sends callbacks from.
	///
	/// Obtains a token through [`TokenManager::access_token`] first. The list is not cached.
	pub async fn ips(&self, app: &AppConfig) -> Result<Vec<String>> {
		const KIND: OpKind = OpKind::CallbackIps;

		let span = OpSpan::new(KIND, "ips").with_app(&app.id);

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let record = self.access_token(app).await?;

				self.facade().fetch_callback_ips(&record.access_token).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		endpoint::EndpointKind,
		manager::{TokenManagerConfig, test_support::*},
	};

	#[tokio::test]
	async fn ips_reuse_the_cached_token() {
		let client = Arc::new(ScriptedClient::default());

		client
			.token("tok", 7200)
			.reply(200, r#"{"ip_list":["101.226.62.77","101.226.62.78"]}"#)
			.reply(200, r#"{"ip_list":[]}"#);

		let (manager, _) = manager(client.clone(), TokenManagerConfig::default());
		let app = app("wx-ips");
		let ips = manager.ips(&app).await.expect("IP lookup should succeed.");

		assert_eq!(ips, vec!["101.226.62.77".to_owned(), "101.226.62.78".to_owned()]);
		assert!(manager.ips(&app).await.expect("Second lookup should succeed.").is_empty());
		assert_eq!(client.calls(), 3);

		let seen = client.seen.lock();

		assert_eq!(seen[1].path(), "/cgi-bin/getcallbackip");
		assert_eq!(seen[1].query(), Some("access_token=tok"));
		assert_eq!(seen[2].query(), Some("access_token=tok"));
	}

	#[tokio::test]
	async fn ip_endpoint_errors_are_platform_errors() {
		let client = Arc::new(ScriptedClient::default());

		client
			.token("tok", 7200)
			.reply(200, r#"{"errcode":40001,"errmsg":"invalid credential"}"#);

		let (manager, _) = manager(client, TokenManagerConfig::default());
		let err = manager.ips(&app("wx-ips-err")).await.expect_err("Error body must fail.");

		assert!(matches!(
			err,
			Error::Platform { endpoint: EndpointKind::CallbackIp, code: 40001, .. }
		));
	}
}
