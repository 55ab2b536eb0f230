//! Cached-or-refreshed access-token lookup.

// self
use crate::{
	_prelude::*,
	auth::{AppConfig, TokenRecord},
	http::{PlatformHttpClient, TransportErrorMapper},
	manager::TokenManager,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

impl<C, M> TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns a usable access token for `app`, refreshing it when needed.
	///
	/// The cached record is reused unless none exists, the refresh interval has elapsed, or
	/// the platform-declared TTL has run out; in those cases one token endpoint call is made.
	/// With [`singleflight`](crate::manager::TokenManagerConfig::singleflight) enabled,
	/// concurrent callers for the same app wait for a single refresh and then reuse its result.
	pub async fn access_token(&self, app: &AppConfig) -> Result<TokenRecord> {
		const KIND: OpKind = OpKind::AccessToken;

		let span = OpSpan::new(KIND, "access_token").with_app(&app.id);

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let guard = self.config.singleflight.then(|| self.refresh_guard(&app.id));
				let _singleflight = match &guard {
					Some(guard) => Some(guard.lock().await),
					None => None,
				};
				let now = OffsetDateTime::now_utc();

				if let Some(current) = self
					.cached_record(&app.id)
					.await?
					.filter(|record| !self.should_refresh(record, now))
				{
					return Ok(current);
				}

				self.refresh_record(app).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	fn should_refresh(&self, record: &TokenRecord, now: OffsetDateTime) -> bool {
		record.is_refresh_due_at(now, self.config.access_token_exp) || record.is_expired_at(now)
	}
}
