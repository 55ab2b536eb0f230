//! Token endpoint refreshes and the local refresh-interval check.

// self
use crate::{
	_prelude::*,
	auth::{AppConfig, TokenRecord, TokenResponse},
	http::{PlatformHttpClient, TransportErrorMapper},
	manager::TokenManager,
	obs::{self, OpKind, OpOutcome, OpSpan},
	time_serde,
};

impl<C, M> TokenManager<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches a fresh access token and persists it under the app's `auth` namespace.
	///
	/// Exactly one token endpoint call is made. On failure nothing is written and any
	/// previously cached record stays in place. Concurrent calls for the same app race; the
	/// last write wins.
	pub async fn tokenize(&self, app: &AppConfig) -> Result<TokenResponse> {
		let record = self.refresh_record(app).await?;

		Ok(TokenResponse { access_token: record.access_token, expires_in: record.expires_in })
	}

	/// Returns `true` once the configured refresh interval has elapsed since the last fetch.
	///
	/// Returns `false` when no token has been fetched yet. The check is read-only and takes no
	/// lock.
	pub async fn determine(&self, app: &AppConfig) -> Result<bool> {
		self.determine_at(app, OffsetDateTime::now_utc()).await
	}

	/// Same as [`TokenManager::determine`] with an explicit clock reading.
	pub async fn determine_at(&self, app: &AppConfig, now: OffsetDateTime) -> Result<bool> {
		const KIND: OpKind = OpKind::Determine;

		let span = OpSpan::new(KIND, "determine").with_app(&app.id);

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let interval = self.config.access_token_exp;
				let due = self
					.stored_record(&app.id)
					.await?
					.is_some_and(|record| record.is_refresh_due_at(now, interval));

				Ok(due)
			})
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	pub(crate) async fn refresh_record(&self, app: &AppConfig) -> Result<TokenRecord> {
		const KIND: OpKind = OpKind::Tokenize;

		let span = OpSpan::new(KIND, "tokenize").with_app(&app.id);

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let response = self.facade().fetch_token(app).await?;
				let previous = self.cached_record(&app.id).await?;
				let now = time_serde::truncate_to_millis(OffsetDateTime::now_utc());
				// Never move the fetch instant backwards, even if the wall clock does.
				let fetched_at = previous.map_or(now, |record| record.last_fetch_time.max(now));
				let record = TokenRecord::from_response(&response, fetched_at);

				self.save_record(&app.id, &record).await?;

				#[cfg(feature = "tracing")]
				tracing::debug!(
					app = %app.id,
					expires_in = record.expires_in,
					"Access token refreshed."
				);

				Ok(record)
			})
			.await;

		match &result {
			Ok(record) => {
				self.refresh_metrics.record_success(record.last_fetch_time);
				obs::record_op_outcome(KIND, OpOutcome::Success);
			},
			Err(_err) => {
				self.refresh_metrics.record_failure();
				obs::record_op_outcome(KIND, OpOutcome::Failure);

				#[cfg(feature = "tracing")]
				tracing::warn!(app = %app.id, error = %_err, "Access token refresh failed.");
			},
		}

		result
	}
}
