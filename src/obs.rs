//! Optional observability helpers for verification and token operations.
//!
//! # Feature Flags
//!
//! - `tracing` (default) emits structured spans named `weixin_auth.op` with the `op`
//!   (operation) and `stage` (call site) fields, plus `app` for manager operations, and
//!   warn/debug events on failures.
//! - `metrics` increments the `weixin_auth_op_total` counter for every attempt/success/failure,
//!   labeled by `op` + `outcome`, and `weixin_auth_verify_failure_total` labeled by `kind` for
//!   rejected callbacks.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Inbound callback verification.
	Ack,
	/// Access-token fetch against the token endpoint.
	Tokenize,
	/// Local refresh-interval check.
	Determine,
	/// Cached-or-refreshed token lookup.
	AccessToken,
	/// Callback IP-list fetch.
	CallbackIps,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Ack => "ack",
			OpKind::Tokenize => "tokenize",
			OpKind::Determine => "determine",
			OpKind::AccessToken => "access_token",
			OpKind::CallbackIps => "callback_ips",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
