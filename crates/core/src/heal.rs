//! Retry-once session healing.
//!
//! [`with_auto_heal`] runs an operation against a session id; when the
//! failure says the session is gone it asks a [`RecreateStrategy`] for a
//! replacement and runs the operation exactly one more time.

use std::future::Future;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::session::SessionManager;
use crate::transport::BoxFut;

/// Result of a healed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Healed<T> {
	pub value: T,
	/// Replacement session id, when the original one had to be recreated.
	pub session_id: Option<String>,
}

/// Produces a replacement for a session that is gone.
pub trait RecreateStrategy: Send + Sync {
	/// `Ok(None)` means no replacement is possible.
	fn recreate<'a>(&'a self, stale: &'a str) -> BoxFut<'a, Result<Option<String>>>;
}

/// Runs `operation`, healing the session at most once.
///
/// Errors that are not session-invalid, a missing replacement, and the
/// second failure all propagate unchanged.
pub async fn with_auto_heal<T, F, Fut>(mut operation: F, session_id: String, strategy: &dyn RecreateStrategy) -> Result<Healed<T>>
where
	F: FnMut(String) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let err = match operation(session_id.clone()).await {
		Ok(value) => return Ok(Healed { value, session_id: None }),
		Err(err) if err.is_session_invalid() => err,
		Err(err) => return Err(err),
	};

	warn!(target = "wdactl.heal", session = %session_id, error = %err, "session gone; recreating");
	let replacement = match strategy.recreate(&session_id).await {
		Ok(Some(id)) => id,
		Ok(None) => {
			warn!(target = "wdactl.heal", session = %session_id, "no replacement session available");
			return Err(err);
		}
		Err(heal_err) => {
			warn!(target = "wdactl.heal", session = %session_id, error = %heal_err, "session recreation failed");
			return Err(err);
		}
	};

	info!(target = "wdactl.heal", stale = %session_id, session = %replacement, "retrying with replacement session");
	let value = operation(replacement.clone()).await?;
	Ok(Healed {
		value,
		session_id: Some(replacement),
	})
}

/// Recreates the session from the capabilities it was last created with.
pub struct CapabilitiesStrategy<'a> {
	sessions: &'a SessionManager,
	address: &'a str,
}

impl<'a> CapabilitiesStrategy<'a> {
	pub fn new(sessions: &'a SessionManager, address: &'a str) -> Self {
		Self { sessions, address }
	}
}

impl RecreateStrategy for CapabilitiesStrategy<'_> {
	fn recreate<'a>(&'a self, stale: &'a str) -> BoxFut<'a, Result<Option<String>>> {
		Box::pin(self.sessions.recreate_from_cache(self.address, stale))
	}
}

/// Drops the stale id and adopts or creates a new session.
pub struct AdoptStrategy<'a> {
	sessions: &'a SessionManager,
	address: &'a str,
}

impl<'a> AdoptStrategy<'a> {
	pub fn new(sessions: &'a SessionManager, address: &'a str) -> Self {
		Self { sessions, address }
	}
}

impl RecreateStrategy for AdoptStrategy<'_> {
	fn recreate<'a>(&'a self, stale: &'a str) -> BoxFut<'a, Result<Option<String>>> {
		Box::pin(async move {
			self.sessions.invalidate(self.address, stale).await;
			match self.sessions.ensure(self.address).await {
				Ok(id) => Ok(Some(id)),
				Err(Error::NoSession) => Ok(None),
				Err(err) => Err(err),
			}
		})
	}
}
