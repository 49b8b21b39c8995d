use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::{Route, attempt_order};
use crate::error::{Error, FallbackDecision, Result};
use crate::gesture::{Command, adapter_for};
use crate::heal::{AdoptStrategy, with_auto_heal};
use crate::session::SessionManager;
use crate::transport::Transport;

/// Sends gestures through the protocol attempt order of a backend.
pub struct Dispatcher {
	sessions: Arc<SessionManager>,
	transport: Arc<dyn Transport>,
	allow_fallback: bool,
	allow_timeout_fallback: bool,
}

impl Dispatcher {
	pub fn new(sessions: Arc<SessionManager>, transport: Arc<dyn Transport>) -> Self {
		Self {
			sessions,
			transport,
			allow_fallback: true,
			allow_timeout_fallback: false,
		}
	}

	pub fn with_fallback(mut self, allow_fallback: bool, allow_timeout_fallback: bool) -> Self {
		self.allow_fallback = allow_fallback;
		self.allow_timeout_fallback = allow_timeout_fallback;
		self
	}

	/// Performs `command` on the backend at `address`.
	///
	/// Candidates are tried in order until one succeeds. Only failures that
	/// cannot have executed upstream advance to the next candidate; anything
	/// else is returned as is. A gone session is healed once per candidate.
	///
	/// With fallback disabled only the first candidate that has a wire form
	/// for the gesture is sent.
	pub async fn dispatch(&self, address: &str, command: &Command) -> Result<Value> {
		if command.is_trivial() {
			return Ok(Command::trivial_reply());
		}

		let backend = self.sessions.backend(address);
		let mut session_id = self.sessions.ensure(backend.address()).await?;
		let snapshot = backend.mode().snapshot();
		let order = attempt_order(snapshot.mode, snapshot.native_tap, command.is_tap());
		let address = backend.address();
		let strategy = AdoptStrategy::new(&self.sessions, address);

		let mut last = None;
		let mut sent = false;
		for route in order {
			if sent && !self.allow_fallback {
				break;
			}
			info!(target = "wdactl.dispatch", gesture = command.name(), mode = %snapshot.mode, endpoint = route.label(), "attempt");

			let attempt = with_auto_heal(move |sid| self.perform(address, route, sid, command), session_id.clone(), &strategy).await;
			match attempt {
				Ok(healed) => {
					backend.mode().record_success(route, command.is_tap());
					return Ok(healed.value);
				}
				Err(err) => {
					let decision = err.fallback_decision(self.allow_timeout_fallback);
					warn!(
						target = "wdactl.dispatch",
						gesture = command.name(),
						endpoint = route.label(),
						status = ?err.http_status(),
						?decision,
						error = %err,
						"attempt failed"
					);
					if decision != FallbackDecision::RetryableSafe {
						return Err(err);
					}
					sent |= !matches!(err, Error::Unsupported { .. });
					last = Some(err);
				}
			}
			// A heal inside the attempt may have replaced the session.
			if let Some(current) = self.sessions.cached(address).await {
				session_id = current;
			}
		}

		let last = last.unwrap_or_else(|| Error::InvalidInput(format!("no protocol can perform {}", command.name())));
		Err(Error::DispatchExhausted { last: Box::new(last) })
	}

	/// Sends every request of one route's plan in order.
	async fn perform(&self, address: &str, route: Route, session_id: String, command: &Command) -> Result<Value> {
		let (adapter, variant) = adapter_for(route);
		let plan = adapter.plan(command, variant)?;
		let total = plan.requests.len();

		let mut reply = Value::Null;
		for (completed, request) in plan.requests.iter().enumerate() {
			let url = format!("{address}/session/{session_id}{}", request.path);
			reply = match self.transport.post(&url, &request.body, command.timeout()).await {
				Ok(reply) => reply,
				Err(err) if completed > 0 => {
					return Err(Error::PartialGesture {
						gesture: command.name(),
						completed,
						total,
						source: Box::new(err),
					});
				}
				Err(err) => return Err(err),
			};
		}
		Ok(plan.summary.unwrap_or(reply))
	}
}

#[cfg(test)]
mod tests;
