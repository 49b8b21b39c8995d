use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info, warn};
use wdactl_protocol::Capabilities;
use wdactl_protocol::session::{NewSessionRequest, extract_session_id, session_ids, status_session_id};

use crate::config::AdoptionConfig;
use crate::dispatch::{Mode, ModeSelector, TapPreference};
use crate::error::{Error, Result, TransportError};
use crate::transport::Transport;

/// Session state for one backend address.
#[derive(Debug)]
pub struct BackendContext {
	address: String,
	/// Cached session id. Held across adoption and creation so concurrent
	/// callers collapse into one attempt.
	session: tokio::sync::Mutex<Option<String>>,
	capabilities: parking_lot::Mutex<Option<Capabilities>>,
	last_created: parking_lot::Mutex<Option<String>>,
	mode: ModeSelector,
}

impl BackendContext {
	fn new(address: String, mode: Mode, native_tap: TapPreference) -> Self {
		Self {
			address,
			session: tokio::sync::Mutex::new(None),
			capabilities: parking_lot::Mutex::new(None),
			last_created: parking_lot::Mutex::new(None),
			mode: ModeSelector::new(mode, native_tap),
		}
	}

	pub fn address(&self) -> &str {
		&self.address
	}

	pub fn mode(&self) -> &ModeSelector {
		&self.mode
	}
}

/// Adopt-or-create session registry.
pub struct SessionManager {
	transport: Arc<dyn Transport>,
	adoption: AdoptionConfig,
	auto_create: bool,
	initial_mode: Mode,
	initial_tap: TapPreference,
	backends: DashMap<String, Arc<BackendContext>>,
}

impl SessionManager {
	pub fn new(transport: Arc<dyn Transport>, adoption: AdoptionConfig, auto_create: bool) -> Self {
		Self {
			transport,
			adoption,
			auto_create,
			initial_mode: Mode::Auto,
			initial_tap: TapPreference::Auto,
			backends: DashMap::new(),
		}
	}

	/// Mode and native tap preference new backends start with.
	pub fn with_initial_mode(mut self, mode: Mode, native_tap: TapPreference) -> Self {
		self.initial_mode = mode;
		self.initial_tap = native_tap;
		self
	}

	/// Context for `address`, created on first use.
	pub fn backend(&self, address: &str) -> Arc<BackendContext> {
		let key = address.trim_end_matches('/');
		if let Some(existing) = self.backends.get(key) {
			return Arc::clone(existing.value());
		}
		self.backends
			.entry(key.to_string())
			.or_insert_with(|| Arc::new(BackendContext::new(key.to_string(), self.initial_mode, self.initial_tap)))
			.value()
			.clone()
	}

	/// Returns a usable session id, adopting or creating one when nothing is cached.
	///
	/// Fails with [`Error::NoSession`] only when nothing can be adopted and
	/// auto-create is disabled.
	pub async fn ensure(&self, address: &str) -> Result<String> {
		let backend = self.backend(address);
		let mut slot = backend.session.lock().await;
		if let Some(id) = slot.as_ref() {
			return Ok(id.clone());
		}

		let id = match self.adopt(&backend.address).await {
			Some(id) => id,
			None if self.auto_create => {
				info!(target = "wdactl.session", address = %backend.address, "no session to adopt; creating one");
				self.create(&backend.address, NewSessionRequest::minimal()).await?
			}
			None => return Err(Error::NoSession),
		};
		*slot = Some(id.clone());
		Ok(id)
	}

	/// Forgets `session_id` if it is still the cached one. The remote session is left alone.
	pub async fn invalidate(&self, address: &str, session_id: &str) {
		let backend = self.backend(address);
		let mut slot = backend.session.lock().await;
		if slot.as_deref() == Some(session_id) {
			info!(target = "wdactl.session", address = %backend.address, session = session_id, "invalidated session");
			*slot = None;
		}
	}

	/// Creates a session from `capabilities` and remembers them for healing.
	pub async fn create_with_capabilities(&self, address: &str, capabilities: Capabilities) -> Result<String> {
		let backend = self.backend(address);
		let mut slot = backend.session.lock().await;
		let id = self.create(&backend.address, NewSessionRequest::first_match(capabilities.clone())).await?;
		*backend.capabilities.lock() = Some(capabilities);
		*backend.last_created.lock() = Some(id.clone());
		*slot = Some(id.clone());
		Ok(id)
	}

	/// Replacement for `stale` built from the cached capabilities.
	///
	/// When another caller already replaced `stale`, that session is reused.
	/// `Ok(None)` when no capabilities were ever recorded.
	pub async fn recreate_from_cache(&self, address: &str, stale: &str) -> Result<Option<String>> {
		let backend = self.backend(address);
		let mut slot = backend.session.lock().await;
		if let Some(current) = slot.as_ref().filter(|current| current.as_str() != stale) {
			debug!(target = "wdactl.session", session = %current, "session already replaced");
			return Ok(Some(current.clone()));
		}
		let Some(capabilities) = backend.capabilities.lock().clone() else {
			return Ok(None);
		};
		let id = self.create(&backend.address, NewSessionRequest::first_match(capabilities)).await?;
		*backend.last_created.lock() = Some(id.clone());
		*slot = Some(id.clone());
		Ok(Some(id))
	}

	/// Cached session id, without probing the backend.
	pub async fn cached(&self, address: &str) -> Option<String> {
		self.backend(address).session.lock().await.clone()
	}

	pub fn last_capabilities(&self, address: &str) -> Option<Capabilities> {
		self.backend(address).capabilities.lock().clone()
	}

	/// Last session created here, if the backend still knows it.
	pub async fn last_session(&self, address: &str) -> Option<String> {
		let backend = self.backend(address);
		let candidate = backend.last_created.lock().clone()?;
		if self.is_alive(&backend.address, &candidate).await {
			return Some(candidate);
		}
		debug!(target = "wdactl.session", session = %candidate, "last created session is gone");
		let mut last = backend.last_created.lock();
		if last.as_deref() == Some(candidate.as_str()) {
			*last = None;
		}
		None
	}

	/// Session ids the backend reports, oldest first. A backend without `/sessions` reports none.
	pub async fn list_sessions(&self, address: &str) -> Result<Vec<String>> {
		let backend = self.backend(address);
		let url = format!("{}/sessions", backend.address);
		match self.transport.get(&url, self.adoption.probe_timeout).await {
			Ok(body) => Ok(session_ids(&body)),
			Err(Error::Transport(TransportError::Status { status: 404, .. })) => Ok(Vec::new()),
			Err(err) => Err(err),
		}
	}

	/// Adoption probes. Failures are logged and swallowed.
	async fn adopt(&self, address: &str) -> Option<String> {
		let url = format!("{address}/sessions");
		match self.transport.get(&url, self.adoption.probe_timeout).await {
			Ok(body) => {
				if let Some(id) = session_ids(&body).pop() {
					info!(target = "wdactl.session", address, session = %id, "adopted listed session");
					return Some(id);
				}
			}
			Err(err) => debug!(target = "wdactl.session", address, error = %err, "session list unavailable"),
		}

		let url = format!("{address}/status");
		for attempt in 0..self.adoption.status_polls {
			match self.transport.get(&url, self.adoption.probe_timeout).await {
				Ok(body) => {
					if let Some(id) = status_session_id(&body) {
						if self.is_alive(address, &id).await {
							info!(target = "wdactl.session", address, session = %id, "adopted session from status");
							return Some(id);
						}
					}
				}
				Err(err) => debug!(target = "wdactl.session", address, attempt, error = %err, "status probe failed"),
			}
			if attempt + 1 < self.adoption.status_polls {
				tokio::time::sleep(self.adoption.poll_interval).await;
			}
		}
		None
	}

	async fn is_alive(&self, address: &str, session_id: &str) -> bool {
		let url = format!("{address}/session/{session_id}");
		self.transport.get(&url, self.adoption.probe_timeout).await.is_ok()
	}

	async fn create(&self, address: &str, request: NewSessionRequest) -> Result<String> {
		let url = format!("{address}/session");
		let body = serde_json::to_value(&request).map_err(|e| Error::SessionCreateFailed(e.to_string()))?;
		let reply = match self.transport.post(&url, &body, self.adoption.create_timeout).await {
			Ok(reply) => reply,
			Err(err) => {
				warn!(target = "wdactl.session", address, error = %err, "session creation failed");
				return Err(Error::SessionCreateFailed(err.to_string()));
			}
		};
		match extract_session_id(&reply) {
			Some(id) => {
				info!(target = "wdactl.session", address, session = %id, "created session");
				Ok(id)
			}
			None => Err(Error::SessionCreateFailed(format!("no session id in response: {}", preview(&reply)))),
		}
	}
}

fn preview(value: &Value) -> String {
	crate::error::body_preview(&value.to_string()).to_string()
}
